mod ollama;
#[cfg(test)]
pub mod scripted;

pub use ollama::*;
