mod conversation;
mod prompts;
mod sessions;

pub use conversation::*;
pub use prompts::*;
pub use sessions::*;
