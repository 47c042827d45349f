#[cfg(test)]
#[path = "persona_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use tokio::fs;

const DEFAULT_PERSONA: &str = include_str!("../../../assets/persona.txt");

/// Fixed instructions prepended to every backend request, plus the label used
/// for assistant turns when history is flattened into a transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Persona {
    pub text: String,
    pub assistant_name: String,
}

impl Persona {
    pub fn new(text: &str, assistant_name: &str) -> Persona {
        return Persona {
            text: text.to_string(),
            assistant_name: assistant_name.to_string(),
        };
    }

    pub fn builtin(assistant_name: &str) -> Persona {
        return Persona::new(DEFAULT_PERSONA, assistant_name);
    }

    /// Reads the persona from `file_path`, or falls back to the built-in
    /// persona when no path is given.
    pub async fn load(file_path: &str, assistant_name: &str) -> Result<Persona> {
        if file_path.is_empty() {
            return Ok(Persona::builtin(assistant_name));
        }

        let text = fs::read_to_string(file_path).await?;
        if text.trim().is_empty() {
            bail!(format!("Persona file {file_path} is empty"));
        }

        return Ok(Persona::new(&text, assistant_name));
    }
}
