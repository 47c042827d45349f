#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

/// A single role-tagged turn. Serializes to the `{role, content}` shape the
/// Ollama chat endpoint expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            role,
            content: content.to_string(),
        };
    }

    pub fn system(content: &str) -> Message {
        return Message::new(Role::System, content);
    }

    pub fn user(content: &str) -> Message {
        return Message::new(Role::User, content);
    }

    pub fn assistant(content: &str) -> Message {
        return Message::new(Role::Assistant, content);
    }

    #[cfg(test)]
    pub fn role(&self) -> Role {
        return self.role;
    }

    #[cfg(test)]
    pub fn content(&self) -> &str {
        return &self.content;
    }

    /// Renders the message as a transcript line, `"<label>: <content>"`.
    pub fn as_transcript_line(&self, user_label: &str, assistant_label: &str) -> String {
        let label = match self.role {
            Role::User => user_label,
            Role::Assistant | Role::System => assistant_label,
        };

        return format!("{label}: {}", self.content);
    }
}
