#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;

use crate::domain::models::ChatPrompt;
use crate::domain::models::CompletionPrompt;
use crate::domain::models::Message;
use crate::domain::models::Persona;

pub const DEFAULT_USER_NAME: &str = "Cliente";

pub struct PromptAssembler {}

impl PromptAssembler {
    pub fn chat(persona: &Persona, history: &[Message], input: &str) -> ChatPrompt {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&persona.text));
        messages.extend_from_slice(history);
        messages.push(Message::user(input));

        return ChatPrompt { messages };
    }

    /// Flattens the conversation into a transcript and leaves the assistant
    /// turn open for the model to complete.
    pub fn completion(
        persona: &Persona,
        history: &[Message],
        input: &str,
        user_name: &str,
    ) -> CompletionPrompt {
        let assistant_name = &persona.assistant_name;

        let mut text = format!("{}\n\n", persona.text);
        text += "Historial de conversación:\n";
        for message in history {
            text += &message.as_transcript_line(user_name, assistant_name);
            text += "\n";
        }
        text += &format!("\n{user_name}: {input}\n{assistant_name}: ");

        return CompletionPrompt { text };
    }
}
