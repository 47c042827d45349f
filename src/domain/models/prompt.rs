use super::Message;

/// Backend protocol variants, in the order the orchestrator tries them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PromptShape {
    Chat,
    Completion,
}

/// Structured message list for the chat endpoint: persona, history, then the
/// new user turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatPrompt {
    pub messages: Vec<Message>,
}

/// Flattened transcript for the completion endpoint, ending on an open
/// assistant turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionPrompt {
    pub text: String,
}
