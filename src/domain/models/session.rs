use super::Message;

/// Conversation history for one session key. The persona is injected at call
/// time and never stored here, so `messages` only ever holds complete
/// user/assistant pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    messages: Vec<Message>,
}

impl Session {
    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn push_exchange(&mut self, user_text: &str, assistant_text: &str) {
        self.messages.push(Message::user(user_text));
        self.messages.push(Message::assistant(assistant_text));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
