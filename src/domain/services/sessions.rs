#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;

use dashmap::DashMap;

use crate::domain::models::Message;
use crate::domain::models::Session;

/// What `reset` found before clearing a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    Cleared,
    Created,
}

/// Owns every live session. Each operation works under the shard lock of the
/// session it touches, so operations on one session are serialized while
/// different sessions proceed independently. Guards never escape a method,
/// which keeps network I/O outside of any lock.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> SessionStore {
        return SessionStore::default();
    }

    /// Returns a snapshot of the session's history, creating an empty session
    /// when the id is unseen.
    pub fn get_or_create(&self, session_id: &str) -> Vec<Message> {
        return self
            .sessions
            .entry(session_id.to_string())
            .or_default()
            .messages()
            .to_vec();
    }

    /// Appends the user turn and the assistant turn together. Only call this
    /// once a reply exists.
    pub fn append_exchange(&self, session_id: &str, user_text: &str, assistant_text: &str) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .push_exchange(user_text, assistant_text);
    }

    pub fn reset(&self, session_id: &str) -> ResetOutcome {
        let mut existed = true;
        self.sessions
            .entry(session_id.to_string())
            .and_modify(|session| session.clear())
            .or_insert_with(|| {
                existed = false;
                return Session::default();
            });

        if existed {
            return ResetOutcome::Cleared;
        }

        return ResetOutcome::Created;
    }

    #[cfg(test)]
    pub fn contains(&self, session_id: &str) -> bool {
        return self.sessions.contains_key(session_id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        return self.sessions.len();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        return self.sessions.is_empty();
    }

    /// Drops every session, returning how many were held. Called once the
    /// server has stopped accepting requests.
    pub fn drain(&self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();

        return count;
    }
}
