#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;

use super::PromptAssembler;
use super::ResetOutcome;
use super::SessionStore;
use crate::domain::models::Backend;
use crate::domain::models::BackendResponse;
use crate::domain::models::Message;
use crate::domain::models::Persona;
use crate::domain::models::PromptShape;

/// Shapes tried per message, in order, until one yields non-blank text.
const SHAPE_STRATEGIES: [PromptShape; 2] = [PromptShape::Chat, PromptShape::Completion];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Success,
    TransportFailure,
    Malformed,
}

/// The committed result of one user message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub reply: String,
    pub kind: ReplyKind,
    pub shape: PromptShape,
}

impl Exchange {
    fn from_response(res: &BackendResponse, shape: PromptShape) -> Exchange {
        let kind = match res {
            BackendResponse::Reply(_) => ReplyKind::Success,
            BackendResponse::TransportFailure => ReplyKind::TransportFailure,
            BackendResponse::Malformed => ReplyKind::Malformed,
        };

        return Exchange {
            reply: res.text().to_string(),
            kind,
            shape,
        };
    }
}

pub struct ConversationService {
    store: Arc<SessionStore>,
    backend: Arc<dyn Backend + Send + Sync>,
    persona: Persona,
}

impl ConversationService {
    pub fn new(
        store: Arc<SessionStore>,
        backend: Arc<dyn Backend + Send + Sync>,
        persona: Persona,
    ) -> ConversationService {
        return ConversationService {
            store,
            backend,
            persona,
        };
    }

    #[cfg(test)]
    pub fn store(&self) -> &SessionStore {
        return &self.store;
    }

    async fn attempt(
        &self,
        shape: PromptShape,
        history: &[Message],
        text: &str,
        user_name: &str,
    ) -> Result<BackendResponse> {
        match shape {
            PromptShape::Chat => {
                let prompt = PromptAssembler::chat(&self.persona, history, text);
                return self.backend.chat(&prompt).await;
            }
            PromptShape::Completion => {
                let prompt = PromptAssembler::completion(&self.persona, history, text, user_name);
                return self.backend.completion(&prompt).await;
            }
        }
    }

    /// Runs one user message through the backend and commits the exchange.
    ///
    /// Never fails: backend trouble degrades to sentinel text, and whatever
    /// text comes out is stored alongside the user's message exactly once.
    pub async fn send(&self, session_id: &str, user_name: &str, text: &str) -> Exchange {
        let history = self.store.get_or_create(session_id);

        let mut exchange: Option<Exchange> = None;
        for shape in SHAPE_STRATEGIES {
            match self.attempt(shape, &history, text, user_name).await {
                Ok(res) if !res.is_blank() => {
                    exchange = Some(Exchange::from_response(&res, shape));
                    break;
                }
                Ok(_) => {
                    tracing::info!(
                        session_id,
                        shape = shape.to_string(),
                        "Backend returned a blank reply, trying next shape"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        session_id,
                        shape = shape.to_string(),
                        error = ?err,
                        "Backend call failed, trying next shape"
                    );
                }
            }
        }

        let exchange = exchange.unwrap_or_else(|| {
            return Exchange::from_response(
                &BackendResponse::Malformed,
                SHAPE_STRATEGIES[SHAPE_STRATEGIES.len() - 1],
            );
        });

        self.store.append_exchange(session_id, text, &exchange.reply);

        tracing::info!(
            session_id,
            shape = exchange.shape.to_string(),
            kind = ?exchange.kind,
            "Exchange committed"
        );

        return exchange;
    }

    pub fn reset(&self, session_id: &str) -> ResetOutcome {
        let outcome = self.store.reset(session_id);
        tracing::info!(session_id, outcome = ?outcome, "Session reset");

        return outcome;
    }
}
