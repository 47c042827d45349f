#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use super::ChatPrompt;
use super::CompletionPrompt;

pub const MALFORMED_REPLY_TEXT: &str =
    "Lo siento, no pude generar una respuesta apropiada en este momento.";

pub const TRANSPORT_FAILURE_TEXT: &str = "Lo siento, estoy experimentando problemas técnicos de comunicación. ¿Podríamos intentarlo más tarde?";

/// Outcome of a single backend operation once retries have run their course.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendResponse {
    Reply(String),
    /// Every attempt failed at the transport or HTTP status level.
    TransportFailure,
    /// The backend answered, but the envelope lacked the expected field.
    Malformed,
}

impl BackendResponse {
    /// The text a caller sees. Soft failures map onto their apology sentinel.
    pub fn text(&self) -> &str {
        match self {
            BackendResponse::Reply(text) => return text,
            BackendResponse::TransportFailure => return TRANSPORT_FAILURE_TEXT,
            BackendResponse::Malformed => return MALFORMED_REPLY_TEXT,
        }
    }

    /// A blank reply means the backend produced nothing worth keeping. Soft
    /// failures are never blank since they carry sentinel text.
    pub fn is_blank(&self) -> bool {
        return self.text().trim().is_empty();
    }
}

#[async_trait]
pub trait Backend {
    /// Used at startup to verify the backend is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Requests a reply from the structured chat endpoint.
    ///
    /// Transport failures and malformed envelopes are folded into the
    /// returned `BackendResponse`. An `Err` is reserved for faults outside the
    /// retry contract, and the caller treats it as a reason to try the next
    /// prompt shape.
    async fn chat(&self, prompt: &ChatPrompt) -> Result<BackendResponse>;

    /// Requests a reply from the flat completion endpoint. Same contract as
    /// `chat`.
    async fn completion(&self, prompt: &CompletionPrompt) -> Result<BackendResponse>;
}
