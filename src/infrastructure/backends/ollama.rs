#[cfg(test)]
#[path = "ollama_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendResponse;
use crate::domain::models::ChatPrompt;
use crate::domain::models::CompletionPrompt;
use crate::domain::models::Message;
use crate::domain::models::RetryPolicy;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);
const ERROR_BODY_MAX_CHARS: usize = 500;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RequestOptions {
    temperature: f32,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    options: RequestOptions,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatResponseMessage {
    role: Option<String>,
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: RequestOptions,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    response: Option<String>,
}

/// Logs the body of a failed response, as JSON when it parses and as
/// truncated text otherwise.
fn summarize_error_body(text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<serde_json::Value>(text) {
        return body.to_string();
    }

    return text.chars().take(ERROR_BODY_MAX_CHARS).collect::<String>();
}

async fn log_error_body(res: reqwest::Response) -> String {
    let status = res.status().as_u16();
    let text = res.text().await.unwrap_or_default();
    let body = summarize_error_body(&text);
    tracing::error!(status, body = %body, "Ollama returned an error");

    return body;
}

pub struct Ollama {
    url: String,
    fallback_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Ollama {
    pub fn from_config() -> Result<Ollama> {
        return Ok(Ollama {
            url: Config::get(ConfigKey::OllamaURL),
            fallback_url: Config::get(ConfigKey::FallbackURL),
            model: Config::get(ConfigKey::Model),
            temperature: Config::get_parsed::<f32>(ConfigKey::Temperature)?,
            timeout: Duration::from_secs(Config::get_parsed::<u64>(ConfigKey::RequestTimeout)?),
            retry: RetryPolicy::new(
                Config::get_parsed::<u32>(ConfigKey::MaxRetries)?,
                Duration::from_secs(1),
            ),
        });
    }

    pub fn url(&self) -> &str {
        return &self.url;
    }

    fn client(&self) -> Result<reqwest::Client> {
        return Ok(reqwest::Client::builder().timeout(self.timeout).build()?);
    }

    #[allow(clippy::implicit_return)]
    async fn chat_attempt(
        &self,
        client: &reqwest::Client,
        req: &ChatRequest,
        attempt: u32,
    ) -> Result<BackendResponse> {
        let url = format!("{url}/api/chat", url = self.url);
        tracing::info!(url = %url, "Connecting to Ollama");

        let mut res = client.post(&url).json(req).send().await?;
        if res.status().is_client_error() || res.status().is_server_error() {
            let status = res.status();
            let body = log_error_body(res).await;

            if status != StatusCode::FORBIDDEN || attempt != 0 {
                bail!(format!("Ollama chat request failed with status {status}: {body}"));
            }

            let alt_url = format!("{url}/api/chat", url = self.fallback_url);
            tracing::info!(url = %alt_url, "Ollama returned 403, trying alternate URL");
            res = client.post(&alt_url).json(req).send().await?;
            if res.status().is_client_error() || res.status().is_server_error() {
                let status = res.status();
                let body = log_error_body(res).await;
                bail!(format!("Ollama alternate chat request failed with status {status}: {body}"));
            }
        }

        let body = res.json::<ChatResponse>().await?;
        tracing::debug!(body = ?body, "Chat response");

        if let Some(content) = body.message.clone().and_then(|message| return message.content) {
            return Ok(BackendResponse::Reply(content));
        }

        tracing::error!(body = ?body, "Unexpected chat response format");
        return Ok(BackendResponse::Malformed);
    }

    #[allow(clippy::implicit_return)]
    async fn completion_attempt(
        &self,
        client: &reqwest::Client,
        req: &CompletionRequest,
    ) -> Result<BackendResponse> {
        let url = format!("{url}/api/generate", url = self.url);
        tracing::info!(url = %url, "Connecting to Ollama");

        let res = client.post(&url).json(req).send().await?;
        if res.status().is_client_error() || res.status().is_server_error() {
            let status = res.status();
            let body = log_error_body(res).await;
            bail!(format!("Ollama completion request failed with status {status}: {body}"));
        }

        let body = res.json::<CompletionResponse>().await?;
        tracing::debug!(body = ?body, "Completion response");

        if let Some(response) = body.response {
            return Ok(BackendResponse::Reply(response));
        }

        tracing::error!(body = ?body, "Unexpected completion response format");
        return Ok(BackendResponse::Malformed);
    }
}

#[async_trait]
impl Backend for Ollama {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status(),
            Err(err) => {
                tracing::error!(error = ?err, "Ollama is not reachable");
                bail!("Ollama is not reachable");
            }
        };
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Ollama health check failed");
            bail!("Ollama health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn chat(&self, prompt: &ChatPrompt) -> Result<BackendResponse> {
        let client = self.client()?;
        let req = ChatRequest {
            model: self.model.to_string(),
            messages: prompt.messages.clone(),
            stream: false,
            options: RequestOptions {
                temperature: self.temperature,
            },
        };

        let res = self
            .retry
            .run("Ollama chat", |attempt| {
                return self.chat_attempt(&client, &req, attempt);
            })
            .await;

        if res.is_err() {
            return Ok(BackendResponse::TransportFailure);
        }

        return res;
    }

    #[allow(clippy::implicit_return)]
    async fn completion(&self, prompt: &CompletionPrompt) -> Result<BackendResponse> {
        let client = self.client()?;
        let req = CompletionRequest {
            model: self.model.to_string(),
            prompt: prompt.text.to_string(),
            stream: false,
            options: RequestOptions {
                temperature: self.temperature,
            },
        };

        let res = self
            .retry
            .run("Ollama completion", |_| {
                return self.completion_attempt(&client, &req);
            })
            .await;

        if res.is_err() {
            return Ok(BackendResponse::TransportFailure);
        }

        return res;
    }
}
