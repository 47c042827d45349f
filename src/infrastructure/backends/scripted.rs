use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::Backend;
use crate::domain::models::BackendResponse;
use crate::domain::models::ChatPrompt;
use crate::domain::models::CompletionPrompt;

/// Test backend that answers from queued responses and records every prompt
/// it was handed. An empty queue answers with an error.
#[derive(Default)]
pub struct ScriptedBackend {
    chat_responses: Mutex<VecDeque<Result<BackendResponse>>>,
    completion_responses: Mutex<VecDeque<Result<BackendResponse>>>,
    pub chat_calls: Mutex<Vec<ChatPrompt>>,
    pub completion_calls: Mutex<Vec<CompletionPrompt>>,
}

impl ScriptedBackend {
    pub fn with_chat(self, res: Result<BackendResponse>) -> ScriptedBackend {
        self.chat_responses.lock().unwrap().push_back(res);
        return self;
    }

    pub fn with_completion(self, res: Result<BackendResponse>) -> ScriptedBackend {
        self.completion_responses.lock().unwrap().push_back(res);
        return self;
    }

    pub fn reply(text: &str) -> Result<BackendResponse> {
        return Ok(BackendResponse::Reply(text.to_string()));
    }

    pub fn unexpected(msg: &str) -> Result<BackendResponse> {
        return Err(anyhow!(msg.to_string()));
    }

    pub fn chat_count(&self) -> usize {
        return self.chat_calls.lock().unwrap().len();
    }

    pub fn completion_count(&self) -> usize {
        return self.completion_calls.lock().unwrap().len();
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    async fn chat(&self, prompt: &ChatPrompt) -> Result<BackendResponse> {
        self.chat_calls.lock().unwrap().push(prompt.clone());
        if let Some(res) = self.chat_responses.lock().unwrap().pop_front() {
            return res;
        }

        bail!("No scripted chat response left");
    }

    async fn completion(&self, prompt: &CompletionPrompt) -> Result<BackendResponse> {
        self.completion_calls.lock().unwrap().push(prompt.clone());
        if let Some(res) = self.completion_responses.lock().unwrap().pop_front() {
            return res;
        }

        bail!("No scripted completion response left");
    }
}
