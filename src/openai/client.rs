use spdlog::prelude::*;

use crate::openai::error::CompletionError;
use crate::openai::types::{ChatMessage, ChatRequest, ChatResponse};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "You are a professional report writer assisting \
speech-language pathologists. Turn the provided template and session \
observations into clear, clinically appropriate report text.";

/// Thin wrapper over the hosted chat-completions API. One request per call,
/// no retry, no timeout beyond the client default.
#[derive(Debug)]
pub struct CompletionClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(api_key: String) -> Self {
        CompletionClient {
            api_key,
            base_url: OPENAI_API_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point at an OpenAI-compatible backend instead of the default URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Two messages: a fixed system framing, and the template concatenated
    /// with the observations as the user turn.
    pub(crate) fn build_request(template: &str, input_data: &str) -> ChatRequest {
        let user = format!(
            "Template:\n{}\n\nObservations:\n{}",
            template, input_data
        );

        ChatRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    /// Sends a single completion request and returns the first choice's text.
    pub async fn complete(
        &self,
        template: &str,
        input_data: &str,
    ) -> Result<String, CompletionError> {
        let body = Self::build_request(template, input_data);

        debug!("Requesting completion from {}", self.base_url);
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status, message });
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyCompletion)?;

        debug!("Completion received ({} bytes)", content.len());
        Ok(content)
    }
}
