use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::prompt::{build_narrative_prompt, NARRATOR_SYSTEM_PROMPT};
use super::{NarrativeRequest, Narrator, NarratorError};
use crate::config::NarratorConfig;

/// OpenAI-compatible chat-completions client (Groq by default).
pub struct ChatCompletionsNarrator {
    url: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ChatCompletionsNarrator {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// `NotConfigured` without an API key; `HttpClient` if the TLS backend
    /// cannot be initialised.
    pub fn new(config: &NarratorConfig) -> Result<Self, NarratorError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(NarratorError::NotConfigured)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NarratorError::HttpClient(e.to_string()))?;

        Ok(Self {
            url: config.url.clone(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl Narrator for ChatCompletionsNarrator {
    fn narrate(&self, request: &NarrativeRequest<'_>) -> Result<String, NarratorError> {
        let prompt = build_narrative_prompt(
            request.domain,
            request.contributors,
            request.probability,
            request.label,
        );
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: NARRATOR_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    NarratorError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    NarratorError::Connection(self.url.clone())
                } else {
                    NarratorError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NarratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                NarratorError::Timeout(self.timeout_secs)
            } else {
                NarratorError::ResponseParsing(e.to_string())
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(NarratorError::EmptyResponse)
    }
}
