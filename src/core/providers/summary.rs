// src/core/providers/summary.rs

use super::{ProviderError, SummaryProvider};
use crate::core::config::SummaryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const SYSTEM_PROMPT: &str = "You are a Generative Engine Optimization consultant. \
Given the JSON digest of a page audit, write a short qualitative assessment \
(at most 120 words): the main strength, the main weakness and the single most \
valuable next step.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSummary {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiSummary {
    pub fn from_config(config: &SummaryConfig) -> Option<Self> {
        Some(Self {
            api_key: config.api_key.clone()?,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

impl SummaryProvider for OpenAiSummary {
    fn summarize(&self, digest: &serde_json::Value) -> Result<String, ProviderError> {
        info!(model = %self.model, "Requesting qualitative summary.");
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(digest.to_string()),
                },
            ],
            temperature: 0.3,
        };

        let client = reqwest::blocking::Client::builder().timeout(self.timeout).build()?;
        let response = client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let chat: ChatResponse = response.json()?;
        let text = first_content(chat)
            .ok_or_else(|| ProviderError::Response("no completion returned".to_string()))?;
        debug!(chars = text.len(), "Summary received.");
        Ok(text)
    }
}

fn first_content(chat: ChatResponse) -> Option<String> {
    chat.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_key() {
        assert!(OpenAiSummary::from_config(&SummaryConfig::default()).is_none());
    }

    #[test]
    fn reads_first_choice() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  Solid page.  "}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(chat).as_deref(), Some("Solid page."));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(first_content(empty).is_none());
    }
}
