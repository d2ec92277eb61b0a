//! Completion client for the OpenAI Chat Completions API.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::provider::CompletionProvider;
use super::types::CompletionPrompt;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            api_key,
            model,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &CompletionPrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(prompt.system.clone()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(prompt.user_message()),
                },
            ],
        }
    }
}

impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String> {
        let request = self.build_request(prompt);
        let api_key = self.api_key.clone();
        let started = Instant::now();

        let response =
            smol::unblock(move || send_request(&api_key, &request)).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Completion response had no choices"))?;

        tracing::debug!(
            model = %response.model,
            finish_reason = ?choice.finish_reason,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "OpenAI completion finished"
        );

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(anyhow!("No text in assistant response")),
        }
    }
}

fn send_request(api_key: &str, request: &ChatRequest) -> Result<ChatResponse> {
    let body = serde_json::to_string(request)
        .map_err(|e| anyhow!("Failed to serialize request: {}", e))?;

    let response = smolhttp::Client::new(CHAT_COMPLETIONS_URL)
        .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?
        .post()
        .headers(vec![
            ("authorization".to_string(), format!("Bearer {}", api_key)),
            ("content-type".to_string(), "application/json".to_string()),
        ])
        .body(body.into())
        .send()
        .map_err(|e| anyhow!("API request failed: {}", e))?;

    parse_response(&response.text())
}

fn parse_response(response_text: &str) -> Result<ChatResponse> {
    let value: serde_json::Value = serde_json::from_str(response_text).map_err(|e| {
        anyhow!(
            "Failed to parse response: {}. Response: {}",
            e,
            response_text
        )
    })?;

    if let Some(error) = value.get("error") {
        return Err(anyhow!("API error: {}", error));
    }

    serde_json::from_value(value).map_err(|e| anyhow!("Unexpected response shape: {}", e))
}
