//! Completion client for the Anthropic Messages API.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Instant;

use super::provider::CompletionProvider;
use super::types::{CompletionPrompt, ContentBlock, Message};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

/// Stateless client: every call sends exactly one user turn.
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    model: String,
    max_tokens: u32,
}

// Anthropic API request/response types
#[derive(Debug, Clone, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    id: String,
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: Option<String>,
    usage: Usage,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Concatenated text of all text blocks
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl AnthropicClient {
    pub fn builder() -> AnthropicClientBuilder {
        AnthropicClientBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &CompletionPrompt) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: 0.0,
            messages: vec![Message::user(prompt.user_message())],
            system: Some(prompt.system.clone()),
        }
    }
}

impl CompletionProvider for AnthropicClient {
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String> {
        let request = self.build_request(prompt);
        let api_key = self.api_key.clone();
        let started = Instant::now();

        // smolhttp is synchronous
        let response = smol::unblock(move || send_request(&api_key, &request)).await?;

        tracing::debug!(
            model = %response.model,
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Anthropic completion finished"
        );

        let text = response.text();
        if text.trim().is_empty() {
            return Err(anyhow!("No text in assistant response"));
        }
        Ok(text)
    }
}

fn send_request(api_key: &str, request: &AnthropicRequest) -> Result<AnthropicResponse> {
    let body = serde_json::to_string(request)
        .map_err(|e| anyhow!("Failed to serialize request: {}", e))?;

    let response = smolhttp::Client::new(MESSAGES_URL)
        .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?
        .post()
        .headers(vec![
            ("x-api-key".to_string(), api_key.to_string()),
            ("anthropic-version".to_string(), "2023-06-01".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ])
        .body(body.into())
        .send()
        .map_err(|e| anyhow!("API request failed: {}", e))?;

    parse_response(&response.text())
}

fn parse_response(response_text: &str) -> Result<AnthropicResponse> {
    if response_text.contains("\"error\"") && response_text.contains("\"type\"") {
        return Err(anyhow!("API error: {}", response_text));
    }

    serde_json::from_str(response_text).map_err(|e| {
        anyhow!(
            "Failed to parse response: {}. Response: {}",
            e,
            response_text
        )
    })
}

/// Builder for creating clients with custom configuration
pub struct AnthropicClientBuilder {
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl Default for AnthropicClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
        }
    }
}

impl AnthropicClientBuilder {
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> Result<AnthropicClient> {
        let api_key = match self.api_key {
            Some(key) => key,
            None => env::var("ANTHROPIC_API_KEY")
                .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable not set"))?,
        };

        Ok(AnthropicClient {
            api_key,
            model: self.model,
            max_tokens: self.max_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> CompletionPrompt {
        CompletionPrompt {
            system: "system rules".to_string(),
            context: "ctx".to_string(),
            question: "q?".to_string(),
        }
    }

    #[test]
    fn test_client_builder() {
        let client = AnthropicClient::builder()
            .api_key(Some("test-key".to_string()))
            .model("claude-sonnet-4-5-20250929".to_string())
            .max_tokens(1024)
            .build()
            .unwrap();

        assert_eq!(client.model(), "claude-sonnet-4-5-20250929");
    }

    #[test]
    fn test_request_carries_system_and_single_user_turn() {
        let client = AnthropicClient::builder()
            .api_key(Some("test-key".to_string()))
            .build()
            .unwrap();

        let request = serde_json::to_value(client.build_request(&prompt())).unwrap();
        assert_eq!(request["system"], "system rules");
        assert_eq!(request["messages"].as_array().unwrap().len(), 1);
        assert_eq!(request["messages"][0]["role"], "user");
        assert_eq!(request["messages"][0]["content"][0]["type"], "text");
    }

    #[test]
    fn test_parse_response_joins_text_blocks() {
        let raw = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-haiku-4-5-20251001",
            "stop_reason": "end_turn",
            "content": [{"type": "text", "text": "{\"sql\": \"SELECT 1\"}"}],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;

        let response = parse_response(raw).unwrap();
        assert_eq!(response.text(), "{\"sql\": \"SELECT 1\"}");
    }

    #[test]
    fn test_parse_response_surfaces_api_errors() {
        let raw = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = parse_response(raw).unwrap_err();
        assert!(err.to_string().contains("API error"));
    }
}
