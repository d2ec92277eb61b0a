//! The completion-provider seam and the configured backend.

use anyhow::{Result, anyhow};
use std::future::Future;

use super::client::AnthropicClient;
use super::openai::OpenAiClient;
use super::types::CompletionPrompt;
use crate::config::{ProviderKind, Settings};

/// Anything that turns a prompt into raw model text.
///
/// Implementations make exactly one attempt per call; retries and timeouts
/// are the caller's business.
pub trait CompletionProvider {
    fn complete(&self, prompt: &CompletionPrompt) -> impl Future<Output = Result<String>> + Send;
}

/// The backend selected by settings
#[derive(Clone)]
pub enum LlmProvider {
    Anthropic(AnthropicClient),
    OpenAi(OpenAiClient),
}

impl LlmProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match settings.provider {
            ProviderKind::Anthropic => {
                let client = AnthropicClient::builder()
                    .api_key(settings.api_key.clone())
                    .model(settings.model_name())
                    .max_tokens(settings.max_tokens)
                    .build()?;
                Ok(LlmProvider::Anthropic(client))
            }
            ProviderKind::OpenAi => {
                let api_key = settings
                    .api_key
                    .clone()
                    .ok_or_else(|| anyhow!("OPENAI_API_KEY environment variable not set"))?;
                Ok(LlmProvider::OpenAi(OpenAiClient::new(
                    api_key,
                    settings.model_name(),
                    settings.max_tokens,
                )))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            LlmProvider::Anthropic(client) => format!("anthropic/{}", client.model()),
            LlmProvider::OpenAi(client) => format!("openai/{}", client.model()),
        }
    }
}

impl CompletionProvider for LlmProvider {
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String> {
        match self {
            LlmProvider::Anthropic(client) => client.complete(prompt).await,
            LlmProvider::OpenAi(client) => client.complete(prompt).await,
        }
    }
}
