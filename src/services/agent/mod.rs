//! Agent module for LLM-powered SQL drafting.
//!
//! This module provides:
//! - `client` - Completion client for Anthropic's Messages API
//! - `openai` - Completion client for OpenAI's Chat Completions API
//! - `provider` - The `CompletionProvider` seam and settings-driven selection
//! - `types` - Prompt variables and wire message types

mod client;
mod openai;
mod provider;
mod types;

#[allow(unused_imports)]
pub use client::{AnthropicClient, AnthropicClientBuilder};
#[allow(unused_imports)]
pub use openai::OpenAiClient;
pub use provider::{CompletionProvider, LlmProvider};
pub use types::CompletionPrompt;
