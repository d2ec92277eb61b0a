//! Application settings.
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! JSON file in the user's config directory, then environment variables.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which chat-completion backend drafts the SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(anyhow!("Unknown LLM provider: {}", other)),
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "claude-haiku-4-5-20251001",
            ProviderKind::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderKind,
    /// Model name; falls back to the provider's default when unset
    pub model: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub completion_timeout_secs: u64,

    pub db_path: PathBuf,
    pub docs_dir: PathBuf,

    /// Number of snippets requested from the retriever per planning call
    pub retrieval_k: usize,
    pub sql_dialect: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Anthropic,
            model: None,
            api_key: None,
            max_tokens: 2048,
            completion_timeout_secs: 60,
            db_path: PathBuf::from("data/Northwind_small.sqlite"),
            docs_dir: PathBuf::from("data/docs"),
            retrieval_k: 50,
            sql_dialect: "SQLite".to_string(),
        }
    }
}

impl Settings {
    /// Load defaults, then the settings file (if any), then the environment.
    pub fn load() -> Result<Self> {
        let mut settings = match Self::settings_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_overrides(|key| env::var(key).ok())?;
        Ok(settings)
    }

    fn settings_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nlsql").join("settings.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LLM_PROVIDER") {
            self.provider = ProviderKind::parse(&v)?;
        }
        if let Some(v) = lookup("LLM_MODEL") {
            self.model = Some(v);
        }
        if let Some(v) = lookup(self.provider.api_key_var()) {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup("MAX_TOKENS") {
            self.max_tokens = v
                .parse()
                .with_context(|| format!("MAX_TOKENS must be an integer, got {:?}", v))?;
        }
        if let Some(v) = lookup("COMPLETION_TIMEOUT_SECS") {
            self.completion_timeout_secs = v.parse().with_context(|| {
                format!("COMPLETION_TIMEOUT_SECS must be an integer, got {:?}", v)
            })?;
        }
        if let Some(v) = lookup("DB_PATH") {
            self.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("DOCS_DIR") {
            self.docs_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("RETRIEVAL_K") {
            self.retrieval_k = v
                .parse()
                .with_context(|| format!("RETRIEVAL_K must be an integer, got {:?}", v))?;
        }
        if let Some(v) = lookup("SQL_DIALECT") {
            self.sql_dialect = v;
        }
        Ok(())
    }

    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}
