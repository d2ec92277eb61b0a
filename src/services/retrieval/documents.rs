//! Markdown document loading and chunking.

use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::Path;

pub const CHUNK_SIZE: usize = 800;
pub const CHUNK_OVERLAP: usize = 100;

/// A source document before chunking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub source: Option<String>,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: Some(source.into()),
        }
    }
}

/// Load every `*.md` file directly under `dir`, sorted by path.
///
/// A missing directory yields no documents.
pub async fn load_markdown_documents(dir: &Path) -> Result<Vec<Document>> {
    if !dir.exists() {
        tracing::warn!("Docs directory {} not found, skipping", dir.display());
        return Ok(Vec::new());
    }

    let mut entries = async_fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read docs directory {}", dir.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next().await {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = async_fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        documents.push(Document::new(content, path.display().to_string()));
    }

    tracing::info!("Loaded {} documents from {}", documents.len(), dir.display());
    Ok(documents)
}

/// Split text into windows of at most `chunk_size` characters, each sharing
/// `overlap` characters with its predecessor. Windows end at the last line
/// break or space when one falls in the back half of the window.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());
        if end < chars.len() {
            if let Some(brk) = find_break(&chars[start..end]) {
                if brk > chunk_size / 2 {
                    end = start + brk;
                }
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end >= chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

fn find_break(window: &[char]) -> Option<usize> {
    window
        .iter()
        .rposition(|c| *c == '\n')
        .or_else(|| window.iter().rposition(|c| *c == ' '))
        .map(|pos| pos + 1)
}
