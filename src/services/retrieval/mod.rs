//! Retrieval of schema and documentation snippets for prompt context.
//!
//! This module provides:
//! - `documents` - Markdown loading and chunking
//! - `lexical` - A term-overlap ranking retriever over loaded chunks

mod documents;
mod lexical;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use documents::{Document, load_markdown_documents, split_text};
pub use lexical::LexicalRetriever;

/// A retrieved text fragment plus optional provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedSnippet {
    pub text: String,
    pub source: Option<String>,
}

impl RetrievedSnippet {
    pub fn new(text: impl Into<String>, source: Option<String>) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Returns snippets for a query, most relevant first, at most `limit` of them.
pub trait Retriever {
    fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<RetrievedSnippet>>;
}
