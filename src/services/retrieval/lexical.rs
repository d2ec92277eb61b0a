//! Term-overlap retriever.
//!
//! Chunks are ranked by the summed inverse document frequency of the query
//! terms they contain. Ties keep corpus order.

use anyhow::Result;
use std::collections::{HashMap, HashSet};

use super::documents::{CHUNK_OVERLAP, CHUNK_SIZE, Document, split_text};
use super::{RetrievedSnippet, Retriever};

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "what", "which", "who", "how", "many", "much", "with",
    "from", "that", "this", "there", "their", "have", "has", "did", "does", "show", "list",
    "give", "get", "all", "per", "each", "by", "of", "in", "on", "to", "is", "a", "an", "me",
];

struct Chunk {
    text: String,
    source: Option<String>,
    terms: HashSet<String>,
}

pub struct LexicalRetriever {
    chunks: Vec<Chunk>,
    document_frequency: HashMap<String, usize>,
}

impl LexicalRetriever {
    pub fn from_documents(documents: &[Document]) -> Self {
        let mut chunks = Vec::new();
        for doc in documents {
            for text in split_text(&doc.content, CHUNK_SIZE, CHUNK_OVERLAP) {
                let terms = tokenize(&text).collect();
                chunks.push(Chunk {
                    text,
                    source: doc.source.clone(),
                    terms,
                });
            }
        }

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for chunk in &chunks {
            for term in &chunk.terms {
                *document_frequency.entry(term.clone()).or_default() += 1;
            }
        }

        tracing::debug!(
            "Indexed {} chunks from {} documents",
            chunks.len(),
            documents.len()
        );

        Self {
            chunks,
            document_frequency,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn idf(&self, term: &str) -> f64 {
        let df = self.document_frequency.get(term).copied().unwrap_or(0) as f64;
        let n = self.chunks.len() as f64;
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }
}

impl Retriever for LexicalRetriever {
    fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<RetrievedSnippet>> {
        let query_terms: HashSet<String> = tokenize(query).collect();

        let mut scored: Vec<(usize, f64)> = self
            .chunks
            .iter()
            .enumerate()
            .filter_map(|(i, chunk)| {
                let score: f64 = query_terms
                    .iter()
                    .filter(|t| chunk.terms.contains(*t))
                    .map(|t| self.idf(t))
                    .sum();
                (score > 0.0).then_some((i, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(i, _)| {
                let chunk = &self.chunks[i];
                RetrievedSnippet::new(chunk.text.clone(), chunk.source.clone())
            })
            .collect())
    }
}

/// Lowercased alphanumeric terms with stopwords dropped and a trailing
/// plural `s` removed, so "Customers" and "customer" meet.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| w.len() > 1)
        .map(|w| w.to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .map(|w| {
            if w.len() > 3 && w.ends_with('s') && !w.ends_with("ss") {
                w[..w.len() - 1].to_string()
            } else {
                w
            }
        })
}
