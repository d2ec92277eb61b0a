//! Extraction of the plan object from raw model text.
//!
//! The model is asked for exactly one JSON object but often wraps it in
//! prose or code fences. We take the span from the first `{` to the last
//! `}` and parse that. Text holding several objects yields an invalid span
//! and falls back like any other parse failure.

use serde::Deserialize;
use thiserror::Error;

use super::types::{PARSE_FAILURE_QUESTION, QueryPlan};

#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("malformed JSON in model output: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlan {
    sql: Option<String>,
    reasoning: Option<String>,
    needs_clarification: Option<bool>,
    clarifying_question: Option<String>,
}

/// The largest brace-delimited span: first `{` through last `}`
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

pub fn parse_plan(raw: &str) -> Result<QueryPlan, ParseFailure> {
    let span = extract_json_span(raw).ok_or(ParseFailure::NoJsonObject)?;
    let parsed: RawPlan = serde_json::from_str(span)?;

    Ok(QueryPlan {
        sql: parsed.sql.unwrap_or_default(),
        reasoning: parsed.reasoning.unwrap_or_default(),
        needs_clarification: parsed.needs_clarification.unwrap_or(false),
        clarifying_question: parsed.clarifying_question,
    })
}

/// Parse, or fall back to a clarification-requesting plan that carries the
/// failure and the raw text in its reasoning.
pub fn parse_plan_or_fallback(raw: &str) -> QueryPlan {
    match parse_plan(raw) {
        Ok(plan) => plan,
        Err(err) => {
            tracing::warn!("Falling back to clarification: {}", err);
            QueryPlan::clarification(
                format!("Failed to parse output: {}. Raw output: {}", err, raw),
                PARSE_FAILURE_QUESTION,
            )
        }
    }
}
