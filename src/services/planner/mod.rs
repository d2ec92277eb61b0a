//! Query planner: retrieved context + question -> model -> structured plan.
//!
//! This module provides:
//! - `conversation` - The session-owned conversation history
//! - `parse` - Plan extraction from raw model text
//! - `prompts` - The fixed generation policy
//! - `types` - `QueryPlan` and the errors of the `generate_sql` convenience

mod conversation;
mod parse;
mod prompts;
mod types;

use anyhow::{Result, anyhow};
use futures::FutureExt;
use std::time::Duration;

use crate::services::agent::{CompletionPrompt, CompletionProvider};
use crate::services::retrieval::{RetrievedSnippet, Retriever};

#[allow(unused_imports)]
pub use conversation::{Conversation, ConversationTurn, Role};
#[allow(unused_imports)]
pub use parse::{ParseFailure, extract_json_span, parse_plan};
pub use prompts::system_policy;
pub use types::{PARSE_FAILURE_QUESTION, PlanError, QueryPlan};

use parse::parse_plan_or_fallback;
use types::PROVIDER_FAILURE_QUESTION;

pub const DEFAULT_TOP_K: usize = 50;
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

pub struct QueryPlanner<R, C> {
    retriever: R,
    provider: C,
    top_k: usize,
    dialect: String,
    timeout: Duration,
}

impl<R, C> QueryPlanner<R, C>
where
    R: Retriever,
    C: CompletionProvider,
{
    pub fn new(retriever: R, provider: C) -> Self {
        Self {
            retriever,
            provider,
            top_k: DEFAULT_TOP_K,
            dialect: "SQLite".to_string(),
            timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Draft a plan for `question`.
    ///
    /// Never fails: unparseable model output and provider errors both come
    /// back as plans asking for clarification. The question (and any
    /// clarifying question) is appended to `history` on every call.
    pub async fn plan(&self, question: &str, history: &mut Conversation) -> QueryPlan {
        let context = self.build_context(question, history);
        let prompt = CompletionPrompt {
            system: system_policy(&self.dialect),
            context,
            question: question.to_string(),
        };

        let plan = match self.complete_with_timeout(&prompt).await {
            Ok(raw) => {
                tracing::debug!("Model output: {}", raw);
                parse_plan_or_fallback(&raw)
            }
            Err(e) => {
                tracing::warn!("Completion failed: {}", e);
                QueryPlan::clarification(
                    format!("Completion provider failed: {}", e),
                    PROVIDER_FAILURE_QUESTION,
                )
            }
        };

        history.push_user(question);
        if let Some(q) = plan.clarifying_question.as_deref().filter(|q| !q.trim().is_empty()) {
            history.push_assistant(q);
        }

        tracing::info!(
            needs_clarification = plan.needs_clarification,
            has_sql = !plan.sql.trim().is_empty(),
            "Plan ready"
        );
        plan
    }

    /// Plan and return only usable SQL.
    pub async fn generate_sql(
        &self,
        question: &str,
        history: &mut Conversation,
    ) -> Result<String, PlanError> {
        let plan = self.plan(question, history).await;

        if plan.needs_clarification {
            return Err(PlanError::ClarificationRequired {
                question: plan.question_for_user(),
            });
        }

        let sql = plan.sql.trim();
        if sql.is_empty() {
            return Err(PlanError::EmptyGeneration {
                reasoning: plan.reasoning,
            });
        }
        Ok(sql.to_string())
    }

    fn build_context(&self, question: &str, history: &Conversation) -> String {
        let query = format!("{}\n{}", question, history.transcript());
        match self.retriever.retrieve(&query, self.top_k) {
            Ok(snippets) => {
                tracing::debug!("Retrieved {} snippets", snippets.len());
                render_context(&snippets)
            }
            Err(e) => {
                tracing::warn!("Retrieval failed, planning without context: {}", e);
                String::new()
            }
        }
    }

    async fn complete_with_timeout(&self, prompt: &CompletionPrompt) -> Result<String> {
        let completion = self.provider.complete(prompt);
        let timeout = smol::Timer::after(self.timeout);

        futures::select! {
            result = Box::pin(completion).fuse() => result,
            _ = Box::pin(timeout).fuse() => {
                Err(anyhow!("completion timed out after {}s", self.timeout.as_secs_f32()))
            }
        }
    }
}

/// `SOURCES: a, b` (distinct, first-seen order) then the snippet bodies
/// separated by blank lines.
pub fn render_context(snippets: &[RetrievedSnippet]) -> String {
    let mut sources: Vec<&str> = Vec::new();
    for source in snippets
        .iter()
        .filter_map(|s| s.source.as_deref())
        .filter(|s| !s.is_empty())
    {
        if !sources.contains(&source) {
            sources.push(source);
        }
    }

    let mut context = if sources.is_empty() {
        String::new()
    } else {
        format!("SOURCES: {}\n\n", sources.join(", "))
    };

    context.push_str(
        &snippets
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
    );
    context
}
