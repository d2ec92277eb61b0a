use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PARSE_FAILURE_QUESTION: &str =
    "I couldn't parse the model output; could you rephrase or provide more detail?";
pub const PROVIDER_FAILURE_QUESTION: &str =
    "I couldn't get an answer from the language model; could you ask again?";
const DEFAULT_CLARIFYING_QUESTION: &str = "Please clarify your request.";

/// Structured output of the planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub sql: String,
    pub reasoning: String,
    pub needs_clarification: bool,
    pub clarifying_question: Option<String>,
}

impl QueryPlan {
    /// A plan asking the user to clarify, with no usable SQL.
    pub fn clarification(reasoning: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            sql: String::new(),
            reasoning: reasoning.into(),
            needs_clarification: true,
            clarifying_question: Some(question.into()),
        }
    }

    /// The question to put to the user, falling back to a generic prompt
    pub fn question_for_user(&self) -> String {
        self.clarifying_question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_CLARIFYING_QUESTION)
            .to_string()
    }

    /// Trimmed SQL, when the plan has some and is not asking for clarification
    pub fn usable_sql(&self) -> Option<&str> {
        let sql = self.sql.trim();
        (!self.needs_clarification && !sql.is_empty()).then_some(sql)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("clarification required: {question}")]
    ClarificationRequired { question: String },
    #[error("no SQL generated: {reasoning}")]
    EmptyGeneration { reasoning: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clarification_always_wins() {
        let plan = QueryPlan {
            sql: "SELECT 1".to_string(),
            reasoning: String::new(),
            needs_clarification: true,
            clarifying_question: None,
        };
        assert_eq!(plan.usable_sql(), None);
        assert_eq!(plan.question_for_user(), DEFAULT_CLARIFYING_QUESTION);
    }

    #[test]
    fn test_usable_sql_is_trimmed() {
        let plan = QueryPlan {
            sql: "\n  SELECT 1 \n".to_string(),
            reasoning: String::new(),
            needs_clarification: false,
            clarifying_question: None,
        };
        assert_eq!(plan.usable_sql(), Some("SELECT 1"));
    }
}
