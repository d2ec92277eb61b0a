use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::database::ResultRow;

/// Rows from a successful statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    /// Total matching rows, independent of any preview truncation
    pub row_count: usize,
    pub execution_time_ms: u128,
    pub original_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Empty query")]
    EmptyStatement,
    #[error("Only SELECT or WITH statements can be executed (got {leading})")]
    RejectedStatementType { leading: String },
    #[error("Refusing to execute potentially destructive SQL (contains {keyword})")]
    RejectedDestructiveKeyword { keyword: &'static str },
    #[error("Query failed: {message}")]
    ExecutionFailed { message: String },
}

impl ExecutionError {
    /// True when the statement never reached the database
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ExecutionError::ExecutionFailed { .. })
    }
}

/// Result of one executor call
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    Rows(ResultSet),
    /// Ran fine, matched nothing
    NoResults,
    Error(ExecutionError),
}

impl ExecutionResult {
    pub fn row_count(&self) -> usize {
        match self {
            ExecutionResult::Rows(set) => set.row_count,
            _ => 0,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ExecutionResult::Error(_))
    }
}
