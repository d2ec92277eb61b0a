//! Query executor: gate, run, and shape results.
//!
//! This module provides:
//! - `guard` - The SELECT/WITH-only, destructive-keyword statement gate
//! - `format` - Markdown table rendering with a bounded preview
//! - `types` - `ExecutionResult` and `ExecutionError`

mod format;
mod guard;
mod types;

use std::time::Instant;

use crate::services::database::DatabaseManager;

#[allow(unused_imports)]
pub use format::{NO_RESULTS, PREVIEW_ROWS, render_result, render_table, summary_line};
#[allow(unused_imports)]
pub use guard::{DESTRUCTIVE_KEYWORDS, validate};
pub use types::{ExecutionError, ExecutionResult, ResultSet};

#[derive(Debug, Clone)]
pub struct QueryExecutor {
    db: DatabaseManager,
}

impl QueryExecutor {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// Validate and run `sql`. Every failure comes back as
    /// [`ExecutionResult::Error`]; nothing here returns `Err`.
    pub async fn execute(&self, sql: &str) -> ExecutionResult {
        let sql = match validate(sql) {
            Ok(sql) => sql,
            Err(err) => {
                tracing::warn!("Rejected statement: {}", err);
                return ExecutionResult::Error(err);
            }
        };

        let start_time = Instant::now();
        match self.db.fetch_rows(sql).await {
            Ok(output) => {
                let execution_time_ms = start_time.elapsed().as_millis();
                if output.rows.is_empty() {
                    tracing::info!(execution_time_ms = execution_time_ms as u64, "No rows");
                    return ExecutionResult::NoResults;
                }

                let row_count = output.rows.len();
                tracing::info!(
                    row_count,
                    execution_time_ms = execution_time_ms as u64,
                    "Query succeeded"
                );
                ExecutionResult::Rows(ResultSet {
                    columns: output.columns,
                    rows: output.rows,
                    row_count,
                    execution_time_ms,
                    original_query: sql.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!("Query failed: {}", e);
                ExecutionResult::Error(ExecutionError::ExecutionFailed {
                    message: e.to_string(),
                })
            }
        }
    }
}
