//! Read-only statement gate.
//!
//! Plain substring matching on the uppercased text, no tokenizing. A SELECT
//! that merely mentions a listed word (a string literal, a column named
//! `CREATED_AT`) is refused too. Keep it that way unless a SQL-aware check
//! replaces it wholesale.

use super::types::ExecutionError;

pub const ALLOWED_PREFIXES: &[&str] = &["SELECT", "WITH"];

pub const DESTRUCTIVE_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "PRAGMA",
];

/// Check `sql` and return it trimmed. The returned text is what runs; the
/// uppercased copy is only for matching.
pub fn validate(sql: &str) -> Result<&str, ExecutionError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(ExecutionError::EmptyStatement);
    }

    let upper = trimmed.to_uppercase();

    if !ALLOWED_PREFIXES.iter().any(|p| upper.starts_with(*p)) {
        return Err(ExecutionError::RejectedStatementType {
            leading: leading_word(trimmed),
        });
    }

    if let Some(&keyword) = DESTRUCTIVE_KEYWORDS.iter().find(|k| upper.contains(**k)) {
        return Err(ExecutionError::RejectedDestructiveKeyword { keyword });
    }

    Ok(trimmed)
}

fn leading_word(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .take(20)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_type_gate() {
        assert_eq!(
            validate("DELETE FROM Orders"),
            Err(ExecutionError::RejectedStatementType {
                leading: "DELETE".to_string()
            })
        );
        assert_eq!(validate("  select * from orders"), Ok("select * from orders"));
        assert_eq!(
            validate("with t as (select 1) select * from t"),
            Ok("with t as (select 1) select * from t")
        );
        assert!(matches!(
            validate("EXPLAIN SELECT 1"),
            Err(ExecutionError::RejectedStatementType { .. })
        ));
    }

    #[test]
    fn test_destructive_keyword_anywhere() {
        assert_eq!(
            validate("SELECT 'DROP' AS x"),
            Err(ExecutionError::RejectedDestructiveKeyword { keyword: "DROP" })
        );
        assert_eq!(
            validate("WITH x AS (SELECT 1) DELETE FROM Orders"),
            Err(ExecutionError::RejectedDestructiveKeyword { keyword: "DELETE" })
        );
        assert_eq!(
            validate("select created_at from events"),
            Err(ExecutionError::RejectedDestructiveKeyword { keyword: "CREATE" })
        );
        assert_eq!(
            validate("SELECT 1; pragma table_info(Orders)"),
            Err(ExecutionError::RejectedDestructiveKeyword { keyword: "PRAGMA" })
        );
    }

    #[test]
    fn test_type_gate_runs_before_keyword_gate() {
        assert!(matches!(
            validate("DROP TABLE Orders"),
            Err(ExecutionError::RejectedStatementType { .. })
        ));
    }

    #[test]
    fn test_empty_statement() {
        assert_eq!(validate(""), Err(ExecutionError::EmptyStatement));
        assert_eq!(validate(" \n\t "), Err(ExecutionError::EmptyStatement));
    }
}
