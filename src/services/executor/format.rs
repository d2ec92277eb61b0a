//! Markdown rendering of execution results.

use super::types::{ExecutionResult, ResultSet};

pub const PREVIEW_ROWS: usize = 50;

pub const NO_RESULTS: &str = "_No results._";

/// Render any result for display: a table, the no-results marker, or an error line.
pub fn render_result(result: &ExecutionResult) -> String {
    match result {
        ExecutionResult::Rows(set) => render_table(set),
        ExecutionResult::NoResults => NO_RESULTS.to_string(),
        ExecutionResult::Error(err) => format!("**ERROR**: {}", err),
    }
}

/// Header, separator, at most [`PREVIEW_ROWS`] data rows, then a summary line.
pub fn render_table(set: &ResultSet) -> String {
    let mut md = format!("| {} |\n", set.columns.join(" | "));
    md.push_str(&format!(
        "| {} |\n",
        vec!["---"; set.columns.len()].join(" | ")
    ));

    for row in set.rows.iter().take(PREVIEW_ROWS) {
        let cells: Vec<String> = row.cells.iter().map(|c| escape_cell(&c.value)).collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    md.push('\n');
    md.push_str(&summary_line(set));
    md
}

pub fn summary_line(set: &ResultSet) -> String {
    let mut summary = format!("{} rows", set.row_count);
    if set.row_count > PREVIEW_ROWS {
        summary.push_str(&format!(", showing first {}", PREVIEW_ROWS));
    }
    if set.original_query.to_uppercase().contains("GROUP BY") {
        summary.push_str(" (grouped results)");
    }
    summary
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::{ResultCell, ResultRow};
    use crate::services::executor::types::ExecutionError;

    fn result_set(rows: usize, query: &str) -> ResultSet {
        ResultSet {
            columns: vec!["Country".to_string(), "Orders".to_string()],
            rows: (0..rows)
                .map(|i| ResultRow {
                    cells: vec![
                        ResultCell::value(format!("C{}", i)),
                        ResultCell::value(i.to_string()),
                    ],
                })
                .collect(),
            row_count: rows,
            execution_time_ms: 1,
            original_query: query.to_string(),
        }
    }

    #[test]
    fn test_render_table_layout() {
        let md = render_table(&result_set(2, "SELECT Country, Orders FROM t"));
        assert_eq!(
            md,
            "| Country | Orders |\n| --- | --- |\n| C0 | 0 |\n| C1 | 1 |\n\n2 rows"
        );
    }

    #[test]
    fn test_preview_is_capped() {
        let md = render_table(&result_set(120, "SELECT * FROM t"));
        // skip header and separator
        let data_rows = md.lines().skip(2).filter(|l| l.starts_with('|')).count();

        assert_eq!(data_rows, 50);
        assert!(md.ends_with("120 rows, showing first 50"));
    }

    #[test]
    fn test_group_by_annotation() {
        let set = result_set(3, "select Country, count(*) from Orders group  by Country");
        assert_eq!(summary_line(&set), "3 rows");

        let set = result_set(3, "select Country, count(*) from Orders group by Country");
        assert_eq!(summary_line(&set), "3 rows (grouped results)");
    }

    #[test]
    fn test_cells_are_escaped() {
        let mut set = result_set(1, "SELECT 1");
        set.rows[0].cells[0] = ResultCell::value("a|b\nc");
        assert!(render_table(&set).contains("| a\\|b c | 0 |"));
    }

    #[test]
    fn test_render_no_results_and_errors() {
        assert_eq!(render_result(&ExecutionResult::NoResults), "_No results._");

        let err = ExecutionResult::Error(ExecutionError::RejectedDestructiveKeyword {
            keyword: "DROP",
        });
        assert_eq!(
            render_result(&err),
            "**ERROR**: Refusing to execute potentially destructive SQL (contains DROP)"
        );
    }
}
