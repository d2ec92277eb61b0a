//! Export of query results to files.

mod csv;
mod json;

use anyhow::{Result, anyhow};
use std::path::Path;

use crate::services::executor::ResultSet;

pub use self::csv::export_to_csv;
pub use self::json::export_to_json;

/// Write `result` to `path`, choosing the format from the extension.
pub async fn export_to_path(result: &ResultSet, path: &Path) -> Result<()> {
    let contents = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => export_to_csv(result)?,
        Some(ext) if ext.eq_ignore_ascii_case("json") => export_to_json(result)?,
        _ => {
            return Err(anyhow!(
                "Unsupported export format for {} (use .csv or .json)",
                path.display()
            ));
        }
    };

    async_fs::write(path, contents).await?;
    tracing::info!("Exported {} rows to {}", result.row_count, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::{ResultCell, ResultRow};

    fn one_row() -> ResultSet {
        ResultSet {
            columns: vec!["n".to_string()],
            rows: vec![ResultRow {
                cells: vec![ResultCell::value("1")],
            }],
            row_count: 1,
            execution_time_ms: 0,
            original_query: "SELECT 1 AS n".to_string(),
        }
    }

    #[test]
    fn test_export_to_path_by_extension() {
        smol::block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let csv_path = dir.path().join("out.CSV");
            export_to_path(&one_row(), &csv_path).await.unwrap();
            assert_eq!(std::fs::read_to_string(&csv_path).unwrap(), "n\n1\n");

            let txt_path = dir.path().join("out.txt");
            assert!(export_to_path(&one_row(), &txt_path).await.is_err());
            assert!(!txt_path.exists());
        });
    }
}
