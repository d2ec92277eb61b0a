use anyhow::{Result, anyhow};
use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Either, Row, TypeInfo, ValueRef};
use std::collections::HashSet;

use super::manager::DatabaseManager;
use super::types::{QueryOutput, ResultCell, ResultRow};

impl DatabaseManager {
    /// Run one statement and collect every row it yields.
    ///
    /// Text holding more than one statement is an error; SQLite would
    /// otherwise run them all and interleave their rows. A pooled
    /// connection is held for the duration of the call only.
    pub async fn fetch_rows(&self, sql: &str) -> Result<QueryOutput> {
        let pool_guard = self.pool.read().await;
        let pool = pool_guard
            .as_ref()
            .ok_or_else(|| anyhow!("Database not connected"))?;

        let mut conn = pool.acquire().await?;
        let mut rows = Vec::new();
        let mut finished = false;

        #[allow(deprecated)]
        let mut stream = sqlx::query(sql).fetch_many(&mut *conn);
        while let Some(step) = stream.try_next().await? {
            if finished {
                return Err(anyhow!("You can only execute one statement at a time."));
            }
            match step {
                Either::Left(_) => finished = true,
                Either::Right(row) => rows.push(row),
            }
        }

        let columns = match rows.first() {
            Some(first) => unique_column_names(first),
            None => Vec::new(),
        };

        Ok(QueryOutput {
            columns,
            rows: convert_rows(&rows),
        })
    }
}

// ============================================================================
// Free functions for row processing
// ============================================================================

/// Column names, with repeats suffixed `_2`, `_3`, ... so every name is unique.
fn unique_column_names(row: &SqliteRow) -> Vec<String> {
    let mut seen = HashSet::new();
    row.columns()
        .iter()
        .map(|col| {
            let base = col.name().to_string();
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

fn convert_rows(rows: &[SqliteRow]) -> Vec<ResultRow> {
    rows.iter().map(convert_row).collect()
}

fn convert_row(row: &SqliteRow) -> ResultRow {
    let cells = (0..row.columns().len())
        .map(|i| extract_cell_value(row, i))
        .collect();

    ResultRow { cells }
}

fn extract_cell_value(row: &SqliteRow, index: usize) -> ResultCell {
    match row.try_get_raw(index) {
        Ok(raw_value) if raw_value.is_null() => ResultCell::null(),
        Ok(raw_value) => {
            let type_name = raw_value.type_info().name().to_string();
            decode_cell_value(row, &type_name, index)
        }
        Err(_) => ResultCell::value("ERROR"),
    }
}

// SQLite reports the storage class of each value, not the declared type
fn decode_cell_value(row: &SqliteRow, type_name: &str, index: usize) -> ResultCell {
    let decoded = match type_name {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(index).map(|v| v.to_string()),
        "REAL" => row.try_get::<f64, _>(index).map(|v| v.to_string()),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|v| format!("0x{}", hex::encode_upper(v))),
        _ => row.try_get::<String, _>(index),
    };

    match decoded {
        Ok(value) => ResultCell::value(value),
        Err(_) => row
            .try_get_unchecked::<String, _>(index)
            .map(ResultCell::value)
            .unwrap_or_else(|_| ResultCell::value("ERROR")),
    }
}

#[cfg(test)]
mod tests {
    use super::super::manager::testing::northwind_fixture;

    #[test]
    fn test_fetch_rows_stringifies_storage_classes() {
        smol::block_on(async {
            let db = northwind_fixture().await;
            let output = db
                .fetch_rows(
                    "SELECT CustomerID, Country, Logo, 42 AS answer, 2.5 AS ratio \
                     FROM Customers WHERE CustomerID = 'NOCTRY'",
                )
                .await
                .unwrap();

            assert_eq!(
                output.columns,
                vec!["CustomerID", "Country", "Logo", "answer", "ratio"]
            );
            let cells = &output.rows[0].cells;
            assert_eq!(cells[0].value, "NOCTRY");
            assert!(cells[1].is_null);
            assert_eq!(cells[1].value, "NULL");
            assert_eq!(cells[2].value, "0xCAFE");
            assert_eq!(cells[3].value, "42");
            assert_eq!(cells[4].value, "2.5");
        });
    }

    #[test]
    fn test_duplicate_column_names_are_suffixed() {
        smol::block_on(async {
            let db = northwind_fixture().await;
            let output = db
                .fetch_rows(
                    "SELECT c.CustomerID, o.CustomerID FROM Customers c \
                     JOIN Orders o ON o.CustomerID = c.CustomerID LIMIT 1",
                )
                .await
                .unwrap();

            assert_eq!(output.columns, vec!["CustomerID", "CustomerID_2"]);
        });
    }

    #[test]
    fn test_fetch_rows_empty_result() {
        smol::block_on(async {
            let db = northwind_fixture().await;
            let output = db
                .fetch_rows("SELECT * FROM Orders WHERE OrderID < 0")
                .await
                .unwrap();
            assert!(output.rows.is_empty());
            assert!(output.columns.is_empty());
        });
    }

    #[test]
    fn test_fetch_rows_reports_driver_errors() {
        smol::block_on(async {
            let db = northwind_fixture().await;
            let err = db.fetch_rows("SELECT * FROM Invoices").await.unwrap_err();
            assert!(err.to_string().contains("no such table"));
        });
    }

    #[test]
    fn test_fetch_rows_without_connection() {
        smol::block_on(async {
            let db = super::DatabaseManager::new();
            let err = db.fetch_rows("SELECT 1").await.unwrap_err();
            assert_eq!(err.to_string(), "Database not connected");
        });
    }
}
