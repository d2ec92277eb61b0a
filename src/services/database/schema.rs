use anyhow::{Result, anyhow};
use sqlx::SqlitePool;

use super::manager::DatabaseManager;
use super::types::{ColumnDetail, ForeignKeyInfo, TableInfo, TableSchema};

impl DatabaseManager {
    /// User tables and views, ordered by name
    pub async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let pool_guard = self.pool.read().await;
        let pool = pool_guard
            .as_ref()
            .ok_or_else(|| anyhow!("Database not connected"))?;

        fetch_tables(pool).await
    }

    pub async fn table_schema(&self, table: &TableInfo) -> Result<TableSchema> {
        let pool_guard = self.pool.read().await;
        let pool = pool_guard
            .as_ref()
            .ok_or_else(|| anyhow!("Database not connected"))?;

        let columns = fetch_columns(pool, &table.table_name).await?;
        let foreign_keys = fetch_foreign_keys(pool, &table.table_name).await?;

        Ok(TableSchema {
            table_name: table.table_name.clone(),
            table_type: table.table_type.clone(),
            columns,
            foreign_keys,
        })
    }

    /// Schema for every table and view
    pub async fn database_schema(&self) -> Result<Vec<TableSchema>> {
        let tables = self.list_tables().await?;
        let mut schemas = Vec::with_capacity(tables.len());
        for table in &tables {
            schemas.push(self.table_schema(table).await?);
        }
        tracing::debug!("Introspected {} tables", schemas.len());
        Ok(schemas)
    }
}

async fn fetch_tables(pool: &SqlitePool) -> Result<Vec<TableInfo>> {
    let rows = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT name, type
        FROM sqlite_master
        WHERE type IN ('table', 'view')
          AND name NOT LIKE 'sqlite_%'
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(table_name, table_type)| TableInfo {
            table_name,
            table_type,
        })
        .collect())
}

async fn fetch_columns(pool: &SqlitePool, table: &str) -> Result<Vec<ColumnDetail>> {
    let rows = sqlx::query_as::<_, (String, String, i64, Option<String>, i64)>(
        r#"
        SELECT name, type, "notnull", dflt_value, pk
        FROM pragma_table_info(?)
        ORDER BY cid
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(column_name, data_type, not_null, column_default, pk)| ColumnDetail {
                column_name,
                data_type,
                is_nullable: not_null == 0,
                column_default,
                is_primary_key: pk > 0,
            },
        )
        .collect())
}

async fn fetch_foreign_keys(pool: &SqlitePool, table: &str) -> Result<Vec<ForeignKeyInfo>> {
    let rows = sqlx::query_as::<_, (String, String, Option<String>)>(
        r#"
        SELECT "from", "table", "to"
        FROM pragma_foreign_key_list(?)
        ORDER BY id, seq
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(column_name, foreign_table_name, foreign_column_name)| ForeignKeyInfo {
                column_name,
                foreign_table_name,
                foreign_column_name,
            },
        )
        .collect())
}

#[cfg(test)]
mod tests {
    use super::super::manager::testing::northwind_fixture;

    #[test]
    fn test_list_tables() {
        smol::block_on(async {
            let db = northwind_fixture().await;
            let tables = db.list_tables().await.unwrap();
            let names: Vec<_> = tables.iter().map(|t| t.table_name.as_str()).collect();
            assert_eq!(names, vec!["Customers", "Orders"]);
            assert!(tables.iter().all(|t| t.table_type == "table"));
        });
    }

    #[test]
    fn test_table_schema_and_description() {
        smol::block_on(async {
            let db = northwind_fixture().await;
            let schemas = db.database_schema().await.unwrap();
            let orders = schemas.iter().find(|s| s.table_name == "Orders").unwrap();

            assert_eq!(orders.columns.len(), 4);
            assert!(orders.columns[0].is_primary_key);
            assert_eq!(orders.foreign_keys.len(), 1);
            assert_eq!(orders.foreign_keys[0].foreign_table_name, "Customers");

            let text = orders.describe();
            assert!(text.starts_with("Table Orders\nColumns:\n"));
            assert!(text.contains("- OrderID INTEGER (primary key)"));
            assert!(text.contains("- CustomerID -> Customers.CustomerID"));
        });
    }
}
