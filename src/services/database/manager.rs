use anyhow::{Result, anyhow};
use async_lock::RwLock;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pub(crate) pool: Arc<RwLock<Option<SqlitePool>>>,
}

impl DatabaseManager {
    pub fn new() -> Self {
        Self {
            pool: Arc::new(RwLock::new(None)),
        }
    }

    /// Wrap an already-open pool
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(RwLock::new(Some(pool))),
        }
    }

    /// Open the database file read-only. The file must already exist.
    pub async fn connect(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(anyhow!("Database file {} not found", path.display()));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        self.connect_with_options(options).await?;
        tracing::info!("Connected to {} (read-only)", path.display());
        Ok(())
    }

    pub async fn connect_with_options(&self, options: SqliteConnectOptions) -> Result<()> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!("Error Connecting: {}", e);
                anyhow!("Failed to open database: {}", e)
            })?;

        let mut pool_guard = self.pool.write().await;
        if let Some(old) = pool_guard.replace(pool) {
            old.close().await;
        }

        Ok(())
    }

    pub async fn disconnect(&self) -> Result<()> {
        let mut pool_guard = self.pool.write().await;
        if let Some(pool) = pool_guard.take() {
            pool.close().await;
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "No active database connection to disconnect"
            ))
        }
    }

    pub async fn is_connected(&self) -> bool {
        let pool_guard = self.pool.read().await;
        if let Some(pool) = pool_guard.as_ref() {
            sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
        } else {
            false
        }
    }
}

impl Default for DatabaseManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::str::FromStr;

    /// A single-connection in-memory database with a small Northwind slice.
    ///
    /// Customers: 3 rows. Orders: 120 rows, one per (customer, n).
    pub(crate) async fn northwind_fixture() -> DatabaseManager {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE Customers (
                CustomerID TEXT PRIMARY KEY,
                CompanyName TEXT NOT NULL,
                Country TEXT,
                Logo BLOB
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE Orders (
                OrderID INTEGER PRIMARY KEY,
                CustomerID TEXT REFERENCES Customers(CustomerID),
                Freight REAL,
                ShipCountry TEXT
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        for (id, name, country) in [
            ("ALFKI", "Alfreds Futterkiste", Some("Germany")),
            ("BONAP", "Bon app'", Some("France")),
            ("NOCTRY", "Nowhere Ltd", None),
        ] {
            sqlx::query("INSERT INTO Customers (CustomerID, CompanyName, Country, Logo) VALUES (?, ?, ?, X'CAFE')")
                .bind(id)
                .bind(name)
                .bind(country)
                .execute(&pool)
                .await
                .unwrap();
        }

        for n in 0..120i64 {
            let customer = ["ALFKI", "BONAP", "NOCTRY"][(n % 3) as usize];
            sqlx::query(
                "INSERT INTO Orders (OrderID, CustomerID, Freight, ShipCountry) VALUES (?, ?, ?, ?)",
            )
            .bind(10248 + n)
            .bind(customer)
            .bind(n as f64 + 0.5)
            .bind("France")
            .execute(&pool)
            .await
            .unwrap();
        }

        DatabaseManager::with_pool(pool)
    }
}
