use crate::error::Result;
use crate::store::Table;
use crate::store::schema::SCHEMA;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::{debug, info};

/// Handle on the tracker database, opened once per run and closed on every exit path.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().max_connections(4).connect_with(options).await?;

        let db = Self { pool };
        db.migrate().await?;
        info!("Connected to {}", database_url);
        Ok(db)
    }

    /// Private in-memory database; a single connection that never expires keeps it alive.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        debug!("Schema applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a batch. Dropping the transaction without committing rolls the batch back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn count(&self, table: Table) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        Ok(sqlx::query_scalar(&sql).fetch_one(&self.pool).await?)
    }

    pub async fn row_counts(&self) -> Result<Vec<(Table, i64)>> {
        let mut counts = Vec::new();
        for table in Table::iter() {
            counts.push((table, self.count(table).await?));
        }
        Ok(counts)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
