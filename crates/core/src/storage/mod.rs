pub mod records;

use crate::domain::quote::StoredRecord;
use anyhow::Context;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Where finalized rows of a pipeline run are appended.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, records: &[StoredRecord]) -> anyhow::Result<u64>;
}

/// Handle to the local SQLite store. Clones share one pool; connections are
/// checked out per operation and returned on drop.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid DATABASE_URL: {database_url}"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("connect DATABASE_URL failed")?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Single-connection in-memory store; the database lives as long as the pool.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("open in-memory sqlite failed")?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        records::create_table(&self.pool).await
    }

    pub async fn records_for_date(
        &self,
        date: NaiveDate,
        policy: Option<&str>,
    ) -> anyhow::Result<Vec<StoredRecord>> {
        records::list_by_date(&self.pool, date, policy).await
    }

    pub async fn latest_run_date(&self, policy: Option<&str>) -> anyhow::Result<Option<NaiveDate>> {
        records::latest_date(&self.pool, policy).await
    }
}

#[async_trait::async_trait]
impl RecordSink for SqliteStore {
    async fn append(&self, records: &[StoredRecord]) -> anyhow::Result<u64> {
        records::append(&self.pool, records).await
    }
}
