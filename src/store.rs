use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

// Embedded migrations (compiled in)
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub const PANTRY_KEY: &str = "kitchen.pantry";
pub const RECIPES_KEY: &str = "kitchen.recipes";

/// String key-value store backing the session snapshots.
#[derive(Clone, Debug)]
pub struct KvStore {
    pool: SqlitePool,
}

impl KvStore {
    /// Open (creating if needed) the database file and run migrations.
    ///
    /// # Errors
    /// Err if the parent directory can't be created or the database can't be opened.
    pub async fn open(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // Connect, then **run migrations**
        let pool = SqlitePool::connect_with(opts).await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database; a single connection that never expires,
    /// since every new connection would see an empty database.
    ///
    /// # Errors
    /// Err if SQLite can't be initialised.
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    /// # Errors
    /// Err if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(v,)| v))
    }

    /// # Errors
    /// Err if the query fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
              value      = excluded.value,
              updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Drop every key.
    ///
    /// # Errors
    /// Err if the query fails.
    pub async fn clear(&self) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM kv").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool; later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
