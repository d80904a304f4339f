use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::StorageResult;
use crate::session::Session;

/// How long a connection waits for another writer's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Breeds inserted by [`DbConnection::seed_breeds`], in id order.
pub const SEED_BREEDS: [&str; 3] = ["Chantilly-Tiffany", "Siamese", "Exotic Shorthair"];

/// DbConnection owns the connection pool for the process
#[derive(Clone)]
pub struct DbConnection {
    pool: SqlitePool,
}

impl DbConnection {
    /// Connect to the configured database and create the schema if it is missing
    pub async fn new(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let statement_level = if config.echo {
            LevelFilter::Info
        } else {
            LevelFilter::Off
        };

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT)
            .log_statements(statement_level);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        let db = Self { pool };
        if config.seed {
            db.seed_breeds().await?;
        }

        Ok(db)
    }

    /// Initialize a private in-memory database holding the demo fixture
    #[cfg(test)]
    pub async fn init_test() -> anyhow::Result<Self> {
        // One connection keeps the in-memory database alive and avoids
        // shared-cache table locks between connections.
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            echo: false,
            max_connections: 1,
            seed: true,
        };
        let db = Self::new(&config).await?;

        sqlx::query(
            r#"
            INSERT INTO kittens (color, age, description, breed_id)
            VALUES ('Gray', 2, 'Our first kitten', 1)
            "#,
        )
        .execute(&db.pool)
        .await?;

        Ok(db)
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS breeds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(25) NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kittens (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                color VARCHAR(50) NOT NULL,
                age INTEGER NOT NULL,
                description TEXT,
                breed_id INTEGER NOT NULL REFERENCES breeds (id),
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_kittens_breed_id ON kittens (breed_id);")
            .execute(pool)
            .await?;

        info!("Database schema ready");
        Ok(())
    }

    /// Insert the demo breeds if the table is empty.
    /// Returns the number of rows inserted.
    pub async fn seed_breeds(&self) -> StorageResult<u64> {
        let mut tx = self.pool.begin().await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM breeds")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        let mut inserted = 0;
        for name in SEED_BREEDS {
            inserted += sqlx::query("INSERT INTO breeds (name) VALUES (?)")
                .bind(name)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        info!("Seeded {} breeds", inserted);
        Ok(inserted)
    }

    /// Acquire a scoped session; the connection returns to the pool when it is dropped
    pub async fn session(&self) -> StorageResult<Session> {
        let conn = self.pool.acquire().await?;
        Ok(Session::new(conn))
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection; used at shutdown
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, seed: bool) -> DatabaseConfig {
        let path = dir.path().join("kittens.db");
        DatabaseConfig {
            url: format!("sqlite:{}", path.display()),
            echo: false,
            max_connections: 1,
            seed,
        }
    }

    #[tokio::test]
    async fn test_schema_created_on_new_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = DbConnection::new(&file_config(&dir, false))
            .await
            .expect("Failed to open database");

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('breeds', 'kittens') ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
        assert_eq!(names, vec!["breeds", "kittens"]);
        assert!(dir.path().join("kittens.db").exists());
    }

    #[tokio::test]
    async fn test_reopen_keeps_existing_data() {
        let dir = TempDir::new().expect("Failed to create temp dir");

        let db = DbConnection::new(&file_config(&dir, true)).await.unwrap();
        db.close().await;

        // Opening again must neither fail on existing tables nor seed twice
        let db = DbConnection::new(&file_config(&dir, true)).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM breeds")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_seed_breeds_only_when_empty() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        let inserted = db.seed_breeds().await.unwrap();
        assert_eq!(inserted, 0);

        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM breeds ORDER BY id")
            .fetch_all(db.pool())
            .await
            .unwrap();
        let expected: Vec<(i64, String)> = SEED_BREEDS
            .iter()
            .enumerate()
            .map(|(i, name)| (i as i64 + 1, name.to_string()))
            .collect();
        assert_eq!(rows, expected);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let db = DbConnection::init_test().await.unwrap();

        let result = sqlx::query("INSERT INTO kittens (color, age, breed_id) VALUES ('Black', 1, 99)")
            .execute(db.pool())
            .await;

        assert!(result.is_err(), "Insert with unknown breed should fail");
    }
}
