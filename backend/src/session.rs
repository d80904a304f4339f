//! Scoped database session: one pooled connection per request.
//!
//! Reads run directly on the connection. Every write is a single statement or
//! runs inside its own transaction, so a failure before `commit` leaves the
//! database untouched. Multi-statement writes issue a write first so that
//! concurrent writers queue on SQLite's busy timeout.

use chrono::Utc;
use sqlx::pool::PoolConnection;
use sqlx::{Acquire, Sqlite, SqliteConnection};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::models::{BreedRow, KittenChanges, KittenRow, NewKitten};

const KITTEN_SELECT: &str = r#"
    SELECT k.id, k.color, k.age, k.description, k.breed_id,
           k.created_at, k.updated_at, b.name AS breed_name
    FROM kittens k
    JOIN breeds b ON b.id = k.breed_id
"#;

pub struct Session {
    conn: PoolConnection<Sqlite>,
}

impl Session {
    pub fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self { conn }
    }

    /// List all breeds in insertion order
    pub async fn list_breeds(&mut self) -> StorageResult<Vec<BreedRow>> {
        let breeds = sqlx::query_as::<_, BreedRow>("SELECT id, name FROM breeds ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await?;
        debug!("Loaded {} breeds", breeds.len());
        Ok(breeds)
    }

    /// List kittens with their breed, optionally restricted to one breed
    pub async fn list_kittens(&mut self, filter_breed_id: Option<i64>) -> StorageResult<Vec<KittenRow>> {
        let kittens = match filter_breed_id {
            Some(breed_id) => {
                let sql = format!("{} WHERE k.breed_id = ? ORDER BY k.id", KITTEN_SELECT);
                sqlx::query_as::<_, KittenRow>(&sql)
                    .bind(breed_id)
                    .fetch_all(&mut *self.conn)
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY k.id", KITTEN_SELECT);
                sqlx::query_as::<_, KittenRow>(&sql)
                    .fetch_all(&mut *self.conn)
                    .await?
            }
        };
        debug!("Loaded {} kittens (filter_breed_id={:?})", kittens.len(), filter_breed_id);
        Ok(kittens)
    }

    /// Get a kitten with its breed, failing with `KittenNotFound` if absent
    pub async fn get_kitten(&mut self, id: i64) -> StorageResult<KittenRow> {
        fetch_kitten(&mut self.conn, id).await
    }

    /// Insert a kitten and return its id
    pub async fn create_kitten(&mut self, kitten: NewKitten) -> StorageResult<i64> {
        let mut tx = self.conn.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO kittens (color, age, description, breed_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&kitten.color)
        .bind(kitten.age)
        .bind(&kitten.description)
        .bind(kitten.breed_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        info!("Created kitten {} (color:{}, breed_id:{})", id, kitten.color, kitten.breed_id);
        Ok(id)
    }

    /// Apply a partial update to a kitten and refresh `updated_at`
    pub async fn update_kitten(&mut self, id: i64, changes: KittenChanges) -> StorageResult<()> {
        let now = Utc::now();
        let mut tx = self.conn.begin().await?;

        // Write before reading so the transaction takes SQLite's write lock
        // up front and waits on the busy timeout instead of failing the upgrade.
        let touched = sqlx::query("UPDATE kittens SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            return Err(StorageError::KittenNotFound(id));
        }

        let mut kitten = fetch_kitten(&mut tx, id).await?;
        changes.apply_to(&mut kitten);

        sqlx::query(
            r#"
            UPDATE kittens
            SET color = ?, age = ?, description = ?, breed_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&kitten.color)
        .bind(kitten.age)
        .bind(&kitten.description)
        .bind(kitten.breed_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Updated {}", kitten);
        Ok(())
    }

    /// Permanently delete a kitten
    pub async fn delete_kitten(&mut self, id: i64) -> StorageResult<()> {
        let deleted = sqlx::query("DELETE FROM kittens WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StorageError::KittenNotFound(id));
        }

        info!("Deleted kitten {}", id);
        Ok(())
    }
}

async fn fetch_kitten(conn: &mut SqliteConnection, id: i64) -> StorageResult<KittenRow> {
    let sql = format!("{} WHERE k.id = ?", KITTEN_SELECT);
    sqlx::query_as::<_, KittenRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::KittenNotFound(id))
}
