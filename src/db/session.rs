//! Session record storage.
//!
//! One row per user identity holding the most recently issued token pair.
//! Writes are upserts keyed by `user_id`, so concurrent writers for the same
//! user resolve as last-write-wins inside SQLite. Every operation is bounded
//! by the store timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

/// Default bound on a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the session store. Both variants are transient.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store failure: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session store operation timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout(_))
    }
}

/// Persisted mirror of the last pair issued to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: String,
    /// Last-issued access token
    pub token: String,
    /// Last-issued refresh token
    pub refresh_token: String,
    /// UTC timestamp of the last write (`YYYY-MM-DD HH:MM:SS`)
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    user_id: String,
    token: String,
    refresh_token: String,
    updated_at: String,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            user_id: row.user_id,
            token: row.token,
            refresh_token: row.refresh_token,
            updated_at: row.updated_at,
        }
    }
}

/// Persistence seam for session records.
///
/// The SQLite implementation is [`SqliteSessionStore`]; other stores only need
/// atomic upsert-by-key and bounded latency.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or overwrite the record for `user_id`, stamping `updated_at`.
    async fn persist_pair(
        &self,
        user_id: &str,
        token: &str,
        refresh_token: &str,
    ) -> Result<(), StoreError>;

    /// Fetch the record for `user_id`, if any.
    async fn get(&self, user_id: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Delete the record for `user_id`. Returns whether a row was removed.
    async fn remove(&self, user_id: &str) -> Result<bool, StoreError>;
}

/// Run a store future, abandoning it once `limit` elapses.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

/// SQLite-backed session store.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Delete records not written for longer than `max_age`.
    pub async fn delete_stale(&self, max_age: Duration) -> Result<u64, StoreError> {
        let modifier = format!("-{} seconds", max_age.as_secs());
        let result = bounded(
            self.timeout,
            sqlx::query("DELETE FROM sessions WHERE updated_at < datetime('now', ?)")
                .bind(modifier)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = bounded(
            self.timeout,
            sqlx::query_as("SELECT COUNT(*) FROM sessions").fetch_one(&self.pool),
        )
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn persist_pair(
        &self,
        user_id: &str,
        token: &str,
        refresh_token: &str,
    ) -> Result<(), StoreError> {
        bounded(
            self.timeout,
            sqlx::query(
                "INSERT INTO sessions (user_id, token, refresh_token, updated_at)
                 VALUES (?, ?, ?, datetime('now'))
                 ON CONFLICT(user_id) DO UPDATE SET
                    token = excluded.token,
                    refresh_token = excluded.refresh_token,
                    updated_at = excluded.updated_at",
            )
            .bind(user_id)
            .bind(token)
            .bind(refresh_token)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let row: Option<SessionRow> = bounded(
            self.timeout,
            sqlx::query_as(
                "SELECT user_id, token, refresh_token, updated_at FROM sessions WHERE user_id = ?",
            )
            .bind(user_id)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.map(SessionRecord::from))
    }

    async fn remove(&self, user_id: &str) -> Result<bool, StoreError> {
        let result = bounded(
            self.timeout,
            sqlx::query("DELETE FROM sessions WHERE user_id = ?")
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_persist_and_get() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.sessions();

        store.persist_pair("u1", "access-1", "refresh-1").await.unwrap();

        let record = store.get("u1").await.unwrap().unwrap();
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.token, "access-1");
        assert_eq!(record.refresh_token, "refresh-1");
        assert!(!record.updated_at.is_empty());

        assert!(store.get("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persist_overwrites_existing_record() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.sessions();

        store.persist_pair("u1", "access-1", "refresh-1").await.unwrap();
        store.persist_pair("u1", "access-2", "refresh-2").await.unwrap();

        let record = store.get("u1").await.unwrap().unwrap();
        assert_eq!(record.token, "access-2");
        assert_eq!(record.refresh_token, "refresh-2");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.sessions();

        store.persist_pair("u1", "a", "r").await.unwrap();
        assert!(store.remove("u1").await.unwrap());
        assert!(!store.remove("u1").await.unwrap());
        assert!(store.get("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_stale_keeps_fresh_records() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.sessions();

        store.persist_pair("fresh", "a", "r").await.unwrap();
        sqlx::query(
            "INSERT INTO sessions (user_id, token, refresh_token, updated_at)
             VALUES ('old', 'a', 'r', datetime('now', '-8 days'))",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let deleted = store
            .delete_stale(Duration::from_secs(7 * 24 * 60 * 60))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get("fresh").await.unwrap().is_some());
        assert!(store.get("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bounded_reports_timeout() {
        let limit = Duration::from_millis(20);
        let result: Result<(), StoreError> =
            bounded(limit, std::future::pending::<Result<(), sqlx::Error>>()).await;

        match result {
            Err(StoreError::Timeout(d)) => assert_eq!(d, limit),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bounded_passes_through_errors() {
        let result: Result<(), StoreError> = bounded(Duration::from_secs(1), async {
            Err(sqlx::Error::RowNotFound)
        })
        .await;

        let err = result.unwrap_err();
        assert!(!err.is_timeout());
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
