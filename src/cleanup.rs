//! Scheduled cleanup of stale session records.

use std::time::Duration;

use tracing::{error, info};

use crate::db::Database;
use crate::jwt::REFRESH_TOKEN_DURATION_SECS;

/// Records untouched for longer than this can only hold expired refresh tokens.
const STALE_SESSION_AGE: Duration = Duration::from_secs(REFRESH_TOKEN_DURATION_SECS);

/// Interval between cleanup runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Run all cleanup tasks once.
pub async fn run_cleanup(db: &Database) {
    match db.sessions().delete_stale(STALE_SESSION_AGE).await {
        Ok(count) if count > 0 => info!("Cleaned up {} stale sessions", count),
        Ok(_) => {}
        Err(e) => error!("Failed to clean up stale sessions: {}", e),
    }
}

/// Spawn a background task that runs cleanup periodically.
/// Returns a handle that can be used to abort the task.
pub fn spawn_cleanup_scheduler(db: Database) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        // The first tick completes immediately; startup already ran a pass.
        interval.tick().await;

        loop {
            interval.tick().await;
            run_cleanup(&db).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SessionStore;

    #[tokio::test]
    async fn test_run_cleanup_removes_only_stale_sessions() {
        let db = Database::open(":memory:").await.unwrap();
        db.sessions().persist_pair("fresh", "a", "r").await.unwrap();
        sqlx::query(
            "INSERT INTO sessions (user_id, token, refresh_token, updated_at)
             VALUES ('stale', 'a', 'r', datetime('now', '-8 days'))",
        )
        .execute(db.pool())
        .await
        .unwrap();

        run_cleanup(&db).await;

        assert_eq!(db.sessions().count().await.unwrap(), 1);
        assert!(db.sessions().get("fresh").await.unwrap().is_some());
    }
}
