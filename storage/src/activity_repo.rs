//! Activity repository: persisted activity stream fed by the message service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use social_core::{ActivityEvent, ActivityFeed, ActivitySink, UserRef, Verb};
use tracing::info;

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct ActivityRepository {
    pool_manager: SqlitePoolManager,
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    actor_id: i64,
    actor_username: String,
    verb: String,
    action_object_id: i64,
    created_at: DateTime<Utc>,
}

impl ActivityRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn record(&self, event: &ActivityEvent) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query(
            r#"
            INSERT INTO activities (actor_id, verb, action_object_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(event.actor.id)
        .bind(event.verb.as_str())
        .bind(event.action_object)
        .bind(event.timestamp)
        .execute(pool)
        .await?;

        info!(
            actor_id = event.actor.id,
            verb = %event.verb,
            action_object = event.action_object,
            "Recorded activity"
        );
        Ok(result.last_insert_rowid())
    }

    pub async fn get_actor_stream(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<ActivityEvent>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT a.actor_id, u.username AS actor_username, a.verb, a.action_object_id, a.created_at
            FROM activities a
            JOIN users u ON u.id = a.actor_id
            WHERE a.actor_id = ?
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let verb: Verb = row
                    .verb
                    .parse()
                    .map_err(|e: social_core::SocialError| StorageError::InvalidData(e.to_string()))?;
                Ok(ActivityEvent {
                    actor: UserRef::new(row.actor_id, row.actor_username),
                    verb,
                    action_object: row.action_object_id,
                    timestamp: row.created_at,
                })
            })
            .collect()
    }

    pub async fn count(&self) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities")
            .fetch_one(pool)
            .await?;
        Ok(total.0)
    }
}

#[async_trait]
impl ActivitySink for ActivityRepository {
    async fn emit(&self, event: &ActivityEvent) -> social_core::Result<()> {
        self.record(event).await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityFeed for ActivityRepository {
    async fn actor_stream(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> social_core::Result<Vec<ActivityEvent>> {
        Ok(self.get_actor_stream(user_id, limit).await?)
    }
}
