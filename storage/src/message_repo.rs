//! Message repository: persistence and queries for messages and their tag/mention links.
//!
//! Uses SqlitePoolManager and the models (MessageRecord, MessageStats).
//! Link tables are rewritten inside a transaction so readers never see a half-replaced set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use social_core::{Message, MessageId, MessageStore, Subject, Tag, UserRef};
use tracing::info;

use crate::error::StorageError;
use crate::models::{MessageRecord, MessageStats};
use crate::sqlite_pool::SqlitePoolManager;

const SELECT_MESSAGES: &str = r#"
    SELECT m.id, m.text, m.author_id, u.username AS author_username, m.created_at,
           m.subject_type, m.subject_id, m.rendered_html
    FROM messages m
    JOIN users u ON u.id = m.author_id
"#;

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

impl MessageRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn insert_message(&self, message: &Message) -> Result<MessageId, StorageError> {
        let pool = self.pool_manager.pool();
        let subject = message.subject();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (text, author_id, created_at, subject_type, subject_id, rendered_html)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.text())
        .bind(message.author().id)
        .bind(message.created_at())
        .bind(subject.map(|s| s.kind()))
        .bind(subject.map(|s| s.id()))
        .bind(message.rendered_html())
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(message_id = id, author_id = message.author().id, "Saved message");
        Ok(id)
    }

    pub async fn update_message(&self, message: &Message) -> Result<(), StorageError> {
        let id = message
            .id()
            .ok_or_else(|| StorageError::InvalidData("cannot update an unsaved message".to_string()))?;
        let pool = self.pool_manager.pool();
        let subject = message.subject();

        let result = sqlx::query(
            r#"
            UPDATE messages
            SET text = ?, subject_type = ?, subject_id = ?, rendered_html = ?
            WHERE id = ?
            "#,
        )
        .bind(message.text())
        .bind(subject.map(|s| s.kind()))
        .bind(subject.map(|s| s.id()))
        .bind(message.rendered_html())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("message {}", id)));
        }

        info!(message_id = id, "Updated message");
        Ok(())
    }

    pub async fn set_tags(&self, id: MessageId, tags: &[Tag]) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query("DELETE FROM message_tags WHERE message_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for tag in tags {
            sqlx::query("INSERT OR IGNORE INTO message_tags (message_id, tag_id) VALUES (?, ?)")
                .bind(id)
                .bind(tag.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn set_mentions(&self, id: MessageId, users: &[UserRef]) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query("DELETE FROM message_mentions WHERE message_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for user in users {
            sqlx::query("INSERT OR IGNORE INTO message_mentions (message_id, user_id) VALUES (?, ?)")
                .bind(id)
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_message_by_id(&self, id: MessageId) -> Result<Option<Message>, StorageError> {
        let pool = self.pool_manager.pool();
        let sql = format!("{} WHERE m.id = ?", SELECT_MESSAGES);

        let record = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match record {
            Some(record) => Ok(Some(self.hydrate(record).await?)),
            None => Ok(None),
        }
    }

    pub async fn delete_message(&self, id: MessageId) -> Result<bool, StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query("DELETE FROM message_tags WHERE message_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM message_mentions WHERE message_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        info!(message_id = id, deleted, "Deleted message");
        Ok(deleted)
    }

    pub async fn get_messages_with_tag(&self, slug: &str) -> Result<Vec<Message>, StorageError> {
        let sql = format!(
            "{} JOIN message_tags mt ON mt.message_id = m.id \
             JOIN tags t ON t.id = mt.tag_id \
             WHERE t.slug = ? ORDER BY m.created_at DESC, m.id DESC",
            SELECT_MESSAGES
        );

        let records = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(slug)
            .fetch_all(self.pool_manager.pool())
            .await?;

        info!("Retrieved {} messages tagged '{}'", records.len(), slug);
        self.hydrate_all(records).await
    }

    pub async fn get_messages_mentioning(&self, user_id: i64) -> Result<Vec<Message>, StorageError> {
        let sql = format!(
            "{} JOIN message_mentions mm ON mm.message_id = m.id \
             WHERE mm.user_id = ? ORDER BY m.created_at DESC, m.id DESC",
            SELECT_MESSAGES
        );

        let records = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(user_id)
            .fetch_all(self.pool_manager.pool())
            .await?;

        self.hydrate_all(records).await
    }

    pub async fn get_messages_for_subject(
        &self,
        subject: Subject,
    ) -> Result<Vec<Message>, StorageError> {
        let sql = format!(
            "{} WHERE m.subject_type = ? AND m.subject_id = ? ORDER BY m.created_at DESC, m.id DESC",
            SELECT_MESSAGES
        );

        let records = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(subject.kind())
            .bind(subject.id())
            .fetch_all(self.pool_manager.pool())
            .await?;

        self.hydrate_all(records).await
    }

    pub async fn get_messages_by_author(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, StorageError> {
        let sql = format!(
            "{} WHERE m.author_id = ? ORDER BY m.created_at DESC, m.id DESC LIMIT ?",
            SELECT_MESSAGES
        );

        let records = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(user_id)
            .bind(limit.unwrap_or(-1))
            .fetch_all(self.pool_manager.pool())
            .await?;

        info!("Retrieved {} messages by author {}", records.len(), user_id);
        self.hydrate_all(records).await
    }

    pub async fn get_stats(&self) -> Result<MessageStats, StorageError> {
        let pool = self.pool_manager.pool();

        let total_messages: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(pool)
            .await?;

        let unique_authors: (i64,) =
            sqlx::query_as("SELECT COUNT(DISTINCT author_id) FROM messages")
                .fetch_one(pool)
                .await?;

        let total_tags: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
            .fetch_one(pool)
            .await?;

        let total_mentions: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM message_mentions")
            .fetch_one(pool)
            .await?;

        let first_message: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MIN(created_at) FROM messages")
                .fetch_one(pool)
                .await?;

        let last_message: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(created_at) FROM messages")
                .fetch_one(pool)
                .await?;

        Ok(MessageStats {
            total_messages: total_messages.0,
            unique_authors: unique_authors.0,
            total_tags: total_tags.0,
            total_mentions: total_mentions.0,
            first_message,
            last_message,
        })
    }

    async fn tag_names(&self, id: MessageId) -> Result<Vec<String>, StorageError> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT t.name FROM message_tags mt
            JOIN tags t ON t.id = mt.tag_id
            WHERE mt.message_id = ?
            ORDER BY mt.rowid
            "#,
        )
        .bind(id)
        .fetch_all(self.pool_manager.pool())
        .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    async fn mentioned_users(&self, id: MessageId) -> Result<Vec<UserRef>, StorageError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT u.id, u.username FROM message_mentions mm
            JOIN users u ON u.id = mm.user_id
            WHERE mm.message_id = ?
            ORDER BY mm.rowid
            "#,
        )
        .bind(id)
        .fetch_all(self.pool_manager.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, username)| UserRef::new(id, username))
            .collect())
    }

    async fn hydrate(&self, record: MessageRecord) -> Result<Message, StorageError> {
        let tags = self.tag_names(record.id).await?;
        let mentioned_users = self.mentioned_users(record.id).await?;
        record.into_message(tags, mentioned_users)
    }

    async fn hydrate_all(&self, records: Vec<MessageRecord>) -> Result<Vec<Message>, StorageError> {
        let mut messages = Vec::with_capacity(records.len());
        for record in records {
            messages.push(self.hydrate(record).await?);
        }
        Ok(messages)
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert(&self, message: &Message) -> social_core::Result<MessageId> {
        Ok(self.insert_message(message).await?)
    }

    async fn update(&self, message: &Message) -> social_core::Result<()> {
        Ok(self.update_message(message).await?)
    }

    async fn replace_tags(&self, id: MessageId, tags: &[Tag]) -> social_core::Result<()> {
        Ok(self.set_tags(id, tags).await?)
    }

    async fn replace_mentions(&self, id: MessageId, users: &[UserRef]) -> social_core::Result<()> {
        Ok(self.set_mentions(id, users).await?)
    }

    async fn get(&self, id: MessageId) -> social_core::Result<Option<Message>> {
        Ok(self.get_message_by_id(id).await?)
    }

    async fn delete(&self, id: MessageId) -> social_core::Result<bool> {
        Ok(self.delete_message(id).await?)
    }

    async fn messages_with_tag(&self, slug: &str) -> social_core::Result<Vec<Message>> {
        Ok(self.get_messages_with_tag(slug).await?)
    }

    async fn messages_mentioning(&self, user_id: i64) -> social_core::Result<Vec<Message>> {
        Ok(self.get_messages_mentioning(user_id).await?)
    }

    async fn messages_for_subject(&self, subject: Subject) -> social_core::Result<Vec<Message>> {
        Ok(self.get_messages_for_subject(subject).await?)
    }

    async fn messages_by_author(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> social_core::Result<Vec<Message>> {
        Ok(self.get_messages_by_author(user_id, limit).await?)
    }
}
