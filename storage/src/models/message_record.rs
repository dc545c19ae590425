//! Message row model for persistence.
//!
//! Maps to the `messages` table joined with the author's username; used by MessageRepository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use social_core::{Message, Subject, UserRef};

use crate::error::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub subject_type: Option<String>,
    pub subject_id: Option<i64>,
    pub rendered_html: Option<String>,
}

impl MessageRecord {
    /// Decodes the `(subject_type, subject_id)` pair. Both columns must be set or both null.
    pub fn subject(&self) -> Result<Option<Subject>, StorageError> {
        match (&self.subject_type, self.subject_id) {
            (Some(kind), Some(id)) => Subject::from_parts(kind, id)
                .map(Some)
                .map_err(|e| StorageError::InvalidData(e.to_string())),
            (None, None) => Ok(None),
            _ => Err(StorageError::InvalidData(format!(
                "message {} has a partial subject reference",
                self.id
            ))),
        }
    }

    /// Builds the domain message from this row and its loaded tag names and mentions.
    pub fn into_message(
        self,
        tags: Vec<String>,
        mentioned_users: Vec<UserRef>,
    ) -> Result<Message, StorageError> {
        let subject = self.subject()?;
        Ok(Message::hydrate(
            self.id,
            self.text,
            UserRef::new(self.author_id, self.author_username),
            self.created_at,
            tags,
            mentioned_users,
            subject,
            self.rendered_html,
        ))
    }
}
