//! Collaborator traits the message service depends on.
//!
//! Implemented by the SQLite repositories in `storage` and by the in-memory stores in `social`.

use async_trait::async_trait;

use crate::error::Result;
use crate::tag::Tag;
use crate::types::{ActivityEvent, Message, MessageId, Subject, UserRef};

/// Lookup of registered users by exact username.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRef>>;

    /// Returns the users whose username is in `usernames`; unknown names are skipped.
    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<UserRef>> {
        let mut found = Vec::new();
        for username in usernames {
            if let Some(user) = self.find_by_username(username).await? {
                if !found.contains(&user) {
                    found.push(user);
                }
            }
        }
        Ok(found)
    }
}

/// Hashtag store keyed by exact name.
#[async_trait]
pub trait TagRegistry: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Returns the existing tags among `names`; names with no tag are skipped.
    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Tag>> {
        let mut found = Vec::new();
        for name in names {
            if let Some(tag) = self.find_by_name(name).await? {
                found.push(tag);
            }
        }
        Ok(found)
    }

    /// Returns the tag named `name`, creating it with a unique slug if missing.
    async fn get_or_create(&self, name: &str) -> Result<Tag>;
}

/// Receiver of activity events. Emission is fire-and-forget for callers.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn emit(&self, event: &ActivityEvent) -> Result<()>;
}

/// Read side of a persisted activity stream.
#[async_trait]
pub trait ActivityFeed: Send + Sync {
    /// Events performed by `user_id`, newest first.
    async fn actor_stream(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<ActivityEvent>>;
}

/// Persistence of messages and their tag/mention links.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Inserts an unsaved message and returns the assigned id.
    async fn insert(&self, message: &Message) -> Result<MessageId>;

    /// Writes `text`, `subject` and `rendered_html` of a saved message.
    /// Fails with `NotFound` if the row no longer exists.
    async fn update(&self, message: &Message) -> Result<()>;

    /// Clears the message's tag links and links it to `tags`.
    async fn replace_tags(&self, id: MessageId, tags: &[Tag]) -> Result<()>;

    /// Clears the message's mention links and links it to `users`.
    async fn replace_mentions(&self, id: MessageId, users: &[UserRef]) -> Result<()>;

    async fn get(&self, id: MessageId) -> Result<Option<Message>>;

    /// Deletes the message with its links; returns false if it did not exist.
    async fn delete(&self, id: MessageId) -> Result<bool>;

    /// Messages tagged with the tag whose slug is `slug`, newest first.
    async fn messages_with_tag(&self, slug: &str) -> Result<Vec<Message>>;

    /// Messages mentioning `user_id`, newest first.
    async fn messages_mentioning(&self, user_id: i64) -> Result<Vec<Message>>;

    /// Messages attached to `subject`, newest first.
    async fn messages_for_subject(&self, subject: Subject) -> Result<Vec<Message>>;

    /// Messages written by `user_id`, newest first.
    async fn messages_by_author(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<Message>>;
}
