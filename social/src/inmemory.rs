//! # In-memory collaborators
//!
//! Implementations of the `social-core` traits backed by process memory, for tests and local
//! development. Data is lost when the value is dropped.
//!
//! - [`InMemoryUserDirectory`] - [`UserDirectory`]
//! - [`InMemoryTagRegistry`] - [`TagRegistry`]
//! - [`InMemoryActivityLog`] - [`ActivitySink`] and [`ActivityFeed`]
//! - [`InMemoryMessageStore`] - [`MessageStore`]
//!
//! ## Thread Safety
//!
//! Every store is `Clone` and shares its state through `Arc<RwLock<..>>`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use social_core::{
    slug_candidate, slugify, ActivityEvent, ActivityFeed, ActivitySink, Message, MessageId,
    MessageStore, Result, SocialError, Subject, Tag, TagRegistry, UserDirectory, UserRef,
};
use tokio::sync::RwLock;

/// Registered users, matched by exact username.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<Vec<UserRef>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `username`, or returns the existing user with that exact name.
    pub async fn register(&self, username: &str) -> UserRef {
        let mut users = self.users.write().await;
        if let Some(existing) = users.iter().find(|u| u.username == username) {
            return existing.clone();
        }
        let user = UserRef::new(users.len() as i64 + 1, username);
        users.push(user.clone());
        user
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRef>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<UserRef>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| usernames.contains(&u.username))
            .cloned()
            .collect())
    }
}

/// Hashtags keyed by exact name, with unique slugs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTagRegistry {
    tags: Arc<RwLock<Vec<Tag>>>,
}

impl InMemoryTagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create_tag(&self, name: &str) -> Tag {
        let mut tags = self.tags.write().await;
        if let Some(existing) = tags.iter().find(|t| t.name == name) {
            return existing.clone();
        }

        let base = slugify(name);
        let mut attempt = 0;
        let slug = loop {
            let candidate = slug_candidate(&base, attempt);
            if !tags.iter().any(|t| t.slug == candidate) {
                break candidate;
            }
            attempt += 1;
        };

        let tag = Tag::new(tags.len() as i64 + 1, name, slug);
        tags.push(tag.clone());
        tag
    }

    pub async fn all(&self) -> Vec<Tag> {
        self.tags.read().await.clone()
    }
}

#[async_trait]
impl TagRegistry for InMemoryTagRegistry {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tags = self.tags.read().await;
        Ok(tags.iter().find(|t| t.name == name).cloned())
    }

    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Tag>> {
        let tags = self.tags.read().await;
        Ok(tags
            .iter()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect())
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag> {
        Ok(self.get_or_create_tag(name).await)
    }
}

/// Activity events in emission order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    events: Arc<RwLock<Vec<ActivityEvent>>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<ActivityEvent> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ActivitySink for InMemoryActivityLog {
    async fn emit(&self, event: &ActivityEvent) -> Result<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl ActivityFeed for InMemoryActivityLog {
    async fn actor_stream(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<ActivityEvent>> {
        let events = self.events.read().await;
        let stream = events
            .iter()
            .rev()
            .filter(|e| e.actor.id == user_id)
            .cloned();
        Ok(match limit {
            Some(limit) => stream.take(limit.max(0) as usize).collect(),
            None => stream.collect(),
        })
    }
}

#[derive(Debug, Clone)]
struct StoredMessage {
    message: Message,
    tags: Vec<Tag>,
    mentions: Vec<UserRef>,
}

impl StoredMessage {
    fn to_message(&self) -> Message {
        let mut message = self.message.clone();
        message.set_tags(self.tags.iter().map(|t| t.name.clone()).collect());
        message.set_mentioned_users(self.mentions.clone());
        message
    }
}

#[derive(Debug, Default)]
struct MessageTable {
    next_id: MessageId,
    rows: BTreeMap<MessageId, StoredMessage>,
}

impl MessageTable {
    fn row_mut(&mut self, id: MessageId) -> Result<&mut StoredMessage> {
        self.rows
            .get_mut(&id)
            .ok_or_else(|| SocialError::NotFound(format!("message {}", id)))
    }

    /// Rows matching `filter`, newest first.
    fn newest_first(&self, filter: impl Fn(&StoredMessage) -> bool) -> Vec<Message> {
        let mut matches: Vec<&StoredMessage> = self.rows.values().filter(|r| filter(*r)).collect();
        matches.sort_by(|a, b| {
            (b.message.created_at(), b.message.id()).cmp(&(a.message.created_at(), a.message.id()))
        });
        matches.into_iter().map(StoredMessage::to_message).collect()
    }
}

/// Messages with their tag and mention links.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    table: Arc<RwLock<MessageTable>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert(&self, message: &Message) -> Result<MessageId> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let id = table.next_id;

        let mut stored = message.clone();
        stored.assign_id(id);
        table.rows.insert(
            id,
            StoredMessage {
                message: stored,
                tags: Vec::new(),
                mentions: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn update(&self, message: &Message) -> Result<()> {
        let id = message
            .id()
            .ok_or_else(|| SocialError::Storage("cannot update an unsaved message".to_string()))?;
        let mut table = self.table.write().await;
        let row = table.row_mut(id)?;
        row.message.set_text(message.text());
        row.message.set_subject(message.subject());
        row.message
            .set_rendered_html(message.rendered_html().map(str::to_string));
        Ok(())
    }

    async fn replace_tags(&self, id: MessageId, tags: &[Tag]) -> Result<()> {
        let mut table = self.table.write().await;
        let row = table.row_mut(id)?;
        row.tags.clear();
        for tag in tags {
            if !row.tags.iter().any(|t| t.id == tag.id) {
                row.tags.push(tag.clone());
            }
        }
        Ok(())
    }

    async fn replace_mentions(&self, id: MessageId, users: &[UserRef]) -> Result<()> {
        let mut table = self.table.write().await;
        let row = table.row_mut(id)?;
        row.mentions.clear();
        for user in users {
            if !row.mentions.iter().any(|u| u.id == user.id) {
                row.mentions.push(user.clone());
            }
        }
        Ok(())
    }

    async fn get(&self, id: MessageId) -> Result<Option<Message>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).map(StoredMessage::to_message))
    }

    async fn delete(&self, id: MessageId) -> Result<bool> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn messages_with_tag(&self, slug: &str) -> Result<Vec<Message>> {
        let table = self.table.read().await;
        Ok(table.newest_first(|row| row.tags.iter().any(|t| t.slug == slug)))
    }

    async fn messages_mentioning(&self, user_id: i64) -> Result<Vec<Message>> {
        let table = self.table.read().await;
        Ok(table.newest_first(|row| row.mentions.iter().any(|u| u.id == user_id)))
    }

    async fn messages_for_subject(&self, subject: Subject) -> Result<Vec<Message>> {
        let table = self.table.read().await;
        Ok(table.newest_first(|row| row.message.subject() == Some(subject)))
    }

    async fn messages_by_author(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<Message>> {
        let table = self.table.read().await;
        let mut messages = table.newest_first(|row| row.message.author().id == user_id);
        if let Some(limit) = limit {
            messages.truncate(limit.max(0) as usize);
        }
        Ok(messages)
    }
}
