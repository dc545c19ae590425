//! Message service: the save lifecycle, the lazy HTML cache and the creation notification.
//!
//! Collaborators are injected as trait objects so the same service runs on SQLite (`storage`)
//! or on the in-memory stores.

use std::sync::Arc;

use social_core::{
    ActivityEvent, ActivitySink, Message, MessageId, MessageStore, Result, Subject, Tag,
    TagRegistry, UserDirectory, UserRef, Verb,
};
use tracing::{debug, info, instrument, warn};

use crate::extract::{extract_hashtags, extract_mentioned_users};
use crate::render::{to_html, LinkBuilder};

/// Result of [`MessageService::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// True when this save inserted the message.
    pub created: bool,
}

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
    tags: Arc<dyn TagRegistry>,
    activity: Arc<dyn ActivitySink>,
    links: LinkBuilder,
}

impl MessageService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
        tags: Arc<dyn TagRegistry>,
        activity: Arc<dyn ActivitySink>,
        links: LinkBuilder,
    ) -> Self {
        Self {
            store,
            users,
            tags,
            activity,
            links,
        }
    }

    /// Persists `message`, then rebuilds its tag and mention sets from the current text.
    ///
    /// An unsaved message is inserted and gets its id; a saved one is updated in place.
    /// Only an insert emits a `commented` activity event, sent as soon as the row exists and
    /// before tags and mentions are written. Storage errors propagate; activity sink errors are
    /// logged and dropped.
    #[instrument(skip(self, message), fields(author = %message.author().username))]
    pub async fn save(&self, message: &mut Message) -> Result<SaveOutcome> {
        let (id, created) = match message.id() {
            Some(id) => {
                self.store.update(message).await?;
                (id, false)
            }
            None => {
                let id = self.store.insert(message).await?;
                message.assign_id(id);
                self.notify_created(message.author().clone(), id).await;
                (id, true)
            }
        };

        let tags = self.resolve_tags(message.text()).await?;
        self.store.replace_tags(id, &tags).await?;
        message.set_tags(tags.into_iter().map(|t| t.name).collect());

        let mentioned = extract_mentioned_users(message.text(), self.users.as_ref()).await?;
        self.store.replace_mentions(id, &mentioned).await?;
        message.set_mentioned_users(mentioned);

        info!(
            message_id = id,
            created,
            tags = message.tags().len(),
            mentions = message.mentioned_users().len(),
            "Saved message"
        );

        Ok(SaveOutcome { created })
    }

    /// Returns the cached HTML, rendering and saving the message on first use.
    ///
    /// Once cached, the HTML is returned as is even if users or tags are created later;
    /// use [`MessageService::refresh_html`] to re-render.
    #[instrument(skip(self, message), fields(message_id = ?message.id()))]
    pub async fn as_html(&self, message: &mut Message) -> Result<String> {
        if let Some(html) = message.rendered_html() {
            debug!("Rendered HTML cache hit");
            return Ok(html.to_string());
        }
        self.refresh_html(message).await
    }

    /// Renders the current text, stores it as the cached HTML and saves the message.
    pub async fn refresh_html(&self, message: &mut Message) -> Result<String> {
        let html = to_html(
            message.text(),
            self.users.as_ref(),
            self.tags.as_ref(),
            &self.links,
        )
        .await?;
        message.set_rendered_html(Some(html.clone()));
        self.save(message).await?;
        Ok(html)
    }

    pub async fn get(&self, id: MessageId) -> Result<Option<Message>> {
        self.store.get(id).await
    }

    pub async fn delete(&self, id: MessageId) -> Result<bool> {
        let deleted = self.store.delete(id).await?;
        info!(message_id = id, deleted, "Deleted message");
        Ok(deleted)
    }

    /// Messages listed under the hashtag page for `slug`, newest first.
    pub async fn hashtag_listing(&self, slug: &str) -> Result<Vec<Message>> {
        self.store.messages_with_tag(slug).await
    }

    pub async fn mentions_of(&self, user: &UserRef) -> Result<Vec<Message>> {
        self.store.messages_mentioning(user.id).await
    }

    pub async fn for_subject(&self, subject: Subject) -> Result<Vec<Message>> {
        self.store.messages_for_subject(subject).await
    }

    pub async fn by_author(&self, user: &UserRef, limit: Option<i64>) -> Result<Vec<Message>> {
        self.store.messages_by_author(user.id, limit).await
    }

    async fn resolve_tags(&self, text: &str) -> Result<Vec<Tag>> {
        let names = extract_hashtags(text);
        let mut tags = Vec::with_capacity(names.len());
        for name in &names {
            tags.push(self.tags.get_or_create(name).await?);
        }
        Ok(tags)
    }

    async fn notify_created(&self, author: UserRef, id: MessageId) {
        let event = ActivityEvent::new(author, Verb::Commented, id);
        if let Err(e) = self.activity.emit(&event).await {
            warn!(error = %e, message_id = id, "Failed to emit activity event");
        }
    }
}
