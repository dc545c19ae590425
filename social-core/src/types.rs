//! Core types: user reference, subject, message, and activity event.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SocialError;

pub type MessageId = i64;

/// A registered user as seen by messages (id and exact-case username).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

impl UserRef {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// The entity a message is attached to, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    Audio(i64),
    Project(i64),
    User(i64),
}

impl Subject {
    /// Discriminator stored in the `subject_type` column.
    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Audio(_) => "audio",
            Subject::Project(_) => "project",
            Subject::User(_) => "user",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            Subject::Audio(id) | Subject::Project(id) | Subject::User(id) => id,
        }
    }

    /// Rebuilds a subject from its stored `(kind, id)` pair.
    pub fn from_parts(kind: &str, id: i64) -> Result<Self, SocialError> {
        match kind {
            "audio" => Ok(Subject::Audio(id)),
            "project" => Ok(Subject::Project(id)),
            "user" => Ok(Subject::User(id)),
            other => Err(SocialError::InvalidSubject(format!(
                "unknown subject kind '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Parses `kind:id`, e.g. `audio:12`.
impl FromStr for Subject {
    type Err = SocialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| SocialError::InvalidSubject(format!("expected kind:id, got '{}'", s)))?;
        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| SocialError::InvalidSubject(format!("invalid subject id in '{}'", s)))?;
        Subject::from_parts(kind.trim(), id)
    }
}

/// A user post.
///
/// `tags` and `mentioned_users` are derived from `text` on every save; `rendered_html`
/// is filled lazily on first render and kept until the text is edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: Option<MessageId>,
    text: String,
    author: UserRef,
    created_at: DateTime<Utc>,
    tags: Vec<String>,
    mentioned_users: Vec<UserRef>,
    subject: Option<Subject>,
    rendered_html: Option<String>,
}

impl Message {
    /// Creates an unsaved message with the current timestamp.
    pub fn new(text: impl Into<String>, author: UserRef) -> Self {
        Self {
            id: None,
            text: text.into(),
            author,
            created_at: Utc::now(),
            tags: Vec::new(),
            mentioned_users: Vec::new(),
            subject: None,
            rendered_html: None,
        }
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Rebuilds a message loaded from a store.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: MessageId,
        text: String,
        author: UserRef,
        created_at: DateTime<Utc>,
        tags: Vec<String>,
        mentioned_users: Vec<UserRef>,
        subject: Option<Subject>,
        rendered_html: Option<String>,
    ) -> Self {
        Self {
            id: Some(id),
            text,
            author,
            created_at,
            tags,
            mentioned_users,
            subject,
            rendered_html,
        }
    }

    pub fn id(&self) -> Option<MessageId> {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn author(&self) -> &UserRef {
        &self.author
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn mentioned_users(&self) -> &[UserRef] {
        &self.mentioned_users
    }

    pub fn subject(&self) -> Option<Subject> {
        self.subject
    }

    /// Cached HTML; `None` until rendered. An empty string counts as not rendered.
    pub fn rendered_html(&self) -> Option<&str> {
        self.rendered_html.as_deref().filter(|html| !html.is_empty())
    }

    /// Replaces the text and drops the cached HTML. Tags and mentions follow on the next save.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.rendered_html = None;
    }

    pub fn set_subject(&mut self, subject: Option<Subject>) {
        self.subject = subject;
    }

    /// Records the id assigned by the store on first insert.
    pub fn assign_id(&mut self, id: MessageId) {
        self.id = Some(id);
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    pub fn set_mentioned_users(&mut self, users: Vec<UserRef>) {
        self.mentioned_users = users;
    }

    pub fn set_rendered_html(&mut self, html: Option<String>) {
        self.rendered_html = html;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Commented,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Commented => "commented",
        }
    }
}

impl FromStr for Verb {
    type Err = SocialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commented" => Ok(Verb::Commented),
            other => Err(SocialError::Storage(format!("unknown verb '{}'", other))),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "`actor` `verb` `action_object`", consumed by the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub actor: UserRef,
    pub verb: Verb,
    pub action_object: MessageId,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(actor: UserRef, verb: Verb, action_object: MessageId) -> Self {
        Self {
            actor,
            verb,
            action_object,
            timestamp: Utc::now(),
        }
    }
}
