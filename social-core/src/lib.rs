//! # social-core
//!
//! Core types and traits for social messages: [`Message`], [`UserRef`], [`Tag`], [`Subject`],
//! [`ActivityEvent`], the collaborator traits the message service is wired with
//! ([`UserDirectory`], [`TagRegistry`], [`ActivitySink`], [`ActivityFeed`], [`MessageStore`]),
//! and tracing initialization. Storage-agnostic; implemented by `storage` (SQLite) and the
//! in-memory stores in `social`.

pub mod error;
pub mod logger;
pub mod tag;
pub mod traits;
pub mod types;

pub use error::{Result, SocialError};
pub use logger::init_tracing;
pub use tag::{slug_candidate, slugify, Tag};
pub use traits::{ActivityFeed, ActivitySink, MessageStore, TagRegistry, UserDirectory};
pub use types::{ActivityEvent, Message, MessageId, Subject, UserRef, Verb};
