//! Storage crate: SQLite persistence for users, tags, messages and activities.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – MessageRecord, MessageStats
//! - [`schema`] – Table definitions
//! - [`sqlite_pool`] – SqlitePoolManager
//! - [`user_repo`] – UserRepository ([`social_core::UserDirectory`])
//! - [`tag_repo`] – TagRepository ([`social_core::TagRegistry`])
//! - [`message_repo`] – MessageRepository ([`social_core::MessageStore`])
//! - [`activity_repo`] – ActivityRepository ([`social_core::ActivitySink`], [`social_core::ActivityFeed`])

mod activity_repo;
mod error;
mod message_repo;
mod models;
mod schema;
mod sqlite_pool;
mod tag_repo;
mod user_repo;

#[cfg(test)]
mod message_repo_test;

pub use activity_repo::ActivityRepository;
pub use error::StorageError;
pub use message_repo::MessageRepository;
pub use models::{MessageRecord, MessageStats};
pub use sqlite_pool::SqlitePoolManager;
pub use tag_repo::TagRepository;
pub use user_repo::UserRepository;
