//! # social
//!
//! User posts with `@mention` and `#hashtag` support.
//!
//! ## Modules
//!
//! - [`extract`] - Hashtag and mention extraction from raw text
//! - [`render`] - HTML rendering with profile and hashtag links
//! - [`service`] - [`MessageService`]: save lifecycle, lazy render cache, activity notification
//! - [`config`] - [`SocialConfig`] loaded from the environment
//! - [`inmemory`] - In-memory collaborators for tests and development
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use social::inmemory::{InMemoryActivityLog, InMemoryMessageStore, InMemoryTagRegistry, InMemoryUserDirectory};
//! use social::{LinkBuilder, MessageService};
//! use social_core::Message;
//!
//! # tokio_test_block(async {
//! let users = Arc::new(InMemoryUserDirectory::new());
//! let alice = users.register("alice").await;
//! let service = MessageService::new(
//!     Arc::new(InMemoryMessageStore::new()),
//!     users,
//!     Arc::new(InMemoryTagRegistry::new()),
//!     Arc::new(InMemoryActivityLog::new()),
//!     LinkBuilder::default(),
//! );
//!
//! let mut message = Message::new("hi @alice #rust", alice);
//! service.save(&mut message).await.unwrap();
//! assert_eq!(message.tags(), ["rust".to_string()]);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod extract;
pub mod inmemory;
pub mod render;
pub mod service;

pub use config::SocialConfig;
pub use extract::{extract_hashtags, extract_mention_candidates, extract_mentioned_users};
pub use render::{to_html, LinkBuilder};
pub use service::{MessageService, SaveOutcome};
