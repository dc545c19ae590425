//! Wires the SQLite repositories into a message service.

use std::sync::Arc;

use anyhow::{Context, Result};
use social::{MessageService, SocialConfig};
use storage::{ActivityRepository, MessageRepository, SqlitePoolManager, TagRepository, UserRepository};
use tracing::info;

#[derive(Clone)]
pub struct App {
    pub service: MessageService,
    pub users: UserRepository,
    pub messages: MessageRepository,
    pub activities: ActivityRepository,
}

impl App {
    pub async fn connect(config: &SocialConfig) -> Result<Self> {
        let pool = SqlitePoolManager::new(&config.database_url)
            .await
            .with_context(|| format!("Open database {}", config.database_url))?;

        let users = UserRepository::new(pool.clone());
        let tags = TagRepository::new(pool.clone());
        let messages = MessageRepository::new(pool.clone());
        let activities = ActivityRepository::new(pool);

        let service = MessageService::new(
            Arc::new(messages.clone()),
            Arc::new(users.clone()),
            Arc::new(tags),
            Arc::new(activities.clone()),
            config.links(),
        );

        info!(database_url = %config.database_url, "Social app ready");

        Ok(Self {
            service,
            users,
            messages,
            activities,
        })
    }
}
