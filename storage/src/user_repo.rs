//! User repository: registration and username lookup.

use async_trait::async_trait;
use chrono::Utc;
use social_core::{UserDirectory, UserRef};
use tracing::info;

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Registers `username`. Fails with `AlreadyExists` if the exact name is taken.
    pub async fn create(&self, username: &str) -> Result<UserRef, StorageError> {
        let pool = self.pool_manager.pool();

        if self.get_by_username(username).await?.is_some() {
            return Err(StorageError::AlreadyExists(format!("user '{}'", username)));
        }

        let result = sqlx::query("INSERT INTO users (username, created_at) VALUES (?, ?)")
            .bind(username)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        let user = UserRef::new(result.last_insert_rowid(), username);
        info!(user_id = user.id, username = %user.username, "Created user");
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRef>, StorageError> {
        let pool = self.pool_manager.pool();

        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, username FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|(id, username)| UserRef::new(id, username)))
    }

    /// All users whose username is in `usernames`, ordered by id.
    pub async fn get_by_usernames(&self, usernames: &[String]) -> Result<Vec<UserRef>, StorageError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.pool_manager.pool();
        let placeholders = vec!["?"; usernames.len()].join(", ");
        let sql = format!(
            "SELECT id, username FROM users WHERE username IN ({}) ORDER BY id",
            placeholders
        );

        let mut query_builder = sqlx::query_as::<_, (i64, String)>(&sql);
        for username in usernames {
            query_builder = query_builder.bind(username);
        }

        let rows = query_builder.fetch_all(pool).await?;
        Ok(rows
            .into_iter()
            .map(|(id, username)| UserRef::new(id, username))
            .collect())
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_username(&self, username: &str) -> social_core::Result<Option<UserRef>> {
        Ok(self.get_by_username(username).await?)
    }

    async fn find_by_usernames(&self, usernames: &[String]) -> social_core::Result<Vec<UserRef>> {
        Ok(self.get_by_usernames(usernames).await?)
    }
}
