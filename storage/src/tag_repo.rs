//! Tag repository: hashtag lookup by exact name and get-or-create with unique slugs.

use async_trait::async_trait;
use social_core::{slug_candidate, slugify, Tag, TagRegistry};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct TagRepository {
    pool_manager: SqlitePoolManager,
}

impl TagRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Tag>, StorageError> {
        let pool = self.pool_manager.pool();

        let row: Option<(i64, String, String)> =
            sqlx::query_as("SELECT id, name, slug FROM tags WHERE name = ?")
                .bind(name)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|(id, name, slug)| Tag::new(id, name, slug)))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>, StorageError> {
        let pool = self.pool_manager.pool();

        let row: Option<(i64, String, String)> =
            sqlx::query_as("SELECT id, name, slug FROM tags WHERE slug = ?")
                .bind(slug)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|(id, name, slug)| Tag::new(id, name, slug)))
    }

    pub async fn get_by_names(&self, names: &[String]) -> Result<Vec<Tag>, StorageError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.pool_manager.pool();
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT id, name, slug FROM tags WHERE name IN ({}) ORDER BY id",
            placeholders
        );

        let mut query_builder = sqlx::query_as::<_, (i64, String, String)>(&sql);
        for name in names {
            query_builder = query_builder.bind(name);
        }

        let rows = query_builder.fetch_all(pool).await?;
        Ok(rows
            .into_iter()
            .map(|(id, name, slug)| Tag::new(id, name, slug))
            .collect())
    }

    /// Returns the tag named `name`, inserting it with the first free slug candidate if missing.
    pub async fn get_or_create_tag(&self, name: &str) -> Result<Tag, StorageError> {
        if let Some(tag) = self.get_by_name(name).await? {
            return Ok(tag);
        }

        let pool = self.pool_manager.pool();
        let base = slugify(name);
        let mut attempt = 0;
        let slug = loop {
            let candidate = slug_candidate(&base, attempt);
            if self.get_by_slug(&candidate).await?.is_none() {
                break candidate;
            }
            debug!(slug = %candidate, "Slug taken, trying next suffix");
            attempt += 1;
        };

        let result = sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?)")
            .bind(name)
            .bind(&slug)
            .execute(pool)
            .await?;

        let tag = Tag::new(result.last_insert_rowid(), name, slug);
        info!(tag_id = tag.id, name = %tag.name, slug = %tag.slug, "Created tag");
        Ok(tag)
    }

    pub async fn list_all(&self) -> Result<Vec<Tag>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows: Vec<(i64, String, String)> =
            sqlx::query_as("SELECT id, name, slug FROM tags ORDER BY name")
                .fetch_all(pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, slug)| Tag::new(id, name, slug))
            .collect())
    }
}

#[async_trait]
impl TagRegistry for TagRepository {
    async fn find_by_name(&self, name: &str) -> social_core::Result<Option<Tag>> {
        Ok(self.get_by_name(name).await?)
    }

    async fn find_by_names(&self, names: &[String]) -> social_core::Result<Vec<Tag>> {
        Ok(self.get_by_names(names).await?)
    }

    async fn get_or_create(&self, name: &str) -> social_core::Result<Tag> {
        Ok(self.get_or_create_tag(name).await?)
    }
}
