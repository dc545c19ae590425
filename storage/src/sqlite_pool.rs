//! SQLite connection pool wrapper for the storage crate.

use std::str::FromStr;

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::schema;

/// Manages a single SQLite pool shared by all repositories; creates the DB file and tables if missing.
///
/// Accepts a plain file path (`./social.db`), an `sqlite:` URL, or `sqlite::memory:`.
/// In-memory databases are held by a single long-lived connection so the data outlives queries.
#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

impl SqlitePoolManager {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        info!("Initializing SQLite pool: {}", database_url);

        let in_memory = database_url == ":memory:" || database_url.starts_with("sqlite::memory:");

        let pool = if in_memory {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            let options = if database_url.starts_with("sqlite:") {
                SqliteConnectOptions::from_str(database_url)?
            } else {
                SqliteConnectOptions::new().filename(database_url)
            };
            let options = options.create_if_missing(true).foreign_keys(true);
            SqlitePool::connect_with(options).await?
        };

        schema::create_tables(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
