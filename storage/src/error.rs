//! Storage error types.
//!
//! Used by repository implementations; converted into [`SocialError`] at the trait boundary.

use social_core::SocialError;
use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<StorageError> for SocialError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(what) => SocialError::NotFound(what),
            other => SocialError::Storage(other.to_string()),
        }
    }
}
