use anyhow::{bail, Result};
use std::env;

use crate::render::LinkBuilder;

/// Social messaging configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    /// SQLite location: a file path, an `sqlite:` URL, or `sqlite::memory:`.
    pub database_url: String,
    pub log_file: String,
    /// Prefix of user profile URLs; the username and a trailing `/` are appended.
    pub profile_url_prefix: String,
    /// Prefix of hashtag-listing URLs; the tag slug and a trailing `/` are appended.
    pub hashtag_url_prefix: String,
}

impl SocialConfig {
    /// Loads configuration from the environment.
    ///
    /// `DATABASE_URL` may be overridden by `database_url` (e.g. a CLI flag).
    pub fn load(database_url: Option<String>) -> Result<Self> {
        let database_url = database_url
            .or_else(|| env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| "./social.db".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/social.log".to_string());
        let profile_url_prefix = url_prefix("PROFILE_URL_PREFIX", "/users/")?;
        let hashtag_url_prefix = url_prefix("HASHTAG_URL_PREFIX", "/social/hashtag/")?;

        Ok(Self {
            database_url,
            log_file,
            profile_url_prefix,
            hashtag_url_prefix,
        })
    }

    pub fn links(&self) -> LinkBuilder {
        LinkBuilder::new(&self.profile_url_prefix, &self.hashtag_url_prefix)
    }
}

/// Reads a URL prefix, appending a trailing `/` when missing.
fn url_prefix(var: &str, default: &str) -> Result<String> {
    let value = env::var(var).unwrap_or_else(|_| default.to_string());
    let value = value.trim();
    if value.is_empty() {
        bail!("{} must not be empty", var);
    }
    if value.ends_with('/') {
        Ok(value.to_string())
    } else {
        Ok(format!("{}/", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var("DATABASE_URL");
        env::remove_var("LOG_FILE");
        env::remove_var("PROFILE_URL_PREFIX");
        env::remove_var("HASHTAG_URL_PREFIX");
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        clear_env();

        let config = SocialConfig::load(None).unwrap();

        assert_eq!(config.database_url, "./social.db");
        assert_eq!(config.log_file, "logs/social.log");
        assert_eq!(config.profile_url_prefix, "/users/");
        assert_eq!(config.hashtag_url_prefix, "/social/hashtag/");
        assert_eq!(config.links(), LinkBuilder::default());
    }

    #[test]
    #[serial]
    fn test_load_config_with_custom_values() {
        clear_env();
        env::set_var("DATABASE_URL", "custom.db");
        env::set_var("LOG_FILE", "/tmp/social.log");
        env::set_var("PROFILE_URL_PREFIX", "https://example.org/people");
        env::set_var("HASHTAG_URL_PREFIX", "/tags/");

        let config = SocialConfig::load(None).unwrap();

        assert_eq!(config.database_url, "custom.db");
        assert_eq!(config.log_file, "/tmp/social.log");
        assert_eq!(config.profile_url_prefix, "https://example.org/people/");
        assert_eq!(config.hashtag_url_prefix, "/tags/");
        assert_eq!(
            config.links().profile_url("alice"),
            "https://example.org/people/alice/"
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_database_url_override_wins() {
        clear_env();
        env::set_var("DATABASE_URL", "from-env.db");

        let config = SocialConfig::load(Some("sqlite::memory:".to_string())).unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_prefix_is_rejected() {
        clear_env();
        env::set_var("HASHTAG_URL_PREFIX", "  ");

        assert!(SocialConfig::load(None).is_err());
        clear_env();
    }
}
