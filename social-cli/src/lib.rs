//! # social-cli
//!
//! Command-line front end for social messages: argument parsing, config loading,
//! wiring the SQLite repositories into a [`social::MessageService`], and command handlers.

pub mod app;
pub mod cli;
pub mod commands;

pub use app::App;
pub use cli::{load_config, Cli, Commands, UserAction};
pub use commands::run;
pub use social::SocialConfig;
