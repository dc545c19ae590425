//! CLI parser and config loading.

use anyhow::Result;
use clap::{Parser, Subcommand};
use social::SocialConfig;
use social_core::Subject;

#[derive(Parser, Debug)]
#[command(name = "social")]
#[command(about = "Social messages CLI: users, posts, rendering, hashtags, activity feed", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Overrides DATABASE_URL.
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users.
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Post a message as AUTHOR. Hashtags and mentions are extracted on save.
    Post {
        #[arg(short, long)]
        author: String,
        #[arg(short, long)]
        text: String,
        /// Attach the message to another entity, as kind:id (audio, project, user).
        #[arg(short, long)]
        subject: Option<Subject>,
    },
    /// Replace the text of a message and save it again.
    Edit {
        id: i64,
        #[arg(short, long)]
        text: String,
    },
    /// Print the HTML of a message (rendered and cached on first use).
    Render {
        id: i64,
        /// Re-render even if cached.
        #[arg(long)]
        refresh: bool,
    },
    /// Print a message as JSON.
    Show { id: i64 },
    /// Delete a message.
    Delete { id: i64 },
    /// List messages tagged with the hashtag whose slug is SLUG.
    Hashtag { slug: String },
    /// List messages mentioning USERNAME.
    Mentions { username: String },
    /// Show the activity stream of USERNAME.
    Feed {
        username: String,
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
    /// Print message statistics.
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Register a new user.
    Add { username: String },
}

/// Load SocialConfig from environment. If `database_url` is provided it overrides DATABASE_URL.
pub fn load_config(database_url: Option<String>) -> Result<SocialConfig> {
    SocialConfig::load(database_url)
}
