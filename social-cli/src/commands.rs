//! Command handlers. Each returns the text to print.

use std::fmt::Write as _;

use anyhow::{anyhow, Context, Result};
use social_core::{ActivityFeed, Message, Subject, UserRef};

use crate::app::App;
use crate::cli::{Commands, UserAction};

const TEXT_PREVIEW_LEN: usize = 60;

pub async fn run(app: &App, command: Commands) -> Result<String> {
    match command {
        Commands::User {
            action: UserAction::Add { username },
        } => add_user(app, &username).await,
        Commands::Post {
            author,
            text,
            subject,
        } => post(app, &author, text, subject).await,
        Commands::Edit { id, text } => edit(app, id, text).await,
        Commands::Render { id, refresh } => render(app, id, refresh).await,
        Commands::Show { id } => show(app, id).await,
        Commands::Delete { id } => delete(app, id).await,
        Commands::Hashtag { slug } => {
            let messages = app.service.hashtag_listing(&slug).await?;
            message_table(&messages, &format!("No messages tagged '{}'.", slug))
        }
        Commands::Mentions { username } => {
            let user = find_user(app, &username).await?;
            let messages = app.service.mentions_of(&user).await?;
            message_table(&messages, &format!("No messages mention @{}.", username))
        }
        Commands::Feed { username, limit } => feed(app, &username, limit).await,
        Commands::Stats => stats(app).await,
    }
}

async fn add_user(app: &App, username: &str) -> Result<String> {
    let user = app.users.create(username).await?;
    Ok(format!("Created user {} (id {})", user.username, user.id))
}

async fn post(app: &App, author: &str, text: String, subject: Option<Subject>) -> Result<String> {
    let author = find_user(app, author).await?;
    let mut message = Message::new(text, author);
    if let Some(subject) = subject {
        message = message.with_subject(subject);
    }

    app.service.save(&mut message).await?;
    let id = message
        .id()
        .ok_or_else(|| anyhow!("message has no id after save"))?;
    Ok(format!("Posted message {}\n{}", id, describe_links(&message)))
}

async fn edit(app: &App, id: i64, text: String) -> Result<String> {
    let mut message = load_message(app, id).await?;
    message.set_text(text);
    app.service.save(&mut message).await?;
    Ok(format!("Updated message {}\n{}", id, describe_links(&message)))
}

async fn render(app: &App, id: i64, refresh: bool) -> Result<String> {
    let mut message = load_message(app, id).await?;
    let html = if refresh {
        app.service.refresh_html(&mut message).await?
    } else {
        app.service.as_html(&mut message).await?
    };
    Ok(html)
}

async fn show(app: &App, id: i64) -> Result<String> {
    let message = load_message(app, id).await?;
    serde_json::to_string_pretty(&message).context("Serialize message")
}

async fn delete(app: &App, id: i64) -> Result<String> {
    if app.service.delete(id).await? {
        Ok(format!("Deleted message {}", id))
    } else {
        Err(anyhow!("message {} not found", id))
    }
}

async fn feed(app: &App, username: &str, limit: i64) -> Result<String> {
    let user = find_user(app, username).await?;
    let events = app.activities.actor_stream(user.id, Some(limit)).await?;
    if events.is_empty() {
        return Ok(format!("No activity for {}.", username));
    }

    let mut out = String::new();
    for event in &events {
        writeln!(
            out,
            "{}  {} {} message {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.actor.username,
            event.verb,
            event.action_object
        )?;
    }
    Ok(out.trim_end().to_string())
}

async fn stats(app: &App) -> Result<String> {
    let stats = app.messages.get_stats().await?;
    let mut out = String::new();
    writeln!(out, "Messages: {}", stats.total_messages)?;
    writeln!(out, "Authors:  {}", stats.unique_authors)?;
    writeln!(out, "Tags:     {}", stats.total_tags)?;
    writeln!(out, "Mentions: {}", stats.total_mentions)?;
    if let (Some(first), Some(last)) = (stats.first_message, stats.last_message) {
        writeln!(
            out,
            "Range:    {} .. {}",
            first.format("%Y-%m-%d %H:%M:%S"),
            last.format("%Y-%m-%d %H:%M:%S")
        )?;
    }
    Ok(out.trim_end().to_string())
}

async fn find_user(app: &App, username: &str) -> Result<UserRef> {
    app.users
        .get_by_username(username)
        .await?
        .ok_or_else(|| anyhow!("user '{}' not found", username))
}

async fn load_message(app: &App, id: i64) -> Result<Message> {
    app.service
        .get(id)
        .await?
        .ok_or_else(|| anyhow!("message {} not found", id))
}

fn describe_links(message: &Message) -> String {
    let mentions: Vec<&str> = message
        .mentioned_users()
        .iter()
        .map(|u| u.username.as_str())
        .collect();
    format!(
        "tags: [{}]\nmentions: [{}]",
        message.tags().join(", "),
        mentions.join(", ")
    )
}

fn message_table(messages: &[Message], empty: &str) -> Result<String> {
    if messages.is_empty() {
        return Ok(empty.to_string());
    }

    let mut out = String::new();
    writeln!(out, "{:<6} {:<20} {:<16} {}", "id", "created_at", "author", "text")?;
    writeln!(out, "{}", "-".repeat(80))?;
    for message in messages {
        let preview: String = message
            .text()
            .chars()
            .take(TEXT_PREVIEW_LEN)
            .collect::<String>()
            .replace('\n', " ");
        writeln!(
            out,
            "{:<6} {:<20} {:<16} {}",
            message.id().unwrap_or_default(),
            message.created_at().format("%Y-%m-%d %H:%M:%S").to_string(),
            message.author().username,
            preview
        )?;
    }
    Ok(out.trim_end().to_string())
}
