//! Table definitions. Text comparisons use SQLite's default BINARY collation, so
//! usernames and tag names match case-sensitively.

use sqlx::SqlitePool;
use tracing::info;

pub(crate) async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Creating database tables if not exist");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            author_id INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL,
            subject_type TEXT,
            subject_id INTEGER,
            rendered_html TEXT
        );

        CREATE TABLE IF NOT EXISTS message_tags (
            message_id INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (message_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS message_mentions (
            message_id INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (message_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            actor_id INTEGER NOT NULL REFERENCES users(id),
            verb TEXT NOT NULL,
            action_object_id INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_messages_author_id ON messages(author_id);
        CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);
        CREATE INDEX IF NOT EXISTS idx_messages_subject ON messages(subject_type, subject_id);
        CREATE INDEX IF NOT EXISTS idx_message_tags_tag_id ON message_tags(tag_id);
        CREATE INDEX IF NOT EXISTS idx_message_mentions_user_id ON message_mentions(user_id);
        CREATE INDEX IF NOT EXISTS idx_activities_actor_id ON activities(actor_id);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database tables created successfully");
    Ok(())
}
