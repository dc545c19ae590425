//! Integration tests for the `storage` repositories.
//!
//! Exercises users, tags, messages and activities through their public APIs on SQLite.

use social_core::{
    ActivityEvent, ActivityFeed, ActivitySink, Message, MessageStore, Subject, TagRegistry,
    UserDirectory, Verb,
};
use storage::{
    ActivityRepository, MessageRepository, SqlitePoolManager, StorageError, TagRepository,
    UserRepository,
};

async fn memory_pool() -> SqlitePoolManager {
    SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("Failed to create pool")
}

/// **Test: Usernames match exactly and duplicates are rejected.**
///
/// **Setup:** Register `alice`.
/// **Action:** Look up `alice` and `Alice`; register `alice` again.
/// **Expected:** Only the exact-case lookup succeeds; the duplicate fails with `AlreadyExists`.
#[tokio::test]
async fn test_user_lookup_is_case_sensitive() {
    let users = UserRepository::new(memory_pool().await);
    let alice = users.create("alice").await.expect("Failed to create user");

    assert_eq!(users.find_by_username("alice").await.unwrap(), Some(alice));
    assert_eq!(users.find_by_username("Alice").await.unwrap(), None);
    assert!(matches!(
        users.create("alice").await,
        Err(StorageError::AlreadyExists(_))
    ));
}

/// **Test: Batch username lookup skips unknown names.**
///
/// **Setup:** Register `alice` and `carol`.
/// **Action:** `find_by_usernames(["alice", "bob", "carol"])`.
/// **Expected:** Returns alice and carol only.
#[tokio::test]
async fn test_find_by_usernames_skips_unknown() {
    let users = UserRepository::new(memory_pool().await);
    let alice = users.create("alice").await.unwrap();
    let carol = users.create("carol").await.unwrap();

    let names = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
    let found = users.find_by_usernames(&names).await.unwrap();

    assert_eq!(found, vec![alice, carol]);
    assert!(users.find_by_usernames(&[]).await.unwrap().is_empty());
}

/// **Test: get_or_create is idempotent per name and assigns unique slugs.**
///
/// **Setup:** Empty database.
/// **Action:** Create `Rust`, `rust`, `Rust` again.
/// **Expected:** Same tag for repeated `Rust`; `rust` gets a suffixed slug.
#[tokio::test]
async fn test_tag_get_or_create_unique_slugs() {
    let tags = TagRepository::new(memory_pool().await);

    let upper = tags.get_or_create("Rust").await.unwrap();
    let lower = tags.get_or_create("rust").await.unwrap();
    let again = tags.get_or_create("Rust").await.unwrap();

    assert_eq!(upper, again);
    assert_ne!(upper.id, lower.id);
    assert_eq!(upper.slug, "rust");
    assert_eq!(lower.slug, "rust_1");
    assert_eq!(tags.find_by_name("RUST").await.unwrap(), None);
    assert_eq!(tags.list_all().await.unwrap().len(), 2);
}

/// **Test: Messages are listed by tag slug, subject and author, newest first.**
///
/// **Setup:** Three messages by alice, two tagged `foo`, one attached to a project.
/// **Action:** Query by tag, subject and author.
/// **Expected:** Each query returns the matching messages, most recent first.
#[tokio::test]
async fn test_message_queries() {
    let pool = memory_pool().await;
    let users = UserRepository::new(pool.clone());
    let tags = TagRepository::new(pool.clone());
    let messages = MessageRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let foo = tags.get_or_create("foo").await.unwrap();

    let first = messages
        .insert(&Message::new("one #foo", alice.clone()))
        .await
        .unwrap();
    messages.replace_tags(first, &[foo.clone()]).await.unwrap();

    let second = messages
        .insert(&Message::new("two", alice.clone()).with_subject(Subject::Project(8)))
        .await
        .unwrap();

    let third = messages
        .insert(&Message::new("three #foo", alice.clone()))
        .await
        .unwrap();
    messages.replace_tags(third, &[foo]).await.unwrap();

    let tagged = messages.messages_with_tag("foo").await.unwrap();
    let tagged_ids: Vec<_> = tagged.iter().filter_map(|m| m.id()).collect();
    assert_eq!(tagged_ids, vec![third, first]);

    let attached = messages
        .messages_for_subject(Subject::Project(8))
        .await
        .unwrap();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].id(), Some(second));
    assert!(messages
        .messages_for_subject(Subject::Audio(8))
        .await
        .unwrap()
        .is_empty());

    let recent = messages.messages_by_author(alice.id, Some(2)).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id(), Some(third));

    let stats = messages.get_stats().await.unwrap();
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.unique_authors, 1);
    assert_eq!(stats.total_tags, 1);
    assert!(stats.first_message.is_some());
}

/// **Test: Stats on an empty database.**
///
/// **Setup:** Empty database.
/// **Action:** `get_stats()`.
/// **Expected:** All counts zero, no first/last timestamps.
#[tokio::test]
async fn test_stats_empty() {
    let messages = MessageRepository::new(memory_pool().await);

    let stats = messages.get_stats().await.unwrap();

    assert_eq!(stats.total_messages, 0);
    assert_eq!(stats.total_mentions, 0);
    assert!(stats.first_message.is_none());
    assert!(stats.last_message.is_none());
}

/// **Test: Emitted activities are readable from the actor stream.**
///
/// **Setup:** Register alice and bob.
/// **Action:** Emit two events for alice, one for bob.
/// **Expected:** Alice's stream has two `commented` events, newest first.
#[tokio::test]
async fn test_activity_stream() {
    let pool = memory_pool().await;
    let users = UserRepository::new(pool.clone());
    let activities = ActivityRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();

    activities
        .emit(&ActivityEvent::new(alice.clone(), Verb::Commented, 1))
        .await
        .unwrap();
    activities
        .emit(&ActivityEvent::new(alice.clone(), Verb::Commented, 2))
        .await
        .unwrap();
    activities
        .emit(&ActivityEvent::new(bob, Verb::Commented, 3))
        .await
        .unwrap();

    let stream = activities.actor_stream(alice.id, None).await.unwrap();
    assert_eq!(stream.len(), 2);
    assert_eq!(stream[0].action_object, 2);
    assert!(stream.iter().all(|e| e.actor == alice && e.verb == Verb::Commented));
    assert_eq!(activities.count().await.unwrap(), 3);
}

/// **Test: A file-backed database keeps data across pool instances.**
///
/// **Setup:** Temp directory with a fresh database file.
/// **Action:** Create a user, drop the pool, reopen the same file.
/// **Expected:** The user is still there.
#[tokio::test]
async fn test_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("social.db");
    let path = path.to_str().unwrap();

    {
        let users = UserRepository::new(SqlitePoolManager::new(path).await.unwrap());
        users.create("alice").await.unwrap();
    }

    let users = UserRepository::new(SqlitePoolManager::new(path).await.unwrap());
    assert!(users.find_by_username("alice").await.unwrap().is_some());
}
