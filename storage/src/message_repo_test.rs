//! Unit tests for MessageRepository.
//!
//! Covers insert/get, update, link replacement and delete on an in-memory database.

use crate::message_repo::MessageRepository;
use crate::sqlite_pool::SqlitePoolManager;
use crate::tag_repo::TagRepository;
use crate::user_repo::UserRepository;
use crate::StorageError;
use social_core::{Message, Subject};

async fn setup() -> (MessageRepository, UserRepository, TagRepository) {
    let pool = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("Failed to create pool");
    (
        MessageRepository::new(pool.clone()),
        UserRepository::new(pool.clone()),
        TagRepository::new(pool),
    )
}

#[tokio::test]
async fn test_insert_and_get_message() {
    let (repo, users, _) = setup().await;
    let alice = users.create("alice").await.expect("Failed to create user");

    let message = Message::new("Hello World", alice.clone()).with_subject(Subject::Audio(4));
    let id = repo
        .insert_message(&message)
        .await
        .expect("Failed to save message");

    let retrieved = repo
        .get_message_by_id(id)
        .await
        .expect("Failed to get message")
        .expect("Message missing");

    assert_eq!(retrieved.id(), Some(id));
    assert_eq!(retrieved.text(), "Hello World");
    assert_eq!(retrieved.author(), &alice);
    assert_eq!(retrieved.subject(), Some(Subject::Audio(4)));
    assert!(retrieved.rendered_html().is_none());
}

#[tokio::test]
async fn test_get_message_by_id_not_found() {
    let (repo, _, _) = setup().await;

    let retrieved = repo.get_message_by_id(999).await.expect("Failed to query");

    assert!(retrieved.is_none());
}

#[tokio::test]
async fn test_update_message_writes_text_and_html() {
    let (repo, users, _) = setup().await;
    let alice = users.create("alice").await.unwrap();

    let mut message = Message::new("first", alice);
    let id = repo.insert_message(&message).await.unwrap();
    message.assign_id(id);
    message.set_text("second");
    message.set_rendered_html(Some("second".to_string()));

    repo.update_message(&message).await.expect("Failed to update");

    let retrieved = repo.get_message_by_id(id).await.unwrap().unwrap();
    assert_eq!(retrieved.text(), "second");
    assert_eq!(retrieved.rendered_html(), Some("second"));
}

#[tokio::test]
async fn test_update_missing_message_is_not_found() {
    let (repo, users, _) = setup().await;
    let alice = users.create("alice").await.unwrap();

    let mut message = Message::new("ghost", alice);
    message.assign_id(42);

    let result = repo.update_message(&message).await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_set_tags_replaces_previous_set() {
    let (repo, users, tags) = setup().await;
    let alice = users.create("alice").await.unwrap();
    let foo = tags.get_or_create_tag("foo").await.unwrap();
    let bar = tags.get_or_create_tag("bar").await.unwrap();

    let id = repo
        .insert_message(&Message::new("#foo #bar", alice))
        .await
        .unwrap();

    repo.set_tags(id, &[foo.clone(), bar.clone(), foo.clone()])
        .await
        .unwrap();
    let retrieved = repo.get_message_by_id(id).await.unwrap().unwrap();
    assert_eq!(retrieved.tags(), ["foo".to_string(), "bar".to_string()]);

    repo.set_tags(id, &[bar]).await.unwrap();
    let retrieved = repo.get_message_by_id(id).await.unwrap().unwrap();
    assert_eq!(retrieved.tags(), ["bar".to_string()]);
}

#[tokio::test]
async fn test_set_mentions_and_query_mentioning() {
    let (repo, users, _) = setup().await;
    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();

    let id = repo
        .insert_message(&Message::new("hi @bob", alice))
        .await
        .unwrap();
    repo.set_mentions(id, &[bob.clone()]).await.unwrap();

    let mentioning = repo.get_messages_mentioning(bob.id).await.unwrap();
    assert_eq!(mentioning.len(), 1);
    assert_eq!(mentioning[0].mentioned_users(), [bob]);
}

#[tokio::test]
async fn test_delete_message_removes_links() {
    let (repo, users, tags) = setup().await;
    let alice = users.create("alice").await.unwrap();
    let foo = tags.get_or_create_tag("foo").await.unwrap();

    let id = repo
        .insert_message(&Message::new("#foo", alice))
        .await
        .unwrap();
    repo.set_tags(id, &[foo]).await.unwrap();

    assert!(repo.delete_message(id).await.unwrap());
    assert!(repo.get_message_by_id(id).await.unwrap().is_none());
    assert!(repo.get_messages_with_tag("foo").await.unwrap().is_empty());
    assert!(!repo.delete_message(id).await.unwrap());
}
