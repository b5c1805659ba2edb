//! Storage backend tests
//!
//! SeaOrmStorage against temporary SQLite databases.

mod common;

use sea_orm::ConnectionTrait;

use common::temp_storage;
use link_saver::errors::LinkSaverError;
use link_saver::storage::{PageContent, ResourceType};
use link_saver::storage::backend::infer_backend_from_url;

// =============================================================================
// URL 推断
// =============================================================================

#[test]
fn test_infer_backend_from_url() {
    assert_eq!(infer_backend_from_url("sqlite://data.db").unwrap(), "sqlite");
    assert_eq!(infer_backend_from_url("link_saver.db").unwrap(), "sqlite");
    assert_eq!(infer_backend_from_url("/var/lib/ls.sqlite").unwrap(), "sqlite");
    assert_eq!(infer_backend_from_url(":memory:").unwrap(), "sqlite");
    assert_eq!(
        infer_backend_from_url("postgres://u:p@localhost/ls").unwrap(),
        "postgres"
    );
    assert_eq!(
        infer_backend_from_url("mysql://u:p@localhost/ls").unwrap(),
        "mysql"
    );
    assert!(infer_backend_from_url("ftp://nowhere").is_err());
}

// =============================================================================
// Links
// =============================================================================

#[tokio::test]
async fn test_save_and_get_link_by_id() {
    let (storage, _dir) = temp_storage().await;

    let id = storage
        .save_link(7, "docs", "https://a.example/p", b"<html></html>".to_vec())
        .await
        .unwrap();

    let link = storage.get_link_by_id(id).await.unwrap();
    assert_eq!(link.id, id);
    assert_eq!(link.owner, 7);
    assert_eq!(link.original_url, "https://a.example/p");
    assert_eq!(link.description, "docs");
}

#[tokio::test]
async fn test_get_link_by_id_missing() {
    let (storage, _dir) = temp_storage().await;
    let err = storage.get_link_by_id(404).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_links_newest_first_with_filter() {
    let (storage, _dir) = temp_storage().await;

    let first = storage
        .save_link(1, "rust blog", "https://a.example/1", vec![])
        .await
        .unwrap();
    let second = storage
        .save_link(1, "recipes", "https://a.example/2", vec![])
        .await
        .unwrap();
    let third = storage
        .save_link(1, "more rust", "https://a.example/3", vec![])
        .await
        .unwrap();
    storage
        .save_link(2, "rust elsewhere", "https://a.example/4", vec![])
        .await
        .unwrap();

    let all = storage.list_links(1, "").await.unwrap();
    let ids: Vec<i64> = all.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![third, second, first]);

    let rust = storage.list_links(1, "rust").await.unwrap();
    let ids: Vec<i64> = rust.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![third, first]);

    let none = storage.list_links(1, "nothing matches").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_get_content_returns_most_recent_capture() {
    let (storage, _dir) = temp_storage().await;

    storage
        .save_link(3, "", "https://a.example/p", b"old".to_vec())
        .await
        .unwrap();
    storage
        .save_link(3, "", "https://a.example/p", b"new".to_vec())
        .await
        .unwrap();

    let content = storage.get_content(3, "https://a.example/p").await.unwrap();
    assert_eq!(content.bytes, b"new");
    assert_eq!(content.charset, "UTF-8");
}

#[tokio::test]
async fn test_get_content_returns_stored_charset() {
    let (storage, _dir) = temp_storage().await;

    let page = PageContent::new(b"<p>\xCF\xF0\xE8\xE2\xE5\xF2</p>".to_vec(), "windows-1251");
    storage
        .save_link(3, "", "https://ru.example/p", page.clone())
        .await
        .unwrap();

    let content = storage.get_content(3, "https://ru.example/p").await.unwrap();
    assert_eq!(content, page);
}

#[tokio::test]
async fn test_get_content_is_scoped_to_owner() {
    let (storage, _dir) = temp_storage().await;

    storage
        .save_link(3, "", "https://a.example/p", b"mine".to_vec())
        .await
        .unwrap();

    let err = storage
        .get_content(4, "https://a.example/p")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_link() {
    let (storage, _dir) = temp_storage().await;

    let id = storage
        .save_link(9, "", "https://a.example/gone", b"x".to_vec())
        .await
        .unwrap();

    let deleted = storage.delete_link(id).await.unwrap();
    assert_eq!(deleted.original_url, "https://a.example/gone");
    assert_eq!(deleted.owner, 9);

    assert!(storage.get_link_by_id(id).await.unwrap_err().is_not_found());
    assert!(storage.delete_link(id).await.unwrap_err().is_not_found());
    assert!(
        storage
            .get_content(9, "https://a.example/gone")
            .await
            .unwrap_err()
            .is_not_found()
    );
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_users_are_created_once() {
    let (storage, _dir) = temp_storage().await;
    assert_eq!(storage.count_users().await.unwrap(), 0);

    storage
        .save_link(5, "", "https://a.example/1", vec![])
        .await
        .unwrap();
    storage
        .save_link(5, "", "https://a.example/2", vec![])
        .await
        .unwrap();
    assert_eq!(storage.count_users().await.unwrap(), 1);

    // reads create unknown users too
    assert!(storage.list_links(6, "").await.unwrap().is_empty());
    assert_eq!(storage.count_users().await.unwrap(), 2);
}

#[tokio::test]
async fn test_failed_link_insert_rolls_back_new_user() {
    let (storage, _dir) = temp_storage().await;

    storage
        .get_db()
        .execute_unprepared(
            "CREATE TRIGGER reject_links BEFORE INSERT ON links \
             BEGIN SELECT RAISE(ABORT, 'links are read-only'); END;",
        )
        .await
        .unwrap();

    let err = storage
        .save_link(21, "", "https://a.example/p", b"<html></html>".to_vec())
        .await
        .unwrap_err();
    assert!(!err.is_not_found());

    // the user row written earlier in the same transaction is gone too
    assert_eq!(storage.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_first_writes_share_one_user() {
    let (storage, _dir) = temp_storage().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            storage
                .save_link(11, "", &format!("https://a.example/{}", i), vec![])
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(storage.count_users().await.unwrap(), 1);
    assert_eq!(storage.list_links(11, "").await.unwrap().len(), 8);
}

// =============================================================================
// Resources
// =============================================================================

#[tokio::test]
async fn test_resource_last_write_wins() {
    let (storage, _dir) = temp_storage().await;

    storage
        .save_resource("abc.js", b"v1".to_vec(), ResourceType::Script)
        .await
        .unwrap();
    storage
        .save_resource("abc.js", b"v2".to_vec(), ResourceType::Script)
        .await
        .unwrap();

    let content = storage
        .get_resource("abc.js", ResourceType::Script)
        .await
        .unwrap();
    assert_eq!(content, b"v2");
}

#[tokio::test]
async fn test_resource_lookup_checks_type() {
    let (storage, _dir) = temp_storage().await;

    storage
        .save_resource("logo.png", vec![0x89, 0x50], ResourceType::Image)
        .await
        .unwrap();

    let err = storage
        .get_resource("logo.png", ResourceType::Css)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkSaverError::NotFound(_)));

    let err = storage
        .get_resource("missing.png", ResourceType::Image)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_ping() {
    let (storage, _dir) = temp_storage().await;
    storage.ping().await.unwrap();
    assert_eq!(storage.get_backend_config().storage_type, "sqlite");
}
