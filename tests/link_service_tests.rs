//! LinkService tests
//!
//! Real SQLite storage and memory token store, scripted fetcher.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{BASE_URL, StubFetcher, build_service, temp_storage, token_of};
use link_saver::capture::content_address;
use link_saver::errors::LinkSaverError;
use link_saver::services::SaveLinkRequest;
use link_saver::storage::ResourceType;

const PAGE: &str = r#"<html><head><script src="./s.js"></script></head>
<body><img src="https://cdn.other/x.png"></body></html>"#;

fn site() -> StubFetcher {
    StubFetcher::new()
        .page("https://a.example/p", PAGE)
        .page("https://a.example/s.js", "console.log(1)")
        .status("https://forbidden.example/", 403)
}

fn save_request(user_id: i64, url: &str) -> SaveLinkRequest {
    SaveLinkRequest {
        user_id,
        description: "saved for later".to_string(),
        original_url: url.to_string(),
    }
}

#[tokio::test]
async fn test_save_publish_and_serve() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_secs(60));

    let saved = service
        .save_link(save_request(7, "https://a.example/p"))
        .await
        .unwrap();
    assert_eq!(saved.original_url, "https://a.example/p");
    assert_eq!(saved.report.captured, 1);
    assert_eq!(saved.report.skipped, 1);

    let generated = service.get_public_link(7, saved.link_id).await.unwrap();
    let prefix = format!("{}/gen/7/", BASE_URL);
    assert!(generated.starts_with(&prefix), "{}", generated);
    let token = token_of(&generated);
    assert_eq!(token.len(), 64);

    let page = String::from_utf8(service.serve_page(7, &token).await.unwrap().bytes).unwrap();
    let address = content_address(ResourceType::Script, "/s.js");
    assert!(page.contains(&format!("/assets/script/{}", address)));
    assert!(page.contains("https://cdn.other/x.png"));

    let resource = service.serve_resource("script", &address).await.unwrap();
    assert_eq!(resource.content, b"console.log(1)");
    assert_eq!(resource.content_type, "application/javascript");
}

#[tokio::test]
async fn test_token_is_reused_within_ttl() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_secs(60));

    let saved = service
        .save_link(save_request(1, "https://a.example/p"))
        .await
        .unwrap();

    let first = service.get_public_link(1, saved.link_id).await.unwrap();
    let second = service.get_public_link(1, saved.link_id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_token_rotates_after_expiry() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_millis(200));

    let saved = service
        .save_link(save_request(1, "https://a.example/p"))
        .await
        .unwrap();

    let first = token_of(&service.get_public_link(1, saved.link_id).await.unwrap());
    assert!(service.serve_page(1, &first).await.is_ok());

    tokio::time::sleep(Duration::from_millis(500)).await;

    let err = service.serve_page(1, &first).await.unwrap_err();
    assert!(err.is_not_found());

    let second = token_of(&service.get_public_link(1, saved.link_id).await.unwrap());
    assert_ne!(first, second);
    assert!(service.serve_page(1, &second).await.is_ok());
}

#[tokio::test]
async fn test_token_is_bound_to_its_user() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_secs(60));

    let saved = service
        .save_link(save_request(1, "https://a.example/p"))
        .await
        .unwrap();
    let token = token_of(&service.get_public_link(1, saved.link_id).await.unwrap());

    let err = service.serve_page(2, &token).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_public_link_of_another_user_is_not_found() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_secs(60));

    let saved = service
        .save_link(save_request(1, "https://a.example/p"))
        .await
        .unwrap();

    let err = service.get_public_link(2, saved.link_id).await.unwrap_err();
    assert!(err.is_not_found());

    let err = service.get_public_link(1, saved.link_id + 100).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_revokes_public_link() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_secs(60));

    let saved = service
        .save_link(save_request(3, "https://a.example/p"))
        .await
        .unwrap();
    let token = token_of(&service.get_public_link(3, saved.link_id).await.unwrap());

    let deleted = service.delete_link(saved.link_id).await.unwrap();
    assert_eq!(deleted.owner, 3);
    assert_eq!(deleted.original_url, "https://a.example/p");

    assert!(service.serve_page(3, &token).await.unwrap_err().is_not_found());
    assert!(service.get_all_links(3).await.unwrap().is_empty());
    assert!(
        service
            .delete_link(saved.link_id)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_stale_token_is_evicted_on_serve() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_secs(60));

    let saved = service
        .save_link(save_request(4, "https://a.example/p"))
        .await
        .unwrap();
    let token = token_of(&service.get_public_link(4, saved.link_id).await.unwrap());

    // delete behind the cache's back
    service.storage().delete_link(saved.link_id).await.unwrap();
    assert!(service.cache().resolve_token(4, &token).await.unwrap().is_some());

    assert!(service.serve_page(4, &token).await.unwrap_err().is_not_found());
    assert!(service.cache().resolve_token(4, &token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_capture_persists_nothing() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage.clone(), Arc::new(site()), Duration::from_secs(60));

    let err = service
        .save_link(save_request(5, "https://forbidden.example/"))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkSaverError::Forbidden(_)));

    let err = service
        .save_link(save_request(5, "https://down.example/"))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkSaverError::InvalidSource(_)));

    assert_eq!(storage.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_fetching() {
    let (storage, _dir) = temp_storage().await;
    let fetcher = Arc::new(site());
    let service = build_service(storage, fetcher.clone(), Duration::from_secs(60));

    for bad in ["", "not a url", "ftp://a.example/file", "javascript:alert(1)"] {
        let err = service.save_link(save_request(1, bad)).await.unwrap_err();
        assert!(
            matches!(err, LinkSaverError::Validation(_)),
            "{:?} gave {:?}",
            bad,
            err
        );
    }
    assert_eq!(fetcher.total_hits(), 0);
}

#[tokio::test]
async fn test_get_links_filters_by_description() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_secs(60));

    service
        .save_link(SaveLinkRequest {
            user_id: 8,
            description: "work notes".to_string(),
            original_url: "https://a.example/p".to_string(),
        })
        .await
        .unwrap();
    service
        .save_link(SaveLinkRequest {
            user_id: 8,
            description: "holiday".to_string(),
            original_url: "https://a.example/p".to_string(),
        })
        .await
        .unwrap();

    let work = service.get_links(8, "work").await.unwrap();
    assert_eq!(work.len(), 1);
    assert_eq!(work[0].description, "work notes");

    let all = service.get_all_links(8).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].description, "holiday");
}

#[tokio::test]
async fn test_serve_resource_rejects_unknown_type() {
    let (storage, _dir) = temp_storage().await;
    let service = build_service(storage, Arc::new(site()), Duration::from_secs(60));

    let err = service.serve_resource("video", "abc").await.unwrap_err();
    assert!(matches!(err, LinkSaverError::Validation(_)));

    let err = service.serve_resource("css", "missing.css").await.unwrap_err();
    assert!(err.is_not_found());
}
