//! Shared fixtures for the integration tests: temporary SQLite storage, a
//! scripted fetcher and a fully wired `LinkService`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::StatusCode;
use tempfile::TempDir;
use url::Url;

use link_saver::cache::{LinkCache, MemoryTokenStore};
use link_saver::capture::fetch::status_error;
use link_saver::capture::{CapturePipeline, Fetched, PageFetcher};
use link_saver::config::{CaptureConfig, init_config};
use link_saver::errors::{LinkSaverError, Result};
use link_saver::services::LinkService;
use link_saver::storage::SeaOrmStorage;

pub const BASE_URL: &str = "http://localhost:8000";

static INIT: Once = Once::new();

pub fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

/// Fresh SQLite database in its own temp dir; keep the dir alive for the test.
pub async fn temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_test_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");

    (Arc::new(storage), temp_dir)
}

enum Reply {
    Body {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
    Status(u16),
    Redirect(String),
}

/// Fetcher answering from a fixed route table. Unknown URLs fail like an
/// unreachable host.
#[derive(Default)]
pub struct StubFetcher {
    routes: HashMap<String, Reply>,
    hits: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, body: &str) -> Self {
        self.raw_page(url, body.as_bytes(), None)
    }

    /// Body sent as-is, optionally with a `Content-Type` header.
    pub fn raw_page(mut self, url: &str, bytes: &[u8], content_type: Option<&str>) -> Self {
        self.routes.insert(
            url.to_string(),
            Reply::Body {
                bytes: bytes.to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }

    pub fn status(mut self, url: &str, code: u16) -> Self {
        self.routes.insert(url.to_string(), Reply::Status(code));
        self
    }

    /// `from` ends up at `to`, which must be routed too.
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.routes.insert(from.to_string(), Reply::Redirect(to.to_string()));
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().iter().filter(|u| u.as_str() == url).count()
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().len()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<Fetched> {
        self.hits.lock().push(url.to_string());

        let mut current = url.clone();
        loop {
            match self.routes.get(current.as_str()) {
                Some(Reply::Body {
                    bytes,
                    content_type,
                }) => {
                    return Ok(Fetched {
                        final_url: current,
                        content_type: content_type.clone(),
                        bytes: Bytes::from(bytes.clone()),
                    });
                }
                Some(Reply::Status(code)) => {
                    let status = StatusCode::from_u16(*code).expect("valid status");
                    return Err(status_error(&current, status));
                }
                Some(Reply::Redirect(to)) => {
                    current = Url::parse(to).expect("valid redirect target");
                }
                None => {
                    return Err(LinkSaverError::invalid_source(format!(
                        "{} is unreachable",
                        current
                    )));
                }
            }
        }
    }
}

pub fn test_capture_config() -> CaptureConfig {
    CaptureConfig {
        max_concurrent_assets: 4,
        ..CaptureConfig::default()
    }
}

/// LinkService over `storage` with an in-process memory token store.
pub fn build_service(
    storage: Arc<SeaOrmStorage>,
    fetcher: Arc<StubFetcher>,
    ttl: Duration,
) -> Arc<LinkService> {
    let cache = Arc::new(LinkCache::new(Arc::new(MemoryTokenStore::new(1_000)), ttl));
    let pipeline = Arc::new(CapturePipeline::new(
        fetcher,
        storage.clone(),
        test_capture_config(),
    ));
    Arc::new(LinkService::new(storage, cache, pipeline, BASE_URL))
}

/// Token part of a generated `{base}/gen/{user}/{token}` URL.
pub fn token_of(generated_url: &str) -> String {
    generated_url
        .rsplit('/')
        .next()
        .expect("generated url has a token segment")
        .to_string()
}
