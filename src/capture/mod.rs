//! Capture pipeline: fetch a page, store its same-origin assets and
//! rewrite the page to reference the stored copies.

pub mod assets;
pub mod charset;
pub mod document;
pub mod fetch;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CaptureConfig;
use crate::errors::Result;
use crate::storage::{PageContent, ResourceType, SeaOrmStorage};

pub use assets::{AssetJob, Scan, content_address, mount_prefix, scan, serving_path};
pub use document::{EditQueue, apply_rewrites};
pub use fetch::{Fetched, HttpFetcher, PageFetcher};

/// Destination for captured asset bytes.
#[async_trait]
pub trait ResourceSink: Send + Sync {
    async fn save_resource(
        &self,
        address: &str,
        content: Vec<u8>,
        resource_type: ResourceType,
    ) -> Result<()>;
}

#[async_trait]
impl ResourceSink for SeaOrmStorage {
    async fn save_resource(
        &self,
        address: &str,
        content: Vec<u8>,
        resource_type: ResourceType,
    ) -> Result<()> {
        SeaOrmStorage::save_resource(self, address, content, resource_type).await
    }
}

/// Per-capture asset outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    /// Distinct assets stored and rewritten
    pub captured: usize,
    /// References left as-is without an attempt
    pub skipped: usize,
    /// Assets whose fetch or store failed; references left as-is
    pub failed: usize,
    pub failed_urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Capture {
    pub content: PageContent,
    /// Page URL after redirects
    pub final_url: Url,
    pub report: CaptureReport,
}

enum AssetOutcome {
    Stored,
    Failed(String),
}

pub struct CapturePipeline {
    fetcher: Arc<dyn PageFetcher>,
    resources: Arc<dyn ResourceSink>,
    config: CaptureConfig,
    /// Prefix for rewritten asset references
    mount: String,
}

impl CapturePipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        resources: Arc<dyn ResourceSink>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            fetcher,
            resources,
            config,
            mount: String::new(),
        }
    }

    /// Serve rewritten assets under the path of `base_url`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.mount = mount_prefix(base_url);
        self
    }

    /// Capture `url`.
    ///
    /// Only the root fetch can fail the capture; asset failures are logged
    /// and recorded in the report.
    pub async fn capture(&self, url: &Url) -> Result<Capture> {
        let root = self.fetcher.fetch(url, self.config.root_timeout()).await?;
        let sniffed = charset::sniff(&root.bytes, root.content_type.as_deref());
        let (source, encoding, _) = sniffed.decode(&root.bytes);

        let Scan { jobs, skipped } = scan(&source, &root.final_url, self.config.max_assets);
        debug!(
            "Found {} assets on {} ({} references skipped)",
            jobs.len(),
            root.final_url,
            skipped
        );

        let queue = EditQueue::new();
        let outcomes: Vec<AssetOutcome> = stream::iter(jobs)
            .map(|job| {
                let queue = queue.clone();
                async move { self.capture_asset(job, &queue).await }
            })
            .buffer_unordered(self.config.max_concurrent_assets.max(1))
            .collect()
            .await;

        let mut report = CaptureReport {
            skipped,
            ..CaptureReport::default()
        };
        for outcome in outcomes {
            match outcome {
                AssetOutcome::Stored => report.captured += 1,
                AssetOutcome::Failed(url) => {
                    report.failed += 1;
                    report.failed_urls.push(url);
                }
            }
        }

        // untouched pages are kept byte for byte; rewritten ones go back
        // out in the encoding they came in
        let edits = queue.drain();
        let content = if edits.is_empty() {
            PageContent::new(root.bytes.to_vec(), encoding.name())
        } else {
            let html = apply_rewrites(&source, &edits);
            let (bytes, written, _) = encoding.output_encoding().encode(&html);
            PageContent::new(bytes.into_owned(), written.name())
        };

        info!(
            "Captured {}: {} assets stored, {} skipped, {} failed",
            root.final_url, report.captured, report.skipped, report.failed
        );
        Ok(Capture {
            content,
            final_url: root.final_url,
            report,
        })
    }

    async fn capture_asset(&self, job: AssetJob, queue: &EditQueue) -> AssetOutcome {
        let fetched = match self.fetcher.fetch(&job.url, self.config.asset_timeout()).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Asset fetch failed for {}: {}", job.url, e);
                return AssetOutcome::Failed(job.url.to_string());
            }
        };

        if let Err(e) = self
            .resources
            .save_resource(&job.address, fetched.bytes.to_vec(), job.kind)
            .await
        {
            warn!("Failed to store asset {}: {}", job.url, e);
            return AssetOutcome::Failed(job.url.to_string());
        }

        let path = job.serving_path(&self.mount);
        for slot in &job.slots {
            queue.push(*slot, path.clone());
        }
        AssetOutcome::Stored
    }
}
