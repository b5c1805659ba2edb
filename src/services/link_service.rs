//! Link management service
//!
//! Composes the capture pipeline, the link store and the link cache into the
//! externally visible operations. Holds no state of its own.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::LinkCache;
use crate::capture::{CapturePipeline, CaptureReport};
use crate::errors::{LinkSaverError, Result};
use crate::storage::{DeletedLink, LinkSummary, PageContent, ResourceType, SeaOrmStorage};
use crate::utils::parse_source_url;

// ============ Request/Response DTOs ============

/// Request to save a page
#[derive(Debug, Clone)]
pub struct SaveLinkRequest {
    /// External identity of the owner
    pub user_id: i64,
    pub description: String,
    pub original_url: String,
}

/// Result of a successful save
#[derive(Debug, Clone, Serialize)]
pub struct SavedLink {
    pub link_id: i64,
    pub original_url: String,
    pub report: CaptureReport,
}

/// A stored asset ready to be served
#[derive(Debug, Clone)]
pub struct ServedResource {
    pub content: Vec<u8>,
    pub content_type: &'static str,
}

// ============ Service ============

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    cache: Arc<LinkCache>,
    pipeline: Arc<CapturePipeline>,
    base_url: String,
}

impl LinkService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        cache: Arc<LinkCache>,
        pipeline: Arc<CapturePipeline>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            storage,
            cache,
            pipeline,
            base_url,
        }
    }

    pub fn storage(&self) -> &Arc<SeaOrmStorage> {
        &self.storage
    }

    pub fn cache(&self) -> &Arc<LinkCache> {
        &self.cache
    }

    /// Capture `original_url` and store it for the user.
    ///
    /// Nothing is persisted unless the root document was fetched.
    pub async fn save_link(&self, req: SaveLinkRequest) -> Result<SavedLink> {
        let url = parse_source_url(&req.original_url)?;

        let capture = self.pipeline.capture(&url).await?;
        let link_id = self
            .storage
            .save_link(req.user_id, &req.description, url.as_str(), capture.content)
            .await?;

        info!(
            "LinkService: saved link {} for user {} ({} assets)",
            link_id, req.user_id, capture.report.captured
        );
        Ok(SavedLink {
            link_id,
            original_url: url.to_string(),
            report: capture.report,
        })
    }

    /// Public URL for one of the user's links: `{base}/gen/{user}/{token}`.
    ///
    /// A link owned by someone else is reported as not found.
    pub async fn get_public_link(&self, user_id: i64, link_id: i64) -> Result<String> {
        let link = self.storage.get_link_by_id(link_id).await?;
        if link.owner != user_id {
            return Err(LinkSaverError::not_found(format!(
                "link {} not found",
                link_id
            )));
        }

        let token = self
            .cache
            .get_or_create_token(user_id, link.id, &link.original_url)
            .await?;
        Ok(format!("{}/gen/{}/{}", self.base_url, user_id, token))
    }

    /// The user's links whose description contains `description`.
    pub async fn get_links(&self, user_id: i64, description: &str) -> Result<Vec<LinkSummary>> {
        self.storage.list_links(user_id, description).await
    }

    pub async fn get_all_links(&self, user_id: i64) -> Result<Vec<LinkSummary>> {
        self.storage.list_links(user_id, "").await
    }

    /// Delete a link, then evict its public token.
    ///
    /// The store is authoritative: an eviction failure is logged and the
    /// delete still succeeds. A stale token is caught when it is served.
    pub async fn delete_link(&self, link_id: i64) -> Result<DeletedLink> {
        let deleted = self.storage.delete_link(link_id).await?;

        if let Err(e) = self
            .cache
            .evict_link(deleted.owner, &deleted.original_url)
            .await
        {
            warn!(
                "LinkService: failed to evict token for deleted link {}: {}",
                link_id, e
            );
        }

        info!("LinkService: deleted link {}", link_id);
        Ok(deleted)
    }

    /// Captured page behind a public token.
    ///
    /// A cache hit whose link has since been deleted is evicted and reported
    /// as not found.
    pub async fn serve_page(&self, user_id: i64, token: &str) -> Result<PageContent> {
        let Some(entry) = self.cache.resolve_token(user_id, token).await? else {
            return Err(LinkSaverError::not_found("link not found or expired"));
        };

        match self.storage.get_content(user_id, &entry.original_url).await {
            Ok(content) => Ok(content),
            Err(e) if e.is_not_found() => {
                if let Err(evict_err) = self.cache.evict_link(user_id, &entry.original_url).await {
                    warn!(
                        "LinkService: failed to evict stale token for user {}: {}",
                        user_id, evict_err
                    );
                }
                Err(LinkSaverError::not_found("link not found or expired"))
            }
            Err(e) => Err(e),
        }
    }

    /// Stored asset by serving-path segments `{type}/{name}`.
    pub async fn serve_resource(&self, resource_type: &str, name: &str) -> Result<ServedResource> {
        let kind: ResourceType = resource_type.parse()?;
        let content = self.storage.get_resource(name, kind).await?;
        Ok(ServedResource {
            content,
            content_type: kind.content_type(name),
        })
    }
}
