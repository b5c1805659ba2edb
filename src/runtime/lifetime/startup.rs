use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cache::LinkCache;
use crate::capture::{CapturePipeline, HttpFetcher};
use crate::config::get_config;
use crate::services::LinkService;
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub cache: Arc<LinkCache>,
    pub link_service: Arc<LinkService>,
}

/// 准备启动上下文：存储、缓存、抓取管线与 LinkService
///
/// Shared by server mode and the one-shot CLI commands.
pub async fn prepare_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // reqwest and redis may both try to install a provider; only the first wins
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let config = get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let cache = Arc::new(
        LinkCache::from_config(&config.cache)
            .await
            .context("Failed to initialize link cache")?,
    );

    let fetcher = Arc::new(HttpFetcher::new(&config.capture).context("Failed to build fetcher")?);
    let pipeline = Arc::new(
        CapturePipeline::new(fetcher, storage.clone(), config.capture.clone())
            .with_base_url(&config.server.base_url),
    );

    let link_service = Arc::new(LinkService::new(
        storage.clone(),
        cache.clone(),
        pipeline,
        config.server.base_url.clone(),
    ));

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        cache,
        link_service,
    })
}
