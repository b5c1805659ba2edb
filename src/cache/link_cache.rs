use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::register::{debug_cache_registry, get_token_store_plugin};
use crate::cache::token::{derive_token, now_nanos};
use crate::cache::traits::{CachedLink, TokenStore};
use crate::config::CacheConfig;
use crate::errors::{LinkSaverError, Result};

/// Token <-> original URL mapping with fixed-TTL expiry.
///
/// All state here is advisory; the link store stays authoritative.
pub struct LinkCache {
    store: Arc<dyn TokenStore>,
    ttl: Duration,
}

impl LinkCache {
    pub fn new(store: Arc<dyn TokenStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Build the cache from the backend named by `cache.type`.
    pub async fn from_config(config: &CacheConfig) -> Result<Self> {
        debug_cache_registry();

        let ctor = get_token_store_plugin(&config.cache_type).ok_or_else(|| {
            LinkSaverError::cache_plugin_not_found(format!(
                "Unknown cache type: {}",
                config.cache_type
            ))
        })?;
        let store = ctor(config.clone()).await?;

        info!(
            "Link cache initialized: backend={}, ttl={}s",
            store.backend_name(),
            config.ttl
        );
        Ok(Self::new(Arc::from(store), config.ttl()))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Live token for `(user_id, original_url)`, minting one on a miss.
    ///
    /// Two concurrent misses may both mint; the later write owns the reverse
    /// index and the earlier token still resolves until it expires.
    pub async fn get_or_create_token(
        &self,
        user_id: i64,
        link_id: i64,
        original_url: &str,
    ) -> Result<String> {
        if let Some(token) = self.store.lookup_token(user_id, original_url).await? {
            debug!("Token cache hit for user {}", user_id);
            return Ok(token);
        }

        let token = derive_token(user_id, original_url, now_nanos());
        let link = CachedLink {
            user_id,
            link_id,
            original_url: original_url.to_string(),
        };
        self.store.put(&token, link, self.ttl).await?;

        info!("Generated public token for link {} (user {})", link_id, user_id);
        Ok(token)
    }

    /// `None` means the token expired, was evicted or never existed for this user.
    pub async fn resolve_token(&self, user_id: i64, token: &str) -> Result<Option<CachedLink>> {
        self.store.get_entry(user_id, token).await
    }

    pub async fn evict_link(&self, user_id: i64, original_url: &str) -> Result<()> {
        self.store.remove(user_id, original_url).await?;
        debug!("Evicted token for user {}: {}", user_id, original_url);
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
