use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use moka::notification::RemovalCause;
use moka::policy::Expiry;
use tracing::{debug, trace};

use crate::cache::traits::{CachedLink, TokenStore};
use crate::config::CacheConfig;
use crate::declare_token_store_plugin;
use crate::errors::Result;

declare_token_store_plugin!("memory", MemoryTokenStore);

type TokenKey = (i64, String);
type UrlKey = (i64, String);

#[derive(Clone)]
struct TimedLink {
    link: CachedLink,
    ttl: Duration,
}

/// 每个条目使用写入时指定的 TTL
struct PerEntryExpiry;

impl Expiry<TokenKey, TimedLink> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &TokenKey,
        value: &TimedLink,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Single-node token store: moka holds `(user, token) -> link` with
/// per-entry expiry, a dashmap holds `(user, url) -> token`.
pub struct MemoryTokenStore {
    entries: Cache<TokenKey, TimedLink>,
    reverse: Arc<DashMap<UrlKey, String>>,
}

impl MemoryTokenStore {
    pub fn new(max_capacity: u64) -> Self {
        let reverse: Arc<DashMap<UrlKey, String>> = Arc::new(DashMap::new());

        let index = Arc::clone(&reverse);
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .eviction_listener(move |key: Arc<TokenKey>, value: TimedLink, cause| {
                if cause == RemovalCause::Replaced {
                    return;
                }
                // 仅当索引仍指向该 token 时才移除
                let url_key = (key.0, value.link.original_url);
                index.remove_if(&url_key, |_, token| *token == key.1);
            })
            .build();

        debug!(
            "MemoryTokenStore initialized with max capacity: {}",
            max_capacity
        );
        Self { entries, reverse }
    }

    pub async fn from_config(config: &CacheConfig) -> Result<Self> {
        Ok(Self::new(config.memory.max_capacity))
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn lookup_token(&self, user_id: i64, original_url: &str) -> Result<Option<String>> {
        let url_key = (user_id, original_url.to_string());
        let token = match self.reverse.get(&url_key) {
            Some(token) => token.value().clone(),
            None => return Ok(None),
        };

        if self
            .entries
            .get(&(user_id, token.clone()))
            .await
            .is_some()
        {
            return Ok(Some(token));
        }

        trace!("Stale reverse index entry for user {}", user_id);
        self.reverse.remove_if(&url_key, |_, t| *t == token);
        Ok(None)
    }

    async fn get_entry(&self, user_id: i64, token: &str) -> Result<Option<CachedLink>> {
        Ok(self
            .entries
            .get(&(user_id, token.to_string()))
            .await
            .map(|timed| timed.link))
    }

    async fn put(&self, token: &str, link: CachedLink, ttl: Duration) -> Result<()> {
        let url_key = (link.user_id, link.original_url.clone());
        self.entries
            .insert((link.user_id, token.to_string()), TimedLink { link, ttl })
            .await;
        self.reverse.insert(url_key, token.to_string());
        Ok(())
    }

    async fn remove(&self, user_id: i64, original_url: &str) -> Result<()> {
        if let Some((_, token)) = self.reverse.remove(&(user_id, original_url.to_string())) {
            self.entries.invalidate(&(user_id, token)).await;
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
