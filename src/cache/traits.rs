use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// What a public token stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLink {
    /// External identity the token was issued to
    pub user_id: i64,
    pub link_id: i64,
    pub original_url: String,
}

/// Ephemeral token storage with a per-user reverse index.
///
/// Implementations key token entries by `(user, token)` so a token never
/// resolves for anyone but its owner.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Live token currently bound to `(user_id, original_url)`.
    ///
    /// A reverse-index entry whose token entry has expired counts as absent
    /// and may be cleaned up on the way.
    async fn lookup_token(&self, user_id: i64, original_url: &str) -> Result<Option<String>>;

    async fn get_entry(&self, user_id: i64, token: &str) -> Result<Option<CachedLink>>;

    /// Store `token -> link` with `ttl` and point the owner's reverse index at it.
    async fn put(&self, token: &str, link: CachedLink, ttl: Duration) -> Result<()>;

    /// Drop the token bound to `(user_id, original_url)` and its index entry.
    async fn remove(&self, user_id: i64, original_url: &str) -> Result<()>;

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str;
}
