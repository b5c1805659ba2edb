use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use crate::cache::traits::{CachedLink, TokenStore};
use crate::config::CacheConfig;
use crate::declare_token_store_plugin;
use crate::errors::{LinkSaverError, Result};

declare_token_store_plugin!("redis", RedisTokenStore);

/// Redis 令牌存储
///
/// - `{prefix}token:{user}:{token}` 保存 JSON 编码的 [`CachedLink`]，带 EX
/// - `{prefix}links:{user}` 哈希表保存 url -> token
pub struct RedisTokenStore {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisTokenStore {
    pub async fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::connect(&config.redis.url, &config.redis.key_prefix).await
    }

    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            LinkSaverError::cache_connection(format!("invalid redis url {}: {}", url, e))
        })?;

        let store = Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: key_prefix.to_string(),
        };

        store.ping().await.map_err(|e| {
            error!(
                "Failed to ping Redis server: {}. Check Redis server status and URL: {}",
                e, url
            );
            LinkSaverError::cache_connection(format!("redis ping failed: {}", e))
        })?;

        debug!("RedisTokenStore created with prefix: '{}'", key_prefix);
        Ok(store)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    /// Reset the cached connection when a command fails so the next call reconnects.
    async fn check<T>(&self, result: redis::RedisResult<T>) -> Result<T> {
        match result {
            Ok(v) => Ok(v),
            Err(e) => {
                error!("Redis command failed: {}", e);
                self.reset_connection().await;
                Err(e.into())
            }
        }
    }

    fn token_key(&self, user_id: i64, token: &str) -> String {
        format!("{}token:{}:{}", self.key_prefix, user_id, token)
    }

    fn index_key(&self, user_id: i64) -> String {
        format!("{}links:{}", self.key_prefix, user_id)
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn lookup_token(&self, user_id: i64, original_url: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        let index_key = self.index_key(user_id);

        let token: Option<String> = self.check(conn.hget(&index_key, original_url).await).await?;
        let Some(token) = token else {
            return Ok(None);
        };

        let live: bool = self
            .check(conn.exists(self.token_key(user_id, &token)).await)
            .await?;
        if live {
            return Ok(Some(token));
        }

        trace!("Stale reverse index entry for user {}", user_id);
        let _: () = self
            .check(conn.hdel(&index_key, original_url).await)
            .await?;
        Ok(None)
    }

    async fn get_entry(&self, user_id: i64, token: &str) -> Result<Option<CachedLink>> {
        let mut conn = self.get_connection().await?;
        let data: Option<String> = self
            .check(conn.get(self.token_key(user_id, token)).await)
            .await?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, token: &str, link: CachedLink, ttl: Duration) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let ttl_secs = ttl.as_secs().max(1);
        let token_key = self.token_key(link.user_id, token);
        let index_key = self.index_key(link.user_id);
        let payload = serde_json::to_string(&link)?;

        let result: redis::RedisResult<()> = redis::pipe()
            .atomic()
            .set_ex(&token_key, payload, ttl_secs)
            .ignore()
            .hset(&index_key, &link.original_url, token)
            .ignore()
            .expire(&index_key, ttl_secs as i64)
            .ignore()
            .query_async(&mut conn)
            .await;
        self.check(result).await
    }

    async fn remove(&self, user_id: i64, original_url: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let index_key = self.index_key(user_id);

        let token: Option<String> = self.check(conn.hget(&index_key, original_url).await).await?;
        if let Some(token) = token {
            let _: () = self
                .check(conn.del(self.token_key(user_id, &token)).await)
                .await?;
        }
        let _: () = self
            .check(conn.hdel(&index_key, original_url).await)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let result: redis::RedisResult<String> =
            redis::cmd("PING").query_async(&mut conn).await;
        self.check(result).await.map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
