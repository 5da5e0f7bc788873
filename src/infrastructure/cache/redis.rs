//! Remote shared cache tier backed by Redis

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for the remote tier
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Prepended verbatim to every key
    pub key_prefix: String,
    /// Bound on establishing the first connection
    pub connection_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "dict:".to_string(),
            connection_timeout: Duration::from_secs(2),
        }
    }
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis tier
///
/// The connection is opened on first use so startup never blocks on an
/// unreachable server. `ConnectionManager` reconnects on its own afterwards.
pub struct RedisCache {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisCache {
    /// Validates the URL; no network traffic happens here
    pub fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Invalid Redis URL: {}", e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            config,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, DomainError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let connect = ConnectionManager::new(self.client.clone());

                match tokio::time::timeout(self.config.connection_timeout, connect).await {
                    Ok(Ok(manager)) => Ok(manager),
                    Ok(Err(e)) => Err(DomainError::cache(format!(
                        "Failed to connect to Redis: {}",
                        e
                    ))),
                    Err(_) => Err(DomainError::cache("Timed out connecting to Redis")),
                }
            })
            .await?;

        Ok(manager.clone())
    }

    fn prefix_key(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let prefixed_pattern = self.prefix_key(pattern);
        let mut conn = self.connection().await?;

        // SCAN rather than KEYS so large keyspaces do not block the server
        let mut cursor = 0u64;
        let mut found = Vec::new();

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&prefixed_pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::cache(format!("Failed to scan pattern '{}': {}", pattern, e))
                })?;

            found.extend(keys);
            cursor = next;

            if cursor == 0 {
                break;
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection().await?;

        conn.get(self.prefix_key(key))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;
        let ttl_secs = ttl.as_secs().max(1);

        let _: () = conn
            .set_ex(self.prefix_key(key), value, ttl_secs)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection().await?;

        let deleted: i64 = conn
            .del(self.prefix_key(key))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(deleted > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let keys = self.scan(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection().await?;
        let mut total = 0usize;

        for chunk in keys.chunks(500) {
            let deleted: i64 = conn
                .del(chunk)
                .await
                .map_err(|e| DomainError::cache(format!("Failed to delete keys: {}", e)))?;
            total += deleted as usize;
        }

        Ok(total)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection().await?;

        conn.exists(self.prefix_key(key)).await.map_err(|e| {
            DomainError::cache(format!("Failed to check existence of key '{}': {}", key, e))
        })
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.delete_pattern("*").await.map(|_| ())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        Ok(self.scan("*").await?.len())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Redis ping failed: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    fn test_config() -> RedisCacheConfig {
        RedisCacheConfig::new("redis://127.0.0.1:6379").with_key_prefix("lightning-test:")
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = RedisCache::new(RedisCacheConfig::new("not a url"));
        assert!(matches!(result, Err(DomainError::Cache { .. })));
    }

    #[test]
    fn test_key_prefix_applied_verbatim() {
        let cache = RedisCache::new(test_config()).unwrap();
        assert_eq!(cache.prefix_key("word:run"), "lightning-test:word:run");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_cache_error() {
        let config = RedisCacheConfig::new("redis://127.0.0.1:1")
            .with_connection_timeout(Duration::from_millis(200));
        let cache = RedisCache::new(config).unwrap();

        assert!(matches!(cache.ping().await, Err(DomainError::Cache { .. })));
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_set_get_delete() {
        let cache = RedisCache::new(test_config()).unwrap();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));

        assert!(cache.delete("key1").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_delete_pattern() {
        let cache = RedisCache::new(test_config()).unwrap();

        for key in ["word:a", "word:b", "search:a"] {
            cache
                .set_raw(key, "1", Duration::from_secs(60))
                .await
                .unwrap();
        }

        assert_eq!(cache.delete_pattern("word:*").await.unwrap(), 2);
        cache.clear().await.unwrap();
    }
}
