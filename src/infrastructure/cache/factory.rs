//! Builds the tiered cache from configuration

use std::sync::Arc;
use std::time::Duration;

use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};
use super::tiered::{TieredCache, TieredCacheConfig};

/// Settings for both cache tiers
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis URL; `None` runs local-only
    pub redis_url: Option<String>,
    /// Prefix applied to remote keys
    pub key_prefix: String,
    pub default_ttl: Duration,
    pub local_max_capacity: u64,
    pub local_max_ttl: Duration,
    pub reconnect_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: "dict:".to_string(),
            default_ttl: Duration::from_secs(3600),
            local_max_capacity: 100_000,
            local_max_ttl: Duration::from_secs(86_400),
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

impl CacheConfig {
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

/// Factory for the tiered cache
#[derive(Debug)]
pub struct CacheFactory;

impl CacheFactory {
    /// Creates the cache; an unreachable Redis is not an error here
    pub fn create(config: &CacheConfig) -> Result<TieredCache, DomainError> {
        let local = InMemoryCache::with_config(
            InMemoryCacheConfig::default()
                .with_max_capacity(config.local_max_capacity)
                .with_max_ttl(config.local_max_ttl.max(config.default_ttl)),
        );

        let tiered_config = TieredCacheConfig::default()
            .with_default_ttl(config.default_ttl)
            .with_reconnect_interval(config.reconnect_interval);

        let cache = TieredCache::new(local, tiered_config);

        match config.redis_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => {
                let remote = RedisCache::new(
                    RedisCacheConfig::new(url).with_key_prefix(config.key_prefix.clone()),
                )?;

                tracing::info!(prefix = %config.key_prefix, "Remote cache tier configured");
                Ok(cache.with_remote(Arc::new(remote)))
            }
            None => {
                tracing::info!("Running with local cache tier only");
                Ok(cache)
            }
        }
    }
}
