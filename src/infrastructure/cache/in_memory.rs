//! Local in-process cache tier using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tokio::time::Instant;

use crate::domain::cache::{glob_to_regex, Cache};
use crate::domain::DomainError;

/// Configuration for the local tier
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Upper bound on how long moka retains any entry
    pub max_ttl: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100_000,
            max_ttl: Duration::from_secs(86_400),
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }
}

/// Entry stored in moka with its own absolute expiry
#[derive(Debug, Clone)]
struct LocalEntry {
    data: String,
    expires_at: Instant,
}

impl LocalEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Local tier; expired entries are evicted lazily on access or by
/// [`InMemoryCache::cleanup_expired`]
#[derive(Debug, Clone)]
pub struct InMemoryCache {
    cache: MokaCache<String, LocalEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.max_ttl)
            .build();

        Self { cache }
    }

    /// Keys whose entries satisfy `predicate`, collected off the async runtime
    async fn collect_keys<F>(&self, predicate: F) -> Result<Vec<String>, DomainError>
    where
        F: Fn(&str, &LocalEntry) -> bool + Send + 'static,
    {
        self.cache.run_pending_tasks().await;

        let cache = self.cache.clone();
        tokio::task::spawn_blocking(move || {
            cache
                .iter()
                .filter(|(k, v)| predicate(k.as_str(), v))
                .map(|(k, _)| k.as_ref().clone())
                .collect()
        })
        .await
        .map_err(|e| DomainError::cache(format!("Failed to iterate local cache: {}", e)))
    }

    /// Removes every expired entry, returning how many were dropped
    pub async fn cleanup_expired(&self) -> Result<usize, DomainError> {
        let now = Instant::now();
        let expired = self.collect_keys(move |_, entry| entry.is_expired(now)).await?;

        for key in &expired {
            self.cache.remove(key).await;
        }

        Ok(expired.len())
    }

    /// Approximate entry count without flushing pending maintenance
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let Some(entry) = self.cache.get(key).await else {
            return Ok(None);
        };

        if entry.is_expired(Instant::now()) {
            self.cache.remove(key).await;
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let entry = LocalEntry {
            data: value.to_string(),
            expires_at: Instant::now() + ttl,
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let removed = self.cache.remove(key).await;
        Ok(removed.is_some_and(|entry| !entry.is_expired(Instant::now())))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let regex = glob_to_regex(pattern)?;
        let keys = self.collect_keys(move |key, _| regex.is_match(key)).await?;

        for key in &keys {
            self.cache.remove(key).await;
        }

        Ok(keys.len())
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count() as usize)
    }
}
