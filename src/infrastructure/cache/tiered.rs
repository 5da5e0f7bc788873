//! Two-tier cache: optional shared remote tier over an authoritative local tier

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::cache::{Cache, CacheInfo, CacheStats};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_cache_hit, record_cache_miss, record_cache_remote_error,
};

use super::in_memory::InMemoryCache;

/// Tiered cache settings
#[derive(Debug, Clone)]
pub struct TieredCacheConfig {
    /// TTL used when a caller does not pass one
    pub default_ttl: Duration,
    /// Minimum spacing between reconnect probes while the remote tier is down
    pub reconnect_interval: Duration,
}

impl Default for TieredCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

impl TieredCacheConfig {
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }
}

/// Availability flag for the remote tier, shared with fire-and-forget writes
#[derive(Debug)]
struct RemoteHealth {
    available: AtomicBool,
    last_probe: Mutex<Option<Instant>>,
}

impl RemoteHealth {
    fn mark_unavailable(&self, operation: &'static str, error: &DomainError) {
        record_cache_remote_error(operation);

        if self.available.swap(false, Ordering::SeqCst) {
            tracing::warn!(operation, error = %error, "Remote cache unavailable, serving from local tier");
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
}

impl Counters {
    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.sets.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
    }
}

/// Which tier produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Remote,
    Local,
}

impl Tier {
    fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// Cache facade used by every other component
///
/// Reads probe the remote tier first (when healthy) and fall through to the
/// local tier. Writes land in the local tier before `set` returns; the remote
/// mirror write is spawned and its failure only flips the availability flag.
#[derive(Debug)]
pub struct TieredCache {
    local: InMemoryCache,
    remote: Option<Arc<dyn Cache>>,
    health: Arc<RemoteHealth>,
    counters: Counters,
    config: TieredCacheConfig,
}

impl TieredCache {
    /// Local-only cache
    pub fn new(local: InMemoryCache, config: TieredCacheConfig) -> Self {
        Self {
            local,
            remote: None,
            health: Arc::new(RemoteHealth {
                available: AtomicBool::new(false),
                last_probe: Mutex::new(None),
            }),
            counters: Counters::default(),
            config,
        }
    }

    /// Adds a remote tier, assumed reachable until an operation says otherwise
    pub fn with_remote(mut self, remote: Arc<dyn Cache>) -> Self {
        self.remote = Some(remote);
        self.health.available.store(true, Ordering::SeqCst);
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn is_remote_available(&self) -> bool {
        self.remote.is_some() && self.health.available.load(Ordering::SeqCst)
    }

    /// Remote tier if it is usable for this operation
    ///
    /// While flagged unavailable a PING probe runs at most once per
    /// reconnect interval; success restores the tier.
    async fn remote(&self) -> Option<&Arc<dyn Cache>> {
        let remote = self.remote.as_ref()?;

        if self.health.available.load(Ordering::SeqCst) {
            return Some(remote);
        }

        {
            let mut last_probe = self.health.last_probe.lock().await;
            let now = Instant::now();

            if last_probe.is_some_and(|at| now.duration_since(at) < self.config.reconnect_interval)
            {
                return None;
            }
            *last_probe = Some(now);
        }

        match remote.ping().await {
            Ok(()) => {
                self.health.available.store(true, Ordering::SeqCst);
                tracing::info!("Remote cache reachable again");
                Some(remote)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Remote cache probe failed");
                None
            }
        }
    }

    async fn read_raw(&self, key: &str) -> Option<(String, Tier)> {
        if let Some(remote) = self.remote().await {
            match remote.get_raw(key).await {
                Ok(Some(data)) => return Some((data, Tier::Remote)),
                Ok(None) => {}
                Err(e) => self.health.mark_unavailable("get", &e),
            }
        }

        match self.local.get_raw(key).await {
            Ok(value) => value.map(|data| (data, Tier::Local)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Local cache read failed");
                None
            }
        }
    }

    /// Reads a value; any failure below this call is reported as a miss
    pub async fn get<V>(&self, key: &str) -> Result<Option<V>, DomainError>
    where
        V: DeserializeOwned,
    {
        let Some((data, tier)) = self.read_raw(key).await else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            record_cache_miss();
            return Ok(None);
        };

        match serde_json::from_str(&data) {
            Ok(value) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                record_cache_hit(tier.as_str());
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!(key, tier = tier.as_str(), error = %e, "Evicting malformed cache entry");
                self.evict(key).await;
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                record_cache_miss();
                Ok(None)
            }
        }
    }

    /// Writes a value with `ttl`, or the default TTL when `None`
    pub async fn set<V>(&self, key: &str, value: &V, ttl: Option<Duration>) -> Result<(), DomainError>
    where
        V: Serialize + ?Sized,
    {
        let data = serde_json::to_string(value)
            .map_err(|e| DomainError::cache(format!("Failed to serialize cache value: {}", e)))?;
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        self.local.set_raw(key, &data, ttl).await?;
        self.counters.sets.fetch_add(1, Ordering::Relaxed);

        if let Some(remote) = self.remote().await {
            let remote = Arc::clone(remote);
            let health = Arc::clone(&self.health);
            let key = key.to_string();

            tokio::spawn(async move {
                if let Err(e) = remote.set_raw(&key, &data, ttl).await {
                    health.mark_unavailable("set", &e);
                }
            });
        }

        Ok(())
    }

    /// Removes a key from both tiers, returning whether either held it
    pub async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let local = self.local.delete(key).await?;

        let remote = match self.remote().await {
            Some(remote) => match remote.delete(key).await {
                Ok(deleted) => deleted,
                Err(e) => {
                    self.health.mark_unavailable("delete", &e);
                    false
                }
            },
            None => false,
        };

        self.counters.deletes.fetch_add(1, Ordering::Relaxed);
        Ok(local || remote)
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.delete(key).await {
            tracing::warn!(key, error = %e, "Failed to evict cache entry");
        }
    }

    /// Removes keys matching a glob from both tiers
    ///
    /// Returns the larger of the two tiers' removal counts.
    pub async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let local = self.local.delete_pattern(pattern).await?;

        let remote = match self.remote().await {
            Some(remote) => match remote.delete_pattern(pattern).await {
                Ok(count) => count,
                Err(e) => {
                    self.health.mark_unavailable("delete_pattern", &e);
                    0
                }
            },
            None => 0,
        };

        let deleted = local.max(remote);
        self.counters
            .deletes
            .fetch_add(deleted as u64, Ordering::Relaxed);

        tracing::info!(pattern, deleted, "Deleted cache entries by pattern");
        Ok(deleted)
    }

    /// Empties both tiers and resets counters
    pub async fn flush(&self) -> Result<(), DomainError> {
        self.local.clear().await?;

        if let Some(remote) = self.remote().await {
            if let Err(e) = remote.clear().await {
                self.health.mark_unavailable("flush", &e);
            }
        }

        self.counters.reset();
        tracing::info!("Cache flushed");
        Ok(())
    }

    /// Returns the cached value or computes, stores and returns it
    pub async fn cached<V, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<V, DomainError>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, DomainError>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok(value);
        }

        let value = compute().await?;
        if let Err(e) = self.set(key, &value, ttl).await {
            tracing::warn!(key, error = %e, "Failed to store computed value");
        }

        Ok(value)
    }

    /// Sweeps expired entries from the local tier
    pub async fn cleanup_expired(&self) -> Result<usize, DomainError> {
        self.local.cleanup_expired().await
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::new(
            self.counters.hits.load(Ordering::Relaxed),
            self.counters.misses.load(Ordering::Relaxed),
            self.counters.sets.load(Ordering::Relaxed),
            self.counters.deletes.load(Ordering::Relaxed),
        )
    }

    pub fn info(&self) -> CacheInfo {
        CacheInfo {
            remote_configured: self.has_remote(),
            remote_available: self.is_remote_available(),
            local_size: self.local.entry_count(),
            stats: self.stats(),
        }
    }
}
