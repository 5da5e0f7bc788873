//! Periodic sweep of expired local entries

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::tiered::TieredCache;

/// Runs [`TieredCache::cleanup_expired`] every `interval` until shutdown
pub fn spawn_cache_maintenance(
    cache: Arc<TieredCache>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match cache.cleanup_expired().await {
                        Ok(0) => {}
                        Ok(removed) => tracing::debug!(removed, "Expired cache entries swept"),
                        Err(e) => tracing::warn!(error = %e, "Cache sweep failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
