//! Prefetch engine paired with its persistence

use std::sync::Arc;

use crate::domain::prefetch::{
    PrefetchEngine, PrefetchStatistics, PrefetchStore, RelatedWordsHint, TrackOutcome,
};
use crate::domain::DomainError;

/// Keeps the saved snapshot in step with the engine
#[derive(Debug, Clone)]
pub struct PrefetchService {
    engine: Arc<PrefetchEngine>,
    store: Arc<dyn PrefetchStore>,
}

impl PrefetchService {
    pub fn new(engine: Arc<PrefetchEngine>, store: Arc<dyn PrefetchStore>) -> Self {
        Self { engine, store }
    }

    pub fn engine(&self) -> &Arc<PrefetchEngine> {
        &self.engine
    }

    /// Loads persisted state into the engine; returns whether any was found
    pub async fn restore(&self) -> Result<bool, DomainError> {
        match self.store.load().await? {
            Some(snapshot) => {
                let relationships = snapshot.relationships.len();
                self.engine.restore(snapshot).await;
                tracing::info!(relationships, "Restored prefetch state");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Tracks a lookup and persists the updated state
    ///
    /// A persistence failure is logged; learning continues in memory.
    pub async fn track(&self, word: &str, hint: &RelatedWordsHint) -> TrackOutcome {
        let outcome = self.engine.track_lookup(word, hint).await;

        if outcome.dropped > 0 {
            tracing::debug!(word, dropped = outcome.dropped, "Prefetch queue full");
        }

        let snapshot = self.engine.snapshot().await;
        if let Err(e) = self.store.save(&snapshot).await {
            tracing::warn!(error = %e, "Failed to persist prefetch state");
        }

        outcome
    }

    /// Clears learned state in memory and on disk
    pub async fn reset(&self) -> Result<(), DomainError> {
        self.engine.reset().await;
        self.store.clear().await?;
        tracing::info!("Prefetch state reset");
        Ok(())
    }

    pub async fn statistics(&self) -> PrefetchStatistics {
        self.engine.statistics().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dictionary::WordIndex;
    use crate::domain::prefetch::{MockPrefetchStore, NoopPrefetchStore, PrefetchConfig, PrefetchSnapshot};

    /// Engine that only knows explicit relationships
    fn engine() -> Arc<PrefetchEngine> {
        Arc::new(
            PrefetchEngine::new(PrefetchConfig::default())
                .with_vocabulary(Arc::new(WordIndex::default())),
        )
    }

    fn hint() -> RelatedWordsHint {
        RelatedWordsHint {
            synonyms: vec!["joyful".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_track_saves_snapshot() {
        let mut store = MockPrefetchStore::new();
        store
            .expect_save()
            .withf(|snapshot| snapshot.patterns.len() == 1)
            .times(1)
            .returning(|_| Ok(()));

        let service = PrefetchService::new(
            engine(),
            Arc::new(store),
        );

        let outcome = service.track("happy", &hint()).await;
        assert_eq!(outcome.queued, 1);
    }

    #[tokio::test]
    async fn test_save_failure_does_not_lose_learning() {
        let mut store = MockPrefetchStore::new();
        store
            .expect_save()
            .returning(|_| Err(DomainError::storage("disk full")));

        let service = PrefetchService::new(
            engine(),
            Arc::new(store),
        );

        service.track("happy", &hint()).await;
        assert_eq!(service.statistics().await.prefetch_queue_size, 1);
    }

    #[tokio::test]
    async fn test_restore_loads_snapshot() {
        let source_engine = engine();
        let source = PrefetchService::new(Arc::clone(&source_engine), Arc::new(NoopPrefetchStore));
        source.track("happy", &hint()).await;
        let snapshot = source_engine.snapshot().await;

        let mut store = MockPrefetchStore::new();
        store
            .expect_load()
            .times(1)
            .returning(move || Ok(Some(snapshot.clone())));

        let restored = PrefetchService::new(
            engine(),
            Arc::new(store),
        );
        assert_eq!(restored.statistics().await.patterns_tracked, 0);

        assert!(restored.restore().await.unwrap());
        assert_eq!(restored.statistics().await.patterns_tracked, 1);
        assert_eq!(source.statistics().await.patterns_tracked, 1);
    }

    #[tokio::test]
    async fn test_restore_without_state() {
        let mut store = MockPrefetchStore::new();
        store.expect_load().returning(|| Ok(None::<PrefetchSnapshot>));

        let service = PrefetchService::new(
            engine(),
            Arc::new(store),
        );

        assert!(!service.restore().await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_clears_store() {
        let mut store = MockPrefetchStore::new();
        store.expect_save().returning(|_| Ok(()));
        store.expect_clear().times(1).returning(|| Ok(()));

        let service = PrefetchService::new(
            engine(),
            Arc::new(store),
        );

        service.track("happy", &hint()).await;
        service.reset().await.unwrap();

        assert_eq!(service.statistics().await, PrefetchStatistics::default());
    }
}
