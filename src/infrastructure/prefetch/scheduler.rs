//! Background dispatch of queued prefetch words

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::prefetch::{PrefetchCommand, PrefetchEngine, PrefetchSink, Priority};
use crate::infrastructure::observability::record_prefetch_dispatch;

/// Periodically drains the engine queue into a sink
pub struct PrefetchScheduler {
    engine: Arc<PrefetchEngine>,
    sink: Arc<dyn PrefetchSink>,
    interval: Duration,
    batch_size: usize,
    priority: Priority,
}

impl std::fmt::Debug for PrefetchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchScheduler")
            .field("interval", &self.interval)
            .field("batch_size", &self.batch_size)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl PrefetchScheduler {
    pub fn new(engine: Arc<PrefetchEngine>, sink: Arc<dyn PrefetchSink>) -> Self {
        Self {
            engine,
            sink,
            interval: Duration::from_millis(500),
            batch_size: 3,
            priority: Priority::default(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Dispatches one batch; returns the number of words delivered
    pub async fn tick(&self) -> usize {
        let words = self.engine.next_batch(self.batch_size).await;
        if words.is_empty() {
            return 0;
        }

        let command = PrefetchCommand {
            words: words.clone(),
            priority: self.priority,
        };

        match self.sink.deliver(command).await {
            Ok(()) => {
                for word in &words {
                    self.engine.mark_completed(word).await;
                }
                record_prefetch_dispatch(words.len(), true);
                tracing::debug!(words = ?words, priority = %self.priority, "Prefetch dispatched");
                words.len()
            }
            Err(e) => {
                self.engine.release(&words).await;
                record_prefetch_dispatch(words.len(), false);
                tracing::warn!(words = words.len(), error = %e, "Prefetch delivery failed");
                0
            }
        }
    }

    /// Runs until `shutdown` turns true or its sender is dropped
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                interval_ms = self.interval.as_millis() as u64,
                batch_size = self.batch_size,
                "Prefetch scheduler started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Prefetch scheduler stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dictionary::{WordDefinition, WordIndex};
    use crate::domain::prefetch::{MockPrefetchSink, PrefetchConfig, RelatedWordsHint};
    use crate::domain::DomainError;

    /// Queue holds exactly "joyful" and "glad"
    async fn engine_with_queue() -> Arc<PrefetchEngine> {
        let vocabulary = WordIndex::from_words([
            ("joyful", WordDefinition::new(1, "adjective", 10)),
            ("glad", WordDefinition::new(2, "adjective", 10)),
        ]);
        let engine = Arc::new(
            PrefetchEngine::new(PrefetchConfig::default()).with_vocabulary(Arc::new(vocabulary)),
        );
        let hint = RelatedWordsHint {
            synonyms: vec!["joyful".to_string(), "glad".to_string()],
            ..Default::default()
        };
        engine.track_lookup("happy", &hint).await;
        engine
    }

    #[tokio::test]
    async fn test_tick_marks_delivered_words_completed() {
        let engine = engine_with_queue().await;

        let mut sink = MockPrefetchSink::new();
        sink.expect_deliver()
            .withf(|command| command.words.len() == 2 && command.priority == Priority::High)
            .times(1)
            .returning(|_| Ok(()));

        let scheduler = PrefetchScheduler::new(Arc::clone(&engine), Arc::new(sink))
            .with_priority(Priority::High);

        assert_eq!(scheduler.tick().await, 2);

        let stats = engine.statistics().await;
        assert_eq!(stats.prefetch_queue_size, 0);
        assert_eq!(stats.in_flight, 0);
        assert_eq!(stats.total_completed, 2);
    }

    #[tokio::test]
    async fn test_failed_delivery_releases_words() {
        let engine = engine_with_queue().await;

        let mut sink = MockPrefetchSink::new();
        sink.expect_deliver()
            .times(2)
            .returning(|_| Err(DomainError::upstream("offline")));

        let scheduler = PrefetchScheduler::new(Arc::clone(&engine), Arc::new(sink));

        assert_eq!(scheduler.tick().await, 0);
        let stats = engine.statistics().await;
        assert_eq!(stats.prefetch_queue_size, 2);
        assert_eq!(stats.in_flight, 0);

        // released words are offered again
        assert_eq!(scheduler.tick().await, 0);
    }

    #[tokio::test]
    async fn test_empty_queue_skips_sink() {
        let engine = Arc::new(PrefetchEngine::new(PrefetchConfig::default()));
        let mut sink = MockPrefetchSink::new();
        sink.expect_deliver().never();

        let scheduler = PrefetchScheduler::new(engine, Arc::new(sink));
        assert_eq!(scheduler.tick().await, 0);
    }

    #[tokio::test]
    async fn test_batch_size_limits_words() {
        let engine = engine_with_queue().await;

        let mut sink = MockPrefetchSink::new();
        sink.expect_deliver()
            .withf(|command| command.words.len() == 1)
            .times(2)
            .returning(|_| Ok(()));

        let scheduler =
            PrefetchScheduler::new(Arc::clone(&engine), Arc::new(sink)).with_batch_size(1);

        assert_eq!(scheduler.tick().await, 1);
        assert_eq!(scheduler.tick().await, 1);
        assert_eq!(scheduler.tick().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_scheduler_stops_on_shutdown() {
        let engine = engine_with_queue().await;

        let mut sink = MockPrefetchSink::new();
        sink.expect_deliver().returning(|_| Ok(()));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = PrefetchScheduler::new(Arc::clone(&engine), Arc::new(sink))
            .with_interval(Duration::from_millis(100))
            .spawn(shutdown_rx);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(engine.statistics().await.prefetch_queue_size, 0);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
