//! Coalescing request batcher
//!
//! Concurrent `get` calls for different keys that arrive within one window
//! are merged into a single upstream bulk call. Each caller is resolved from
//! the bulk result map independently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{oneshot, Mutex};

use crate::domain::batch::{BatcherConfig, BatcherStats, BulkFetcher};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_batch_dispatch, record_upstream_retry};

type Reply<T> = oneshot::Sender<Result<Option<T>, DomainError>>;

/// Keys collected in the currently open window
struct Window<T> {
    /// Bumped every time a window is dispatched; stale timers compare against it
    generation: u64,
    /// Distinct keys in arrival order
    keys: Vec<String>,
    waiters: HashMap<String, Vec<Reply<T>>>,
}

impl<T> Window<T> {
    fn new() -> Self {
        Self {
            generation: 0,
            keys: Vec::new(),
            waiters: HashMap::new(),
        }
    }

    fn take(&mut self) -> Batch<T> {
        self.generation += 1;

        Batch {
            keys: std::mem::take(&mut self.keys),
            waiters: std::mem::take(&mut self.waiters),
        }
    }
}

/// A dispatched window
struct Batch<T> {
    keys: Vec<String>,
    waiters: HashMap<String, Vec<Reply<T>>>,
}

#[derive(Debug, Default)]
struct Counters {
    batches: AtomicU64,
    keys_requested: AtomicU64,
    retries: AtomicU64,
    failed: AtomicU64,
}

struct Inner<T> {
    fetcher: Arc<dyn BulkFetcher<T>>,
    config: BatcherConfig,
    window: Mutex<Window<T>>,
    counters: Counters,
}

/// Generic coalescing layer in front of a [`BulkFetcher`]
///
/// Cloning is cheap and every clone shares the same window.
pub struct RequestBatcher<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for RequestBatcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for RequestBatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBatcher")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<T> RequestBatcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(fetcher: Arc<dyn BulkFetcher<T>>, config: BatcherConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                config,
                window: Mutex::new(Window::new()),
                counters: Counters::default(),
            }),
        }
    }

    pub fn config(&self) -> &BatcherConfig {
        &self.inner.config
    }

    /// Resolves one key; `Ok(None)` when the upstream has no value for it
    ///
    /// Dropping the returned future abandons the caller without cancelling
    /// the batch other callers are waiting on.
    pub async fn get(&self, key: &str) -> Result<Option<T>, DomainError> {
        let (reply, receiver) = oneshot::channel();

        let ready = {
            let mut window = self.inner.window.lock().await;
            let opens_window = window.keys.is_empty();

            match window.waiters.get_mut(key) {
                Some(waiting) => waiting.push(reply),
                None => {
                    window.keys.push(key.to_string());
                    window.waiters.insert(key.to_string(), vec![reply]);
                }
            }
            self.inner.counters.keys_requested.fetch_add(1, Ordering::Relaxed);

            if window.keys.len() >= self.inner.config.max_batch_size {
                Some(window.take())
            } else {
                if opens_window {
                    self.schedule(window.generation);
                }
                None
            }
        };

        if let Some(batch) = ready {
            tokio::spawn(Self::execute(Arc::clone(&self.inner), batch));
        }

        receiver
            .await
            .map_err(|_| DomainError::internal("Batch was dropped before completing"))?
    }

    /// Like [`get`](Self::get) but treats absence as [`DomainError::MissingKey`]
    pub async fn get_required(&self, key: &str) -> Result<T, DomainError> {
        self.get(key)
            .await?
            .ok_or_else(|| DomainError::missing_key(key))
    }

    /// Resolves several keys through the same window; absent keys are omitted
    pub async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, T>, DomainError> {
        let results = join_all(keys.iter().map(|key| self.get(key))).await;

        let mut found = HashMap::with_capacity(keys.len());
        for (key, result) in keys.iter().zip(results) {
            if let Some(value) = result? {
                found.insert(key.clone(), value);
            }
        }

        Ok(found)
    }

    /// Dispatches the open window immediately and waits for it to finish
    pub async fn flush(&self) {
        let batch = {
            let mut window = self.inner.window.lock().await;
            if window.keys.is_empty() {
                return;
            }
            window.take()
        };

        Self::execute(Arc::clone(&self.inner), batch).await;
    }

    pub async fn stats(&self) -> BatcherStats {
        let pending_keys = self.inner.window.lock().await.keys.len();
        let counters = &self.inner.counters;

        BatcherStats {
            pending_keys,
            has_pending_batch: pending_keys > 0,
            batches_dispatched: counters.batches.load(Ordering::Relaxed),
            keys_requested: counters.keys_requested.load(Ordering::Relaxed),
            retries: counters.retries.load(Ordering::Relaxed),
            failed_batches: counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Closes the window `generation` after the batch delay unless it was
    /// already dispatched by size or flush
    fn schedule(&self, generation: u64) {
        let inner = Arc::clone(&self.inner);
        let delay = inner.config.batch_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let batch = {
                let mut window = inner.window.lock().await;
                if window.generation != generation || window.keys.is_empty() {
                    return;
                }
                window.take()
            };

            Self::execute(inner, batch).await;
        });
    }

    async fn execute(inner: Arc<Inner<T>>, batch: Batch<T>) {
        let policy = &inner.config.retry;
        let attempts = policy.attempts();
        let size = batch.keys.len();

        inner.counters.batches.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(keys = size, "Dispatching batch");

        let mut last_error = DomainError::upstream("Batch was never attempted");

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = policy.delay_for_retry(attempt - 1);
                inner.counters.retries.fetch_add(1, Ordering::Relaxed);
                record_upstream_retry();

                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "Retrying upstream batch"
                );
                tokio::time::sleep(delay).await;
            }

            match inner.fetcher.fetch_many(&batch.keys).await {
                Ok(mut values) => {
                    record_batch_dispatch(size, attempt + 1, true);

                    for (key, waiting) in batch.waiters {
                        let value = values.remove(&key);
                        for reply in waiting {
                            // receiver gone means the caller was abandoned
                            let _ = reply.send(Ok(value.clone()));
                        }
                    }
                    return;
                }
                Err(e) => last_error = e,
            }
        }

        inner.counters.failed.fetch_add(1, Ordering::Relaxed);
        record_batch_dispatch(size, attempts, false);
        tracing::error!(keys = size, attempts, error = %last_error, "Upstream batch failed");

        for reply in batch.waiters.into_values().flatten() {
            let _ = reply.send(Err(last_error.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::domain::batch::{MockBulkFetcher, RetryPolicy};

    /// Records every bulk call and fails the first `failures` of them
    #[derive(Default)]
    struct RecordingFetcher {
        calls: StdMutex<Vec<Vec<String>>>,
        failures: AtomicU64,
    }

    impl RecordingFetcher {
        fn failing_first(failures: u64) -> Self {
            Self {
                failures: AtomicU64::new(failures),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BulkFetcher<String> for RecordingFetcher {
        async fn fetch_many(&self, keys: &[String]) -> Result<HashMap<String, String>, DomainError> {
            self.calls.lock().unwrap().push(keys.to_vec());

            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(DomainError::upstream("temporarily unavailable"));
            }

            Ok(keys
                .iter()
                .filter(|k| !k.starts_with("missing"))
                .map(|k| (k.clone(), k.to_uppercase()))
                .collect())
        }
    }

    fn batcher(fetcher: Arc<RecordingFetcher>, config: BatcherConfig) -> RequestBatcher<String> {
        RequestBatcher::new(fetcher, config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_window_requests_share_one_call() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let batcher = batcher(fetcher.clone(), BatcherConfig::default());

        let (a, b, c) = tokio::join!(batcher.get("a"), batcher.get("b"), batcher.get("c"));

        assert_eq!(a.unwrap().as_deref(), Some("A"));
        assert_eq!(b.unwrap().as_deref(), Some("B"));
        assert_eq!(c.unwrap().as_deref(), Some("C"));
        assert_eq!(fetcher.calls(), vec![vec!["a", "b", "c"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_waits_for_window_to_close() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let batcher = batcher(fetcher.clone(), BatcherConfig::default());

        let mut pending = tokio_test::task::spawn(batcher.get("a"));
        tokio_test::assert_pending!(pending.poll());
        assert!(fetcher.calls().is_empty());

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(pending.is_woken());
        let value = tokio_test::assert_ready_ok!(pending.poll());
        assert_eq!(value.as_deref(), Some("A"));
        assert_eq!(fetcher.calls(), vec![vec!["a"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_after_dispatch_open_new_window() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let batcher = batcher(fetcher.clone(), BatcherConfig::default());

        batcher.get("a").await.unwrap();
        batcher.get("b").await.unwrap();

        assert_eq!(fetcher.calls(), vec![vec!["a"], vec!["b"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_batch_size_dispatches_early() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let config = BatcherConfig::default()
            .with_max_batch_size(2)
            .with_batch_delay(Duration::from_secs(60));
        let batcher = batcher(fetcher.clone(), config);

        let started = tokio::time::Instant::now();
        let (a, b) = tokio::join!(batcher.get("a"), batcher.get("b"));

        assert!(a.is_ok() && b.is_ok());
        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(fetcher.calls(), vec![vec!["a", "b"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_keys_share_slot() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let batcher = batcher(fetcher.clone(), BatcherConfig::default());

        let (first, second) = tokio::join!(batcher.get("a"), batcher.get("a"));

        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(fetcher.calls(), vec![vec!["a"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_key_is_absence_not_error() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let batcher = batcher(fetcher.clone(), BatcherConfig::default());

        let (found, missing) = tokio::join!(batcher.get("a"), batcher.get("missing-x"));

        assert_eq!(found.unwrap().as_deref(), Some("A"));
        assert_eq!(missing.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_required_maps_absence() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let batcher = batcher(fetcher, BatcherConfig::default());

        let err = batcher.get_required("missing-y").await.unwrap_err();
        assert_eq!(err, DomainError::missing_key("missing-y"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_then_success_resolves_all_callers() {
        let fetcher = Arc::new(RecordingFetcher::failing_first(2));
        let batcher = batcher(fetcher.clone(), BatcherConfig::default());

        let (a, b) = tokio::join!(batcher.get("a"), batcher.get("b"));

        assert_eq!(a.unwrap().as_deref(), Some("A"));
        assert_eq!(b.unwrap().as_deref(), Some("B"));
        assert_eq!(fetcher.calls().len(), 3);

        let stats = batcher.stats().await;
        assert_eq!(stats.retries, 2);
        assert_eq!(stats.failed_batches, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_reject_every_caller() {
        let fetcher = Arc::new(RecordingFetcher::failing_first(10));
        let config = BatcherConfig::default().with_retry(RetryPolicy::new(3));
        let batcher = batcher(fetcher.clone(), config);

        let (a, b) = tokio::join!(batcher.get("a"), batcher.get("b"));

        let expected = DomainError::upstream("temporarily unavailable");
        assert_eq!(a.unwrap_err(), expected);
        assert_eq!(b.unwrap_err(), expected);
        assert_eq!(fetcher.calls().len(), 3);
        assert_eq!(batcher.stats().await.failed_batches, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_many_skips_absent_keys() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let batcher = batcher(fetcher.clone(), BatcherConfig::default());

        let keys = vec!["a".to_string(), "missing-1".to_string(), "b".to_string()];
        let values = batcher.get_many(&keys).await.unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values["b"], "B");
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_dispatches_pending_window() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let config = BatcherConfig::default().with_batch_delay(Duration::from_secs(3600));
        let batcher = batcher(fetcher.clone(), config);

        let pending = tokio::spawn({
            let batcher = batcher.clone();
            async move { batcher.get("a").await }
        });
        tokio::task::yield_now().await;

        let stats = batcher.stats().await;
        assert!(stats.has_pending_batch);
        assert_eq!(stats.pending_keys, 1);

        batcher.flush().await;
        assert_eq!(pending.await.unwrap().unwrap().as_deref(), Some("A"));
        assert!(!batcher.stats().await.has_pending_batch);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_caller_does_not_cancel_batch() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let batcher = batcher(fetcher.clone(), BatcherConfig::default());

        let abandoned = tokio::spawn({
            let batcher = batcher.clone();
            async move { batcher.get("a").await }
        });
        tokio::task::yield_now().await;
        abandoned.abort();

        assert_eq!(batcher.get("b").await.unwrap().as_deref(), Some("B"));
        assert_eq!(fetcher.calls(), vec![vec!["a", "b"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_fetcher_receives_keys() {
        let mut mock = MockBulkFetcher::<u32>::new();
        mock.expect_fetch_many()
            .withf(|keys| keys == ["x".to_string(), "y".to_string()])
            .times(1)
            .returning(|_| Ok(HashMap::from([("x".to_string(), 1)])));

        let batcher = RequestBatcher::new(Arc::new(mock), BatcherConfig::default());
        let (x, y) = tokio::join!(batcher.get("x"), batcher.get("y"));

        assert_eq!(x.unwrap(), Some(1));
        assert_eq!(y.unwrap(), None);
    }
}
