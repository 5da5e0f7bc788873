//! Prefetch delivery targets

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::prefetch::{PrefetchCommand, PrefetchSink};
use crate::domain::DomainError;
use crate::infrastructure::services::LookupService;

/// Fetches prefetched words through the batcher into the cache
#[derive(Debug, Clone)]
pub struct CacheWarmingSink {
    lookup: Arc<LookupService>,
}

impl CacheWarmingSink {
    pub fn new(lookup: Arc<LookupService>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl PrefetchSink for CacheWarmingSink {
    async fn deliver(&self, command: PrefetchCommand) -> Result<(), DomainError> {
        let warmed = self.lookup.warm(&command.words).await?;
        tracing::debug!(requested = command.words.len(), warmed, "Cache warmed");
        Ok(())
    }
}

/// Forwards commands to a host task over a bounded channel
#[derive(Debug, Clone)]
pub struct ChannelPrefetchSink {
    sender: mpsc::Sender<PrefetchCommand>,
}

impl ChannelPrefetchSink {
    pub fn new(sender: mpsc::Sender<PrefetchCommand>) -> Self {
        Self { sender }
    }

    /// Sink plus the receiving end for the host
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PrefetchCommand>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl PrefetchSink for ChannelPrefetchSink {
    async fn deliver(&self, command: PrefetchCommand) -> Result<(), DomainError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| DomainError::internal("Prefetch receiver closed"))
    }
}
