//! Prefetch delivery trait

use async_trait::async_trait;

use super::entity::PrefetchCommand;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Receives batches of words to fetch in the background
///
/// The engine only decides what to fetch; implementations perform the fetch.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PrefetchSink: Send + Sync {
    async fn deliver(&self, command: PrefetchCommand) -> Result<(), DomainError>;
}
