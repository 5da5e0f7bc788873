//! Prefetch state persistence trait

use async_trait::async_trait;

use super::entity::PrefetchSnapshot;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Durable storage for learned prefetch state
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PrefetchStore: Send + Sync + std::fmt::Debug {
    /// Loads the last saved snapshot, if any
    async fn load(&self) -> Result<Option<PrefetchSnapshot>, DomainError>;

    /// Replaces the saved snapshot
    async fn save(&self, snapshot: &PrefetchSnapshot) -> Result<(), DomainError>;

    /// Removes any saved snapshot
    async fn clear(&self) -> Result<(), DomainError>;
}

/// Store that keeps nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPrefetchStore;

#[async_trait]
impl PrefetchStore for NoopPrefetchStore {
    async fn load(&self) -> Result<Option<PrefetchSnapshot>, DomainError> {
        Ok(None)
    }

    async fn save(&self, _snapshot: &PrefetchSnapshot) -> Result<(), DomainError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
