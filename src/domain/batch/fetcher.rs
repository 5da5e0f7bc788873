//! Upstream bulk-fetch trait

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Resolves many keys in one upstream call
///
/// Keys the upstream cannot resolve are absent from the returned map. An
/// `Err` means the whole call failed and is eligible for retry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BulkFetcher<T: Send + Sync + 'static>: Send + Sync {
    async fn fetch_many(&self, keys: &[String]) -> Result<HashMap<String, T>, DomainError>;
}
