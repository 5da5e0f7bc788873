//! Bulk fetcher that resolves from the loaded word index

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::batch::BulkFetcher;
use crate::domain::dictionary::{WordDefinition, WordIndex};
use crate::domain::DomainError;

/// Used when no upstream URL is configured
#[derive(Debug, Clone)]
pub struct IndexBulkFetcher {
    index: Arc<WordIndex>,
}

impl IndexBulkFetcher {
    pub fn new(index: Arc<WordIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl BulkFetcher<WordDefinition> for IndexBulkFetcher {
    async fn fetch_many(
        &self,
        keys: &[String],
    ) -> Result<HashMap<String, WordDefinition>, DomainError> {
        Ok(keys
            .iter()
            .filter_map(|key| self.index.get(key).map(|def| (key.clone(), def.clone())))
            .collect())
    }
}
