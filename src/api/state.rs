//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::cache::TieredCache;
use crate::infrastructure::prefetch::PrefetchService;
use crate::infrastructure::services::{LookupService, SearchService};

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub lookup: Arc<LookupService>,
    pub search: Arc<SearchService>,
    /// `None` when prefetching is disabled
    pub prefetch: Option<Arc<PrefetchService>>,
}

impl AppState {
    pub fn new(lookup: Arc<LookupService>, search: Arc<SearchService>) -> Self {
        Self {
            lookup,
            search,
            prefetch: None,
        }
    }

    pub fn with_prefetch(mut self, prefetch: Arc<PrefetchService>) -> Self {
        self.prefetch = Some(prefetch);
        self
    }

    pub fn cache(&self) -> &Arc<TieredCache> {
        self.lookup.cache()
    }
}
