//! Lightning Lookup
//!
//! Dictionary lookups served through:
//! - A two-tier cache (in-process + optional Redis) that degrades to local-only
//! - Prefix and fuzzy search ranking
//! - Predictive prefetching of likely next lookups
//! - Request coalescing in front of the upstream definition source

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use api::state::AppState;
use domain::batch::BulkFetcher;
use domain::prefetch::{NoopPrefetchStore, PrefetchEngine, PrefetchStore};
use domain::{DomainError, SearchRanker, WordDefinition, WordIndex};
use infrastructure::batch::RequestBatcher;
use infrastructure::cache::{spawn_cache_maintenance, CacheFactory};
use infrastructure::prefetch::{
    CacheWarmingSink, FilePrefetchStore, PrefetchScheduler, PrefetchService,
};
use infrastructure::services::{LookupService, SearchService};
use infrastructure::upstream::{HttpBulkFetcher, IndexBulkFetcher};

/// Builds every service over a loaded dictionary
pub async fn create_app_state(
    config: &AppConfig,
    index: Arc<WordIndex>,
) -> Result<AppState, DomainError> {
    let cache = Arc::new(CacheFactory::create(&config.cache.cache_config())?);

    let fetcher: Arc<dyn BulkFetcher<WordDefinition>> =
        match config.batcher.upstream_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => {
                info!(url, "Using HTTP upstream for definitions");
                Arc::new(HttpBulkFetcher::new(url, config.batcher.upstream_timeout())?)
            }
            None => {
                info!("Resolving definitions from the loaded dictionary");
                Arc::new(IndexBulkFetcher::new(Arc::clone(&index)))
            }
        };
    let batcher = RequestBatcher::new(fetcher, config.batcher.batcher_config());

    let mut lookup = LookupService::new(Arc::clone(&cache), batcher);

    let prefetch = if config.prefetch.enabled {
        let prefetch = Arc::new(create_prefetch_service(config, Arc::clone(&index)).await);
        lookup = lookup.with_prefetch(Arc::clone(&prefetch));
        Some(prefetch)
    } else {
        info!("Prefetching disabled");
        None
    };

    let ranker = Arc::new(SearchRanker::new(index));
    let search = SearchService::new(ranker, config.dictionary.search_config());

    let state = AppState::new(Arc::new(lookup), Arc::new(search));
    Ok(match prefetch {
        Some(prefetch) => state.with_prefetch(prefetch),
        None => state,
    })
}

async fn create_prefetch_service(config: &AppConfig, index: Arc<WordIndex>) -> PrefetchService {
    let engine = PrefetchEngine::new(config.prefetch.prefetch_config()).with_vocabulary(index);

    let store: Arc<dyn PrefetchStore> = match &config.prefetch.state_path {
        Some(path) => Arc::new(FilePrefetchStore::new(path.clone())),
        None => Arc::new(NoopPrefetchStore),
    };

    let service = PrefetchService::new(Arc::new(engine), store);

    // Learned state is an optimisation; start fresh when it cannot be read
    if let Err(e) = service.restore().await {
        warn!(error = %e, "Ignoring unreadable prefetch state");
    }

    service
}

/// Starts cache maintenance and prefetch dispatch; both stop when `shutdown` flips
pub fn spawn_background_tasks(
    state: &AppState,
    config: &AppConfig,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let mut tasks = vec![spawn_cache_maintenance(
        Arc::clone(state.cache()),
        config.cache.cleanup_interval(),
        shutdown.clone(),
    )];

    if let Some(prefetch) = &state.prefetch {
        let sink = Arc::new(CacheWarmingSink::new(Arc::clone(&state.lookup)));
        let scheduler = PrefetchScheduler::new(Arc::clone(prefetch.engine()), sink)
            .with_interval(config.prefetch.dispatch_interval())
            .with_batch_size(config.prefetch.batch_size)
            .with_priority(config.prefetch.priority);

        tasks.push(scheduler.spawn(shutdown));
    }

    tasks
}
