//! Domain layer - Core lookup entities, algorithms and contracts

pub mod batch;
pub mod cache;
pub mod dictionary;
pub mod error;
pub mod prefetch;
pub mod search;

pub use batch::{BatcherConfig, BatcherStats, BulkFetcher, RetryPolicy};
pub use cache::{Cache, CacheExt, CacheInfo, CacheStats};
pub use dictionary::{DictionaryData, DictionaryStats, Vocabulary, WordDefinition, WordIndex};
pub use error::DomainError;
pub use prefetch::{
    PrefetchCommand, PrefetchConfig, PrefetchEngine, PrefetchSink, PrefetchStatistics,
    PrefetchStore, Priority, RelatedWordsHint,
};
pub use search::{SearchRanker, Suggestion};
