//! Predictive prefetching of likely next lookups

mod analysis;
mod engine;
mod entity;
mod sink;
mod store;

pub use analysis::{content_words, morphological_variants, related_words};
pub use engine::{PrefetchConfig, PrefetchEngine, TrackOutcome};
pub use entity::{
    LookupEvent, PrefetchCommand, PrefetchSnapshot, PrefetchStatistics, Priority,
    RelatedWordsHint, RelationshipKind, SequenceLink, WordCategory, WordRelationship,
};
pub use sink::PrefetchSink;
pub use store::{NoopPrefetchStore, PrefetchStore};

#[cfg(test)]
pub use sink::MockPrefetchSink;
#[cfg(test)]
pub use store::MockPrefetchStore;
