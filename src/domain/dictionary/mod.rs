//! Dictionary domain - Static word index shared by lookup, search and prefetch

mod entry;
mod index;

pub use entry::{DictionaryData, DictionaryMetadata, WordDefinition};
pub use index::{DictionaryStats, SearchIndexEntry, Vocabulary, WordIndex, WordSearchResult};
