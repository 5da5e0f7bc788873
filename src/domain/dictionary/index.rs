//! In-memory word index

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;

use super::entry::{DictionaryData, DictionaryMetadata, WordDefinition};

/// Sorted index entry used for prefix binary search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndexEntry {
    pub word: String,
    pub lowercased: String,
}

/// Prefix search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordSearchResult {
    pub word: String,
    pub rank: u32,
    pub pos: String,
    pub frequency: u64,
}

/// Index size and file metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryStats {
    pub total_words: usize,
    pub metadata: Option<DictionaryMetadata>,
}

/// Membership test for known words
pub trait Vocabulary: Send + Sync + std::fmt::Debug {
    fn contains(&self, word: &str) -> bool;
}

/// Immutable word index built once from the dictionary
///
/// Holds a case-insensitive lookup map and a lexicographically sorted entry
/// list. A reloaded dictionary produces a new index rather than mutating this one.
#[derive(Debug, Default)]
pub struct WordIndex {
    definitions: HashMap<String, WordDefinition>,
    entries: Vec<SearchIndexEntry>,
    metadata: Option<DictionaryMetadata>,
}

impl WordIndex {
    pub fn from_data(data: DictionaryData) -> Self {
        let metadata = Some(data.metadata);

        // spellings differing only in case collapse to one entry; the
        // bytewise-smallest spelling wins so the outcome is deterministic
        let mut unique: HashMap<String, (String, WordDefinition)> =
            HashMap::with_capacity(data.words.len());
        for (word, definition) in data.words {
            match unique.entry(word.to_lowercase()) {
                Entry::Occupied(mut slot) => {
                    if word < slot.get().0 {
                        slot.insert((word, definition));
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert((word, definition));
                }
            }
        }

        let mut definitions = HashMap::with_capacity(unique.len());
        let mut entries = Vec::with_capacity(unique.len());
        for (lowercased, (word, definition)) in unique {
            definitions.insert(lowercased.clone(), definition);
            entries.push(SearchIndexEntry { word, lowercased });
        }

        entries.sort_by(|a, b| a.lowercased.cmp(&b.lowercased));

        Self {
            definitions,
            entries,
            metadata,
        }
    }

    /// Builds an index from `(word, definition)` pairs
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = (S, WordDefinition)>,
        S: Into<String>,
    {
        let words = words.into_iter().map(|(w, d)| (w.into(), d)).collect();

        let mut index = Self::from_data(DictionaryData {
            metadata: DictionaryMetadata::default(),
            words,
        });
        index.metadata = None;
        index
    }

    /// Case-insensitive definition lookup
    pub fn get(&self, word: &str) -> Option<&WordDefinition> {
        self.definitions.get(&word.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All index entries in sorted order
    pub fn entries(&self) -> &[SearchIndexEntry] {
        &self.entries
    }

    /// Contiguous slice of entries whose lowercased form starts with `prefix`
    ///
    /// `prefix` must already be lowercased.
    pub fn prefix_range(&self, prefix: &str) -> &[SearchIndexEntry] {
        let start = self
            .entries
            .partition_point(|e| e.lowercased.as_str() < prefix);
        let len = self.entries[start..].partition_point(|e| e.lowercased.starts_with(prefix));

        &self.entries[start..start + len]
    }

    /// Prefix search ordered by frequency (most common first)
    pub fn search_prefix(&self, query: &str, max_results: usize) -> Vec<WordSearchResult> {
        let normalized = query.trim().to_lowercase();

        if normalized.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<WordSearchResult> = self
            .prefix_range(&normalized)
            .iter()
            .take(max_results)
            .filter_map(|entry| {
                self.definitions
                    .get(&entry.lowercased)
                    .map(|def| WordSearchResult {
                        word: entry.word.clone(),
                        rank: def.rank,
                        pos: def.pos.clone(),
                        frequency: def.frequency,
                    })
            })
            .collect();

        results.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        results
    }

    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            total_words: self.len(),
            metadata: self.metadata.clone(),
        }
    }
}

impl Vocabulary for WordIndex {
    fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }
}
