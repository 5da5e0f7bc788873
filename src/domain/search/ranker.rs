//! Prefix and fuzzy suggestion ranking

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use super::distance::{jaro_winkler, levenshtein};
use super::stop_words::is_common_word;
use crate::domain::dictionary::{SearchIndexEntry, WordIndex};

const EXACT_RELEVANCE: f64 = 1.0;
const PREFIX_BASE: f64 = 0.9;
const PREFIX_FLOOR: f64 = 0.5;
const PREFIX_STEP: f64 = 0.01;
const FUZZY_MIN: f64 = 0.3;
const FUZZY_MAX: f64 = 0.7;
const COMMON_WORD_BONUS: f64 = 0.1;
const EDIT_PENALTY: f64 = 0.1;
const MAX_FUZZY_DISTANCE: usize = 3;

/// A ranked search suggestion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub word: String,
    pub relevance: f64,
    pub is_exact_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
}

/// Lightweight prefix-only suggestion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteSuggestion {
    pub word: String,
    pub is_exact_match: bool,
}

/// Ranks words from a shared, immutable index
///
/// Exact matches always score 1.0, prefix matches score in `[0.5, 0.9]` and
/// fuzzy matches score in `[0.3, 0.7]`, kept strictly below the weakest
/// exact/prefix result in the same response.
#[derive(Debug, Clone)]
pub struct SearchRanker {
    index: Arc<WordIndex>,
}

impl SearchRanker {
    pub fn new(index: Arc<WordIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<WordIndex> {
        &self.index
    }

    /// Exact and prefix matches first; falls back to fuzzy matching when
    /// they do not fill `limit`
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let query_len = query.chars().count();

        let mut matches: Vec<Suggestion> = self
            .index
            .prefix_range(&query)
            .iter()
            .map(|entry| {
                if entry.lowercased == query {
                    self.suggestion(entry, EXACT_RELEVANCE, true)
                } else {
                    let extra = entry.lowercased.chars().count() - query_len;
                    let relevance = (PREFIX_BASE - PREFIX_STEP * extra as f64).max(PREFIX_FLOOR);
                    self.suggestion(entry, relevance, false)
                }
            })
            .collect();

        matches.sort_by(by_relevance_then_word);
        matches.truncate(limit);

        if matches.len() >= limit {
            return matches;
        }

        let ceiling = matches
            .last()
            .map_or(FUZZY_MAX, |weakest| (weakest.relevance - PREFIX_STEP).min(FUZZY_MAX))
            .max(FUZZY_MIN);

        let remaining = limit - matches.len();
        let fuzzy = self.fuzzy_matches(&query, query_len, remaining);

        matches.extend(fuzzy.into_iter().map(|(entry, score)| {
            self.suggestion(entry, score.clamp(FUZZY_MIN, ceiling), false)
        }));

        matches
    }

    /// Edit-distance tolerant matches ordered by score, best first
    fn fuzzy_matches(
        &self,
        query: &str,
        query_len: usize,
        limit: usize,
    ) -> Vec<(&SearchIndexEntry, f64)> {
        let max_distance = MAX_FUZZY_DISTANCE.min(query_len / 3 + 1);

        let mut scored: Vec<(&SearchIndexEntry, f64)> = self
            .index
            .entries()
            .iter()
            .filter(|entry| !entry.lowercased.starts_with(query))
            .filter(|entry| entry.lowercased.chars().count().abs_diff(query_len) <= max_distance)
            .filter_map(|entry| {
                let distance = levenshtein(query, &entry.lowercased);
                if distance > max_distance {
                    return None;
                }

                let bonus = if is_common_word(&entry.lowercased) {
                    COMMON_WORD_BONUS
                } else {
                    0.0
                };
                let score = jaro_winkler(query, &entry.lowercased) + bonus
                    - EDIT_PENALTY * distance as f64;

                Some((entry, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.word.cmp(&b.0.word)));
        scored.truncate(limit);
        scored
    }

    /// Words containing `substring`, favouring matches at the start, then the end
    pub fn contains_substring(&self, substring: &str, limit: usize) -> Vec<Suggestion> {
        let needle = substring.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut results: Vec<Suggestion> = self
            .index
            .entries()
            .iter()
            .filter(|entry| entry.lowercased.contains(&needle))
            .map(|entry| {
                // Scored in tenths to keep ties exact
                let mut tenths: u8 = if entry.lowercased.starts_with(&needle) {
                    8
                } else if entry.lowercased.ends_with(&needle) {
                    6
                } else {
                    5
                };
                if is_common_word(&entry.lowercased) {
                    tenths += 1;
                }

                self.suggestion(
                    entry,
                    f64::from(tenths.min(9)) / 10.0,
                    entry.lowercased == needle,
                )
            })
            .collect();

        results.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.word.chars().count().cmp(&b.word.chars().count()))
                .then_with(|| a.word.cmp(&b.word))
        });
        results.truncate(limit);
        results
    }

    /// Prefix-only completions for type-ahead
    pub fn autocomplete(&self, query: &str, limit: usize) -> Vec<AutocompleteSuggestion> {
        let prefix = query.trim().to_lowercase();

        self.suggest(&prefix, limit.saturating_mul(2))
            .into_iter()
            .filter(|s| s.word.to_lowercase().starts_with(&prefix))
            .take(limit)
            .map(|s| AutocompleteSuggestion {
                word: s.word,
                is_exact_match: s.is_exact_match,
            })
            .collect()
    }

    /// Synonyms followed by antonyms of `word`, without duplicates
    pub fn related_words(&self, word: &str) -> Vec<String> {
        let Some(definition) = self.index.get(word) else {
            return Vec::new();
        };

        let mut related: Vec<String> = Vec::new();
        for candidate in definition.synonyms.iter().chain(&definition.antonyms) {
            if !related.iter().any(|r| r.eq_ignore_ascii_case(candidate)) {
                related.push(candidate.clone());
            }
        }
        related
    }

    fn suggestion(&self, entry: &SearchIndexEntry, relevance: f64, exact: bool) -> Suggestion {
        let part_of_speech = self
            .index
            .get(&entry.lowercased)
            .map(|def| def.pos.clone())
            .filter(|pos| !pos.is_empty());

        Suggestion {
            word: entry.word.clone(),
            relevance,
            is_exact_match: exact,
            part_of_speech,
        }
    }
}

fn by_relevance_then_word(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| a.word.cmp(&b.word))
}
