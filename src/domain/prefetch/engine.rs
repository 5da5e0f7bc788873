//! Predictive prefetch engine
//!
//! Learns which words tend to follow or accompany a lookup and keeps a
//! bounded, deduplicated queue of words worth fetching ahead of time.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use super::analysis::{morphological_variants, related_words};
use super::entity::{
    LookupEvent, PrefetchSnapshot, PrefetchStatistics, RelatedWordsHint, RelationshipKind,
    SequenceLink, WordCategory, WordRelationship,
};
use crate::domain::dictionary::Vocabulary;

const MAX_CANDIDATES: usize = 10;
const SEQUENCE_SCORE: f64 = 0.5;
const MORPHOLOGICAL_SCORE: f64 = 0.4;

/// Prefetch tuning
#[derive(Debug, Clone)]
pub struct PrefetchConfig {
    /// Hard cap on queued words
    pub max_queue: usize,
    /// Number of lookup events retained
    pub history_size: usize,
    /// Minimum relationship score for a word to become a candidate
    pub confidence_threshold: f64,
    /// Two lookups closer than this form a sequence
    pub sequence_window: Duration,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            max_queue: 50,
            history_size: 100,
            confidence_threshold: 0.3,
            sequence_window: Duration::from_secs(30),
        }
    }
}

impl PrefetchConfig {
    pub fn with_max_queue(mut self, max_queue: usize) -> Self {
        self.max_queue = max_queue;
        self
    }

    pub fn with_history_size(mut self, history_size: usize) -> Self {
        self.history_size = history_size.max(1);
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_sequence_window(mut self, window: Duration) -> Self {
        self.sequence_window = window;
        self
    }
}

#[derive(Debug, Default)]
struct PrefetchState {
    patterns: VecDeque<LookupEvent>,
    relationships: HashMap<String, Vec<WordRelationship>>,
    sequences: HashMap<String, SequenceLink>,
    queue: VecDeque<String>,
    queued: HashSet<String>,
    in_flight: HashSet<String>,
    total_queued: u64,
    total_dropped: u64,
    total_completed: u64,
}

impl PrefetchState {
    fn reinforce(&mut self, source: &str, target: &str, kind: RelationshipKind, at: DateTime<Utc>) {
        let bucket = self.relationships.entry(source.to_string()).or_default();

        match bucket.iter_mut().find(|r| r.target_word == target) {
            Some(existing) => existing.reinforce(at),
            None => bucket.push(WordRelationship::new(source, target, kind, at)),
        }
    }

    fn link(&mut self, from: &str, to: &str, at: DateTime<Utc>) {
        let link = self
            .sequences
            .entry(from.to_string())
            .or_insert_with(|| SequenceLink {
                from_word: from.to_string(),
                to_words: Vec::new(),
                last_seen: at,
            });

        if !link.to_words.iter().any(|w| w == to) {
            link.to_words.push(to.to_string());
        }
        link.last_seen = at;
    }

    fn candidates(
        &self,
        word: &str,
        threshold: f64,
        vocabulary: Option<&dyn Vocabulary>,
    ) -> Vec<(String, f64)> {
        let mut candidates: Vec<(String, f64)> = Vec::new();

        if let Some(bucket) = self.relationships.get(word) {
            candidates.extend(
                bucket
                    .iter()
                    .filter(|r| r.score >= threshold)
                    .map(|r| (r.target_word.clone(), r.score)),
            );
        }

        if let Some(link) = self.sequences.get(word) {
            candidates.extend(link.to_words.iter().map(|w| (w.clone(), SEQUENCE_SCORE)));
        }

        candidates.extend(
            morphological_variants(word)
                .into_iter()
                .filter(|v| vocabulary.is_none_or(|vocab| vocab.contains(v)))
                .map(|v| (v, MORPHOLOGICAL_SCORE)),
        );

        candidates.retain(|(w, _)| w != word);
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut seen = HashSet::new();
        candidates.retain(|(w, _)| seen.insert(w.clone()));
        candidates.truncate(MAX_CANDIDATES);
        candidates
    }

    fn admit(&mut self, candidates: Vec<(String, f64)>, max_queue: usize) -> usize {
        let mut admitted = 0;

        for (word, _) in candidates {
            if self.queued.contains(&word) {
                continue;
            }
            if self.queue.len() >= max_queue {
                self.total_dropped += 1;
                continue;
            }

            self.queued.insert(word.clone());
            self.queue.push_back(word);
            self.total_queued += 1;
            admitted += 1;
        }

        admitted
    }

    fn snapshot(&self) -> PrefetchSnapshot {
        let skip = self
            .patterns
            .len()
            .saturating_sub(PrefetchSnapshot::MAX_PATTERNS);
        let patterns = self.patterns.iter().skip(skip).cloned().collect();

        let mut buckets: Vec<&Vec<WordRelationship>> = self.relationships.values().collect();
        buckets.sort_by_key(|bucket| {
            std::cmp::Reverse(bucket.iter().map(|r| r.last_reinforced).max())
        });
        let relationships = buckets
            .into_iter()
            .take(PrefetchSnapshot::MAX_RELATIONSHIP_SOURCES)
            .flatten()
            .cloned()
            .collect();

        let mut sequences: Vec<SequenceLink> = self.sequences.values().cloned().collect();
        sequences.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        sequences.truncate(PrefetchSnapshot::MAX_SEQUENCES);

        PrefetchSnapshot {
            patterns,
            relationships,
            sequences,
        }
    }
}

/// Outcome of tracking one lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackOutcome {
    /// Words newly admitted to the queue
    pub queued: usize,
    /// Candidates dropped because the queue was full
    pub dropped: usize,
}

/// Learns lookup patterns and maintains the prefetch queue
///
/// All state sits behind a single lock; every public operation takes it once.
#[derive(Debug)]
pub struct PrefetchEngine {
    config: PrefetchConfig,
    state: RwLock<PrefetchState>,
    vocabulary: Option<Arc<dyn Vocabulary>>,
}

impl PrefetchEngine {
    pub fn new(config: PrefetchConfig) -> Self {
        Self {
            config,
            state: RwLock::new(PrefetchState::default()),
            vocabulary: None,
        }
    }

    /// Restricts morphological candidates to words the vocabulary knows
    pub fn with_vocabulary(mut self, vocabulary: Arc<dyn Vocabulary>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn config(&self) -> &PrefetchConfig {
        &self.config
    }

    /// Records a lookup and queues likely follow-up words
    pub async fn track_lookup(&self, word: &str, hint: &RelatedWordsHint) -> TrackOutcome {
        self.track_lookup_at(word, hint, Utc::now()).await
    }

    /// Records a lookup observed at `at`
    pub async fn track_lookup_at(
        &self,
        word: &str,
        hint: &RelatedWordsHint,
        at: DateTime<Utc>,
    ) -> TrackOutcome {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return TrackOutcome {
                queued: 0,
                dropped: 0,
            };
        }

        let related: Vec<(String, RelationshipKind)> = related_words(hint)
            .into_iter()
            .filter(|(w, _)| *w != word)
            .collect();

        let window = TimeDelta::from_std(self.config.sequence_window).unwrap_or(TimeDelta::MAX);

        let mut state = self.state.write().await;

        let previous = state
            .patterns
            .back()
            .map(|event| (event.word.clone(), event.timestamp));

        state.patterns.push_back(LookupEvent {
            word: word.clone(),
            timestamp: at,
            related_words: related.iter().map(|(w, _)| w.clone()).collect(),
            category: WordCategory::of(&word),
        });
        while state.patterns.len() > self.config.history_size {
            state.patterns.pop_front();
        }

        for (target, kind) in &related {
            state.reinforce(&word, target, *kind, at);
        }

        if let Some((previous_word, previous_at)) = previous {
            let elapsed = at - previous_at;
            if previous_word != word && elapsed >= TimeDelta::zero() && elapsed < window {
                state.link(&previous_word, &word, at);
                state.reinforce(&previous_word, &word, RelationshipKind::Sequential, at);
            }
        }

        let candidates = state.candidates(
            &word,
            self.config.confidence_threshold,
            self.vocabulary.as_deref(),
        );

        let dropped_before = state.total_dropped;
        let queued = state.admit(candidates, self.config.max_queue);

        TrackOutcome {
            queued,
            dropped: (state.total_dropped - dropped_before) as usize,
        }
    }

    /// Takes up to `max` queued words that are not already in flight
    pub async fn next_batch(&self, max: usize) -> Vec<String> {
        let mut state = self.state.write().await;

        let batch: Vec<String> = state
            .queue
            .iter()
            .filter(|w| !state.in_flight.contains(*w))
            .take(max)
            .cloned()
            .collect();

        state.in_flight.extend(batch.iter().cloned());
        batch
    }

    /// Removes a fetched word from both the queue and the in-flight set
    pub async fn mark_completed(&self, word: &str) {
        let mut state = self.state.write().await;

        let was_queued = state.queued.remove(word);
        let was_in_flight = state.in_flight.remove(word);
        if was_queued {
            state.queue.retain(|w| w != word);
        }
        if was_queued || was_in_flight {
            state.total_completed += 1;
        }
    }

    /// Returns words to the queue after a failed delivery
    pub async fn release(&self, words: &[String]) {
        let mut state = self.state.write().await;
        for word in words {
            state.in_flight.remove(word);
        }
    }

    /// Current score of `source -> target`, if the pair has been seen
    pub async fn relationship_score(&self, source: &str, target: &str) -> Option<f64> {
        let state = self.state.read().await;
        state
            .relationships
            .get(source)
            .and_then(|bucket| bucket.iter().find(|r| r.target_word == target))
            .map(|r| r.score)
    }

    pub async fn statistics(&self) -> PrefetchStatistics {
        let state = self.state.read().await;

        PrefetchStatistics {
            patterns_tracked: state.patterns.len(),
            prefetch_queue_size: state.queue.len(),
            in_flight: state.in_flight.len(),
            relationships_tracked: state.relationships.len(),
            sequence_patterns_found: state.sequences.len(),
            total_queued: state.total_queued,
            total_dropped: state.total_dropped,
            total_completed: state.total_completed,
        }
    }

    /// Capped copy of the learned state for persistence
    pub async fn snapshot(&self) -> PrefetchSnapshot {
        self.state.read().await.snapshot()
    }

    /// Replaces learned state with a persisted snapshot; the queue is left untouched
    pub async fn restore(&self, snapshot: PrefetchSnapshot) {
        let mut state = self.state.write().await;

        let skip = snapshot
            .patterns
            .len()
            .saturating_sub(self.config.history_size);
        state.patterns = snapshot.patterns.into_iter().skip(skip).collect();

        state.relationships.clear();
        for relationship in snapshot.relationships {
            state
                .relationships
                .entry(relationship.source_word.clone())
                .or_default()
                .push(relationship);
        }

        state.sequences = snapshot
            .sequences
            .into_iter()
            .map(|link| (link.from_word.clone(), link))
            .collect();
    }

    /// Clears all learned state, the queue and counters
    pub async fn reset(&self) {
        *self.state.write().await = PrefetchState::default();
    }
}
