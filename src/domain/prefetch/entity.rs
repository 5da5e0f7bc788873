//! Prefetch entities

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dictionary::WordDefinition;
use crate::domain::DomainError;

/// Coarse word shape recorded with each lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordCategory {
    Compound,
    VerbForm,
    Adverb,
    NounAbstract,
    General,
}

impl WordCategory {
    pub fn of(word: &str) -> Self {
        if word.contains('-') {
            Self::Compound
        } else if word.ends_with("ing") || word.ends_with("ed") {
            Self::VerbForm
        } else if word.ends_with("ly") {
            Self::Adverb
        } else if word.ends_with("tion") || word.ends_with("ment") {
            Self::NounAbstract
        } else {
            Self::General
        }
    }
}

/// One observed lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEvent {
    pub word: String,
    pub timestamp: DateTime<Utc>,
    pub related_words: Vec<String>,
    pub category: WordCategory,
}

/// How two words came to be linked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Synonym,
    Antonym,
    Related,
    Sequential,
    Morphological,
}

/// Reinforced link from one word to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRelationship {
    pub source_word: String,
    pub target_word: String,
    pub score: f64,
    pub kind: RelationshipKind,
    pub last_reinforced: DateTime<Utc>,
}

impl WordRelationship {
    /// Score given to a pair the first time it is seen
    pub const INITIAL_SCORE: f64 = 0.3;
    /// Increment applied on every later co-occurrence
    pub const REINFORCEMENT: f64 = 0.1;
    pub const MAX_SCORE: f64 = 1.0;

    pub fn new(
        source_word: impl Into<String>,
        target_word: impl Into<String>,
        kind: RelationshipKind,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_word: source_word.into(),
            target_word: target_word.into(),
            score: Self::INITIAL_SCORE,
            kind,
            last_reinforced: at,
        }
    }

    /// Bumps the score; never decreases and never exceeds 1.0
    pub fn reinforce(&mut self, at: DateTime<Utc>) {
        self.score = (self.score + Self::REINFORCEMENT).min(Self::MAX_SCORE);
        self.last_reinforced = at;
    }
}

/// Words looked up shortly after `from_word`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceLink {
    pub from_word: String,
    pub to_words: Vec<String>,
    #[serde(default = "Utc::now")]
    pub last_seen: DateTime<Utc>,
}

/// Cross-reference material accompanying a lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedWordsHint {
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
    pub definition_text: Option<String>,
}

impl RelatedWordsHint {
    pub fn from_definition(definition: &WordDefinition) -> Self {
        let text = definition.definition_text();

        Self {
            synonyms: definition.synonyms.clone(),
            antonyms: definition.antonyms.clone(),
            definition_text: (!text.is_empty()).then_some(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty() && self.antonyms.is_empty() && self.definition_text.is_none()
    }
}

/// Dispatch priority passed to the delivery sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(DomainError::configuration(format!(
                "Unknown prefetch priority: {}",
                other
            ))),
        }
    }
}

/// Batch of words handed to the host for background fetching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefetchCommand {
    pub words: Vec<String>,
    pub priority: Priority,
}

/// Prefetch engine counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefetchStatistics {
    pub patterns_tracked: usize,
    pub prefetch_queue_size: usize,
    pub in_flight: usize,
    pub relationships_tracked: usize,
    pub sequence_patterns_found: usize,
    pub total_queued: u64,
    pub total_dropped: u64,
    pub total_completed: u64,
}

/// Persisted subset of engine state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefetchSnapshot {
    #[serde(default)]
    pub patterns: Vec<LookupEvent>,
    #[serde(default)]
    pub relationships: Vec<WordRelationship>,
    #[serde(default)]
    pub sequences: Vec<SequenceLink>,
}

impl PrefetchSnapshot {
    pub const MAX_PATTERNS: usize = 20;
    pub const MAX_RELATIONSHIP_SOURCES: usize = 50;
    pub const MAX_SEQUENCES: usize = 30;
}
