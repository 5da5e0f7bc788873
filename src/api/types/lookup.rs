//! Definition endpoint bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dictionary::WordDefinition;
use crate::infrastructure::services::{LookupOutcome, LookupSource};

use super::error::ApiError;

/// Words accepted by one batch request
pub const MAX_BATCH_WORDS: usize = 100;

/// `GET /v1/define/{word}` response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineResponse {
    pub success: bool,
    pub word: String,
    pub data: WordDefinition,
    pub timestamp: DateTime<Utc>,
    pub source: LookupSource,
    pub latency_ms: f64,
}

impl DefineResponse {
    /// `None` when the outcome carries no definition
    pub fn from_outcome(outcome: LookupOutcome) -> Option<Self> {
        let data = outcome.definition?;

        Some(Self {
            success: true,
            word: outcome.word,
            data,
            timestamp: Utc::now(),
            source: outcome.source,
            latency_ms: outcome.latency_ms,
        })
    }
}

/// `POST /v1/define/batch` body; `keys` is what the bulk fetcher sends
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchDefineRequest {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub words: Vec<String>,
}

impl BatchDefineRequest {
    /// Both lists merged, blanks and duplicates dropped
    pub fn into_words(self) -> Result<Vec<String>, ApiError> {
        let mut words: Vec<String> = Vec::with_capacity(self.keys.len() + self.words.len());

        for word in self.keys.into_iter().chain(self.words) {
            let word = word.trim().to_lowercase();
            if !word.is_empty() && !words.contains(&word) {
                words.push(word);
            }
        }

        if words.is_empty() {
            return Err(ApiError::bad_request("Provide at least one word").with_param("keys"));
        }
        if words.len() > MAX_BATCH_WORDS {
            return Err(ApiError::bad_request(format!(
                "At most {} words per request",
                MAX_BATCH_WORDS
            ))
            .with_param("keys"));
        }

        Ok(words)
    }
}
