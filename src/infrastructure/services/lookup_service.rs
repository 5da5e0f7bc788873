//! Word lookup through cache, batcher and prefetch

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;

use crate::domain::cache::word_key;
use crate::domain::dictionary::WordDefinition;
use crate::domain::prefetch::RelatedWordsHint;
use crate::domain::DomainError;
use crate::infrastructure::batch::RequestBatcher;
use crate::infrastructure::cache::TieredCache;
use crate::infrastructure::observability::record_lookup;
use crate::infrastructure::prefetch::PrefetchService;

/// Where a lookup was answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    Cache,
    Upstream,
}

impl LookupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Upstream => "upstream",
        }
    }
}

/// Result of one lookup
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOutcome {
    pub word: String,
    pub definition: Option<WordDefinition>,
    pub source: LookupSource,
    pub latency_ms: f64,
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        self.definition.is_some()
    }
}

/// Cache first, then the coalescing batcher; found words feed the prefetch engine
#[derive(Debug)]
pub struct LookupService {
    cache: Arc<TieredCache>,
    batcher: RequestBatcher<WordDefinition>,
    prefetch: Option<Arc<PrefetchService>>,
    ttl: Option<Duration>,
}

impl LookupService {
    pub fn new(cache: Arc<TieredCache>, batcher: RequestBatcher<WordDefinition>) -> Self {
        Self {
            cache,
            batcher,
            prefetch: None,
            ttl: None,
        }
    }

    pub fn with_prefetch(mut self, prefetch: Arc<PrefetchService>) -> Self {
        self.prefetch = Some(prefetch);
        self
    }

    /// TTL for definitions written to the cache; defaults to the cache's own
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn cache(&self) -> &Arc<TieredCache> {
        &self.cache
    }

    pub fn batcher(&self) -> &RequestBatcher<WordDefinition> {
        &self.batcher
    }

    pub async fn lookup(&self, word: &str) -> Result<LookupOutcome, DomainError> {
        let word = normalize(word)?;
        let started = Instant::now();
        let key = word_key(&word);

        let (definition, source) = match self.cache.get::<WordDefinition>(&key).await? {
            Some(definition) => (Some(definition), LookupSource::Cache),
            None => {
                let definition = self.batcher.get(&word).await?;
                if let Some(definition) = &definition {
                    self.store(&key, definition).await;
                }
                (definition, LookupSource::Upstream)
            }
        };

        let elapsed = started.elapsed();
        record_lookup(source.as_str(), definition.is_some(), elapsed);

        if let (Some(definition), Some(prefetch)) = (&definition, &self.prefetch) {
            let prefetch = Arc::clone(prefetch);
            let hint = RelatedWordsHint::from_definition(definition);
            let tracked = word.clone();

            tokio::spawn(async move {
                prefetch.track(&tracked, &hint).await;
            });
        }

        Ok(LookupOutcome {
            word,
            definition,
            source,
            latency_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }

    /// Looks up several words concurrently; absent words are omitted
    pub async fn lookup_many(
        &self,
        words: &[String],
    ) -> Result<HashMap<String, WordDefinition>, DomainError> {
        let outcomes = join_all(words.iter().map(|word| self.lookup(word))).await;

        let mut found = HashMap::with_capacity(words.len());
        for outcome in outcomes {
            let outcome = outcome?;
            if let Some(definition) = outcome.definition {
                found.insert(outcome.word, definition);
            }
        }

        Ok(found)
    }

    /// Loads uncached words into the cache without recording them as lookups
    ///
    /// Returns how many words were written.
    pub async fn warm(&self, words: &[String]) -> Result<usize, DomainError> {
        let mut missing = Vec::with_capacity(words.len());
        for word in words {
            let Ok(word) = normalize(word) else { continue };
            if self.cache.get::<WordDefinition>(&word_key(&word)).await?.is_none() {
                missing.push(word);
            }
        }

        if missing.is_empty() {
            return Ok(0);
        }

        let fetched = self.batcher.get_many(&missing).await?;
        for (word, definition) in &fetched {
            self.store(&word_key(word), definition).await;
        }

        Ok(fetched.len())
    }

    async fn store(&self, key: &str, definition: &WordDefinition) {
        if let Err(e) = self.cache.set(key, definition, self.ttl).await {
            tracing::warn!(key, error = %e, "Failed to cache definition");
        }
    }
}

fn normalize(word: &str) -> Result<String, DomainError> {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return Err(DomainError::validation("Word must not be empty"));
    }
    Ok(word)
}
