//! Search over the word index with stale-query superseding

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::dictionary::{DictionaryStats, WordSearchResult};
use crate::domain::search::{AutocompleteSuggestion, SearchRanker, Suggestion};
use crate::domain::DomainError;

/// Query limits
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Shorter queries return no plain prefix results
    pub min_query_length: usize,
    /// Cap for plain prefix search
    pub max_search_results: usize,
    /// Idle time after which a session's gate is forgotten
    pub session_idle: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            max_search_results: 50,
            session_idle: Duration::from_secs(300),
        }
    }
}

impl SearchConfig {
    pub fn with_min_query_length(mut self, length: usize) -> Self {
        self.min_query_length = length;
        self
    }

    pub fn with_max_search_results(mut self, max: usize) -> Self {
        self.max_search_results = max;
        self
    }
}

/// Ticket handed out by [`LatestQueryGate::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

/// Lets only the most recent query of a stream deliver its result
///
/// Each query takes a ticket before ranking; when it finishes, a ticket that
/// is no longer the newest yields [`DomainError::Superseded`].
#[derive(Debug, Default)]
pub struct LatestQueryGate {
    latest: AtomicU64,
}

impl LatestQueryGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> QueryTicket {
        QueryTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn finish<T>(&self, ticket: QueryTicket, value: T) -> Result<T, DomainError> {
        if self.is_current(ticket) {
            Ok(value)
        } else {
            Err(DomainError::Superseded)
        }
    }
}

/// Runs ranking on the blocking pool
///
/// Requests carrying a session id share a [`LatestQueryGate`], so a newer
/// query from the same session supersedes an older one still in progress.
#[derive(Debug, Clone)]
pub struct SearchService {
    ranker: Arc<SearchRanker>,
    config: SearchConfig,
    sessions: MokaCache<String, Arc<LatestQueryGate>>,
}

impl SearchService {
    pub fn new(ranker: Arc<SearchRanker>, config: SearchConfig) -> Self {
        let sessions = MokaCache::builder()
            .max_capacity(10_000)
            .time_to_idle(config.session_idle)
            .build();

        Self {
            ranker,
            config,
            sessions,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn dictionary_stats(&self) -> DictionaryStats {
        self.ranker.index().stats()
    }

    /// Prefix matches ordered by frequency
    pub async fn search_prefix(&self, query: &str) -> Result<Vec<WordSearchResult>, DomainError> {
        if self.too_short(query) {
            return Ok(Vec::new());
        }

        let query = query.to_string();
        let max = self.config.max_search_results;
        self.rank(None, move |ranker| ranker.index().search_prefix(&query, max))
            .await
    }

    pub async fn suggest(
        &self,
        query: &str,
        limit: usize,
        session: Option<&str>,
    ) -> Result<Vec<Suggestion>, DomainError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query = query.to_string();
        self.rank(session, move |ranker| ranker.suggest(&query, limit))
            .await
    }

    pub async fn contains(
        &self,
        substring: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>, DomainError> {
        if substring.trim().is_empty() {
            return Ok(Vec::new());
        }

        let substring = substring.to_string();
        self.rank(None, move |ranker| ranker.contains_substring(&substring, limit))
            .await
    }

    pub async fn autocomplete(
        &self,
        query: &str,
        limit: usize,
        session: Option<&str>,
    ) -> Result<Vec<AutocompleteSuggestion>, DomainError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query = query.to_string();
        self.rank(session, move |ranker| ranker.autocomplete(&query, limit))
            .await
    }

    /// Synonyms and antonyms; `NotFound` for unknown words
    pub fn related(&self, word: &str) -> Result<Vec<String>, DomainError> {
        if self.ranker.index().get(word).is_none() {
            return Err(DomainError::not_found(format!("Word '{}' not found", word.trim())));
        }
        Ok(self.ranker.related_words(word))
    }

    fn too_short(&self, query: &str) -> bool {
        query.trim().chars().count() < self.config.min_query_length
    }

    async fn rank<T, F>(&self, session: Option<&str>, job: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: FnOnce(&SearchRanker) -> T + Send + 'static,
    {
        let gate = match session {
            Some(id) => Some(
                self.sessions
                    .get_with(id.to_string(), async { Arc::new(LatestQueryGate::new()) })
                    .await,
            ),
            None => None,
        };
        let ticket = gate.as_ref().map(|g| g.begin());

        let ranker = Arc::clone(&self.ranker);
        let result = tokio::task::spawn_blocking(move || job(&ranker))
            .await
            .map_err(|e| DomainError::internal(format!("Search task failed: {}", e)))?;

        match (gate, ticket) {
            (Some(gate), Some(ticket)) => gate.finish(ticket, result),
            _ => Ok(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dictionary::{WordDefinition, WordIndex};

    fn service() -> SearchService {
        let index = WordIndex::from_words([
            ("run", WordDefinition::new(1, "verb", 900).with_synonyms(["sprint"]).with_antonyms(["walk"])),
            ("runner", WordDefinition::new(2, "noun", 300)),
            ("running", WordDefinition::new(3, "verb", 600)),
            ("rain", WordDefinition::new(4, "noun", 500)),
        ]);
        SearchService::new(
            Arc::new(SearchRanker::new(Arc::new(index))),
            SearchConfig::default(),
        )
    }

    #[test]
    fn test_gate_supersedes_older_ticket() {
        let gate = LatestQueryGate::new();
        let first = gate.begin();
        let second = gate.begin();

        assert_eq!(gate.finish(first, "old"), Err(DomainError::Superseded));
        assert_eq!(gate.finish(second, "new"), Ok("new"));
    }

    #[tokio::test]
    async fn test_short_query_only_limits_prefix_search() {
        let service = service();
        assert!(service.search_prefix("r").await.unwrap().is_empty());
        assert!(!service.suggest("r", 10, None).await.unwrap().is_empty());
        assert!(service.suggest("  ", 10, None).await.unwrap().is_empty());
        assert!(service.contains(" ", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_letter_words_are_suggested() {
        let index = WordIndex::from_words([
            ("a", WordDefinition::new(1, "article", 1000)),
            ("i", WordDefinition::new(2, "pronoun", 900)),
            ("ax", WordDefinition::new(3, "noun", 50)),
        ]);
        let service = SearchService::new(
            Arc::new(SearchRanker::new(Arc::new(index))),
            SearchConfig::default(),
        );

        let suggestions = service.suggest("a", 10, None).await.unwrap();
        assert_eq!(suggestions.first().map(|s| s.word.as_str()), Some("a"));
        assert!(suggestions[0].is_exact_match);

        let containing = service.contains("a", 10).await.unwrap();
        assert!(containing.iter().any(|s| s.word == "ax"));
    }

    #[tokio::test]
    async fn test_newer_session_query_supersedes_older() {
        let service = service();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let older = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .rank(Some("tab-1"), move |ranker| {
                        let _ = started_tx.send(());
                        let _ = release_rx.recv();
                        ranker.suggest("run", 10)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        let newer = service.suggest("runn", 10, Some("tab-1")).await.unwrap();
        assert_eq!(newer[0].word, "runner");

        release_tx.send(()).unwrap();
        assert_eq!(older.await.unwrap(), Err(DomainError::Superseded));
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_supersede() {
        let service = service();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let older = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .rank(Some("tab-1"), move |ranker| {
                        let _ = started_tx.send(());
                        let _ = release_rx.recv();
                        ranker.suggest("run", 10)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        service.suggest("runn", 10, Some("tab-2")).await.unwrap();

        release_tx.send(()).unwrap();
        assert!(older.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_search_prefix_by_frequency() {
        let results = service().search_prefix("run").await.unwrap();
        let words: Vec<&str> = results.iter().map(|r| r.word.as_str()).collect();

        assert_eq!(words, vec!["run", "running", "runner"]);
    }

    #[tokio::test]
    async fn test_suggest_with_session() {
        let service = service();
        let results = service.suggest("run", 10, Some("tab-1")).await.unwrap();

        assert_eq!(results[0].word, "run");
        assert!(results[0].is_exact_match);
    }

    #[tokio::test]
    async fn test_autocomplete_prefix_only() {
        let results = service().autocomplete("ru", 5, None).await.unwrap();
        assert!(results.iter().all(|s| s.word.starts_with("ru")));
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_contains_substring() {
        let results = service().contains("nn", 10).await.unwrap();
        let words: Vec<&str> = results.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words.len(), 2);
        assert!(words.contains(&"runner") && words.contains(&"running"));
    }

    #[test]
    fn test_related_words() {
        let service = service();
        assert_eq!(service.related("Run").unwrap(), vec!["sprint", "walk"]);
        assert!(matches!(service.related("fly"), Err(DomainError::NotFound { .. })));
    }
}
