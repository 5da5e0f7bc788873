//! Search ranking over the in-memory word index

mod distance;
mod ranker;
mod stop_words;

pub use distance::{jaro_winkler, levenshtein};
pub use ranker::{AutocompleteSuggestion, SearchRanker, Suggestion};
pub use stop_words::is_common_word;
