//! Search endpoints

use axum::extract::{Path, Query, State};

use crate::api::state::AppState;
use crate::api::types::{
    clamp_limit, ApiError, ContainsParams, Json, RelatedResponse, SearchParams, SearchResponse,
};
use crate::domain::dictionary::WordSearchResult;
use crate::domain::search::{AutocompleteSuggestion, Suggestion};

/// GET /v1/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse<WordSearchResult>>, ApiError> {
    let query = params.query()?;
    let results = state.search.search_prefix(query).await?;

    Ok(Json(SearchResponse::new(query, results)))
}

/// GET /v1/search/suggestions?q=&limit=
pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse<Suggestion>>, ApiError> {
    let query = params.query()?;
    let limit = clamp_limit(params.limit, 10, 50);

    let results = state
        .search
        .suggest(query, limit, params.session.as_deref())
        .await?;

    Ok(Json(SearchResponse::new(query, results)))
}

/// GET /v1/search/contains?substring=&limit=
pub async fn contains(
    State(state): State<AppState>,
    Query(params): Query<ContainsParams>,
) -> Result<Json<SearchResponse<Suggestion>>, ApiError> {
    let substring = params.substring()?;
    let limit = clamp_limit(params.limit, 20, 100);

    let results = state.search.contains(substring, limit).await?;
    Ok(Json(SearchResponse::new(substring, results)))
}

/// GET /v1/search/autocomplete?q=&limit=
///
/// A missing or blank `q` is an empty listing, not an error.
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse<AutocompleteSuggestion>>, ApiError> {
    let query = params.q.as_deref().unwrap_or_default();
    let limit = clamp_limit(params.limit, 5, 20);

    let results = state
        .search
        .autocomplete(query, limit, params.session.as_deref())
        .await?;

    Ok(Json(SearchResponse::new(query, results)))
}

/// GET /v1/search/related/{word}
pub async fn related(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<Json<RelatedResponse>, ApiError> {
    let related_words = state.search.related(&word)?;

    Ok(Json(RelatedResponse {
        word: word.trim().to_lowercase(),
        related_words,
    }))
}
