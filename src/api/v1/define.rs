//! Definition endpoints

use std::collections::HashMap;

use axum::extract::{Path, State};

use crate::api::state::AppState;
use crate::api::types::{ApiError, BatchDefineRequest, DefineResponse, Json};
use crate::domain::WordDefinition;

/// GET /v1/define/{word}
pub async fn define_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<Json<DefineResponse>, ApiError> {
    let outcome = state.lookup.lookup(&word).await?;
    let word = outcome.word.clone();

    DefineResponse::from_outcome(outcome)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Word '{}' not found", word)).with_param("word"))
}

/// POST /v1/define/batch
///
/// Returns `{word: definition}` for the words that exist, the same shape
/// the HTTP bulk fetcher expects from its upstream.
pub async fn define_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchDefineRequest>,
) -> Result<Json<HashMap<String, WordDefinition>>, ApiError> {
    let words = request.into_words()?;
    tracing::debug!(words = words.len(), "Batch definition request");

    let found = state.lookup.lookup_many(&words).await?;
    Ok(Json(found))
}
