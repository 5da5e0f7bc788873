//! Stats and cache administration endpoints

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::batch::BatcherStats;
use crate::domain::cache::CacheInfo;
use crate::domain::dictionary::DictionaryStats;
use crate::domain::PrefetchStatistics;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub dictionary: DictionaryStats,
    pub cache_stats: CacheInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch_statistics: Option<PrefetchStatistics>,
    pub batcher_stats: BatcherStats,
}

/// GET /v1/stats
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let prefetch_statistics = match &state.prefetch {
        Some(prefetch) => Some(prefetch.statistics().await),
        None => None,
    };

    Json(StatsResponse {
        dictionary: state.search.dictionary_stats(),
        cache_stats: state.cache().info(),
        prefetch_statistics,
        batcher_stats: state.lookup.batcher().stats().await,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearCacheParams {
    /// Glob such as `word:a*`; absent flushes everything
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
    pub flushed: bool,
}

/// DELETE /v1/cache?pattern=
pub async fn clear_cache(
    State(state): State<AppState>,
    Query(params): Query<ClearCacheParams>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    match params.pattern.filter(|p| !p.trim().is_empty()) {
        Some(pattern) => {
            let deleted = state.cache().delete_pattern(&pattern).await?;
            Ok(Json(ClearCacheResponse {
                pattern: Some(pattern),
                deleted: Some(deleted),
                flushed: false,
            }))
        }
        None => {
            state.cache().flush().await?;
            Ok(Json(ClearCacheResponse {
                pattern: None,
                deleted: None,
                flushed: true,
            }))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResetPrefetchResponse {
    pub reset: bool,
}

/// DELETE /v1/prefetch
pub async fn reset_prefetch(
    State(state): State<AppState>,
) -> Result<Json<ResetPrefetchResponse>, ApiError> {
    let prefetch = state
        .prefetch
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Prefetching is disabled"))?;

    prefetch.reset().await?;
    Ok(Json(ResetPrefetchResponse { reset: true }))
}
