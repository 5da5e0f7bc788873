//! v1 API endpoints

pub mod define;
pub mod search;
pub mod stats;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/define/batch", post(define::define_batch))
        .route("/define/{word}", get(define::define_word))
        .route("/search", get(search::search))
        .route("/search/suggestions", get(search::suggestions))
        .route("/search/contains", get(search::contains))
        .route("/search/autocomplete", get(search::autocomplete))
        .route("/search/related/{word}", get(search::related))
        .route("/stats", get(stats::stats))
        .route("/cache", delete(stats::clear_cache))
        .route("/prefetch", delete(stats::reset_prefetch))
}
