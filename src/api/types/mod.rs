//! Request and response types

pub mod error;
pub mod json;
pub mod lookup;
pub mod search;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use lookup::{BatchDefineRequest, DefineResponse, MAX_BATCH_WORDS};
pub use search::{clamp_limit, ContainsParams, RelatedResponse, SearchParams, SearchResponse};
