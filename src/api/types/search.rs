//! Search endpoint parameters and bodies

use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// `?q=&limit=&session=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
    /// Requests sharing a session supersede each other
    pub session: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> Result<&str, ApiError> {
        required(self.q.as_deref(), "q")
    }
}

/// `?substring=&limit=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainsParams {
    pub substring: Option<String>,
    pub limit: Option<usize>,
}

impl ContainsParams {
    pub fn substring(&self) -> Result<&str, ApiError> {
        required(self.substring.as_deref(), "substring")
    }
}

/// `limit` or its default, clamped to `1..=max`
pub fn clamp_limit(limit: Option<usize>, default: usize, max: usize) -> usize {
    limit.unwrap_or(default).clamp(1, max)
}

fn required<'a>(value: Option<&'a str>, param: &str) -> Result<&'a str, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(format!("Query parameter '{}' is required", param))
                .with_param(param)
        })
}

/// Any search listing
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse<T> {
    pub query: String,
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> SearchResponse<T> {
    pub fn new(query: impl Into<String>, results: Vec<T>) -> Self {
        Self {
            query: query.into(),
            count: results.len(),
            results,
        }
    }
}

/// `GET /v1/search/related/{word}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedResponse {
    pub word: String,
    pub related_words: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 10, 50), 10);
        assert_eq!(clamp_limit(Some(0), 10, 50), 1);
        assert_eq!(clamp_limit(Some(500), 10, 50), 50);
        assert_eq!(clamp_limit(Some(7), 10, 50), 7);
    }

    #[test]
    fn test_blank_query_rejected() {
        let params = SearchParams {
            q: Some("  ".to_string()),
            ..Default::default()
        };
        let err = params.query().unwrap_err();
        assert_eq!(err.response.error.param.as_deref(), Some("q"));
    }
}
