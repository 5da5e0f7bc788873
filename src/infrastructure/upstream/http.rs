//! Bulk fetcher backed by an HTTP endpoint

use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::batch::BulkFetcher;
use crate::domain::DomainError;

#[derive(Debug, Serialize)]
struct BulkRequest<'a> {
    keys: &'a [String],
}

/// POSTs `{"keys": [...]}` and expects a `{key: value}` object back
///
/// Keys missing from the response object are treated as absent. Any
/// transport error, non-2xx status or undecodable body fails the whole call.
#[derive(Debug)]
pub struct HttpBulkFetcher<T> {
    client: reqwest::Client,
    url: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> HttpBulkFetcher<T> {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            _value: PhantomData,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl<T> BulkFetcher<T> for HttpBulkFetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch_many(&self, keys: &[String]) -> Result<HashMap<String, T>, DomainError> {
        let response = self
            .client
            .post(&self.url)
            .json(&BulkRequest { keys })
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::upstream(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::upstream(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WordDefinition;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(server: &MockServer) -> HttpBulkFetcher<WordDefinition> {
        HttpBulkFetcher::new(format!("{}/v1/define/batch", server.uri()), Duration::from_secs(2))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_many_posts_keys() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/define/batch"))
            .and(body_json(json!({"keys": ["run", "zzz"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "run": {"rank": 1, "pos": "verb", "frequency": 900, "definitions": ["to move fast"]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let keys = vec!["run".to_string(), "zzz".to_string()];
        let values = fetcher(&server).fetch_many(&keys).await.unwrap();

        assert_eq!(values.len(), 1);
        assert_eq!(values["run"].pos, "verb");
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = fetcher(&server)
            .fetch_many(&["run".to_string()])
            .await
            .unwrap_err();

        match err {
            DomainError::Upstream { message } => assert!(message.contains("503")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = fetcher(&server).fetch_many(&["run".to_string()]).await;
        assert!(matches!(result, Err(DomainError::Upstream { .. })));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let fetcher: HttpBulkFetcher<WordDefinition> = HttpBulkFetcher::new(
            format!("{}/v1/define/batch", server.uri()),
            Duration::from_millis(50),
        )
        .unwrap();

        let result = fetcher.fetch_many(&["run".to_string()]).await;
        assert!(matches!(result, Err(DomainError::Upstream { .. })));
    }
}
