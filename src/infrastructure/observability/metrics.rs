//! Prometheus metrics infrastructure
//!
//! `record_*` functions are no-ops until a recorder is installed.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving the metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("lightning_lookup_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!(path = %config.path, "Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Router serving the rendered metrics at `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request; `path` should be the matched route template
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

pub fn record_cache_hit(tier: &'static str) {
    counter!("cache_hits_total", "tier" => tier).increment(1);
}

pub fn record_cache_miss() {
    counter!("cache_misses_total").increment(1);
}

pub fn record_cache_remote_error(operation: &'static str) {
    counter!("cache_remote_errors_total", "operation" => operation).increment(1);
}

/// Record a completed upstream batch
pub fn record_batch_dispatch(keys: usize, attempts: u32, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!("batcher_batches_total", "status" => status).increment(1);
    histogram!("batcher_batch_size").record(keys as f64);
    histogram!("batcher_batch_attempts").record(f64::from(attempts));
}

pub fn record_upstream_retry() {
    counter!("batcher_upstream_retries_total").increment(1);
}

/// Record a word lookup and where it was served from
pub fn record_lookup(source: &'static str, found: bool, duration: Duration) {
    let labels = [
        ("source", source.to_string()),
        ("found", found.to_string()),
    ];

    counter!("lookups_total", &labels).increment(1);
    histogram!("lookup_duration_seconds", &labels).record(duration.as_secs_f64());
}

pub fn record_prefetch_dispatch(words: usize, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!("prefetch_dispatches_total", "status" => status).increment(1);
    counter!("prefetch_words_total", "status" => status).increment(words as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("GET", "/v1/define/{word}", 200, Duration::from_millis(3));
        record_cache_hit("local");
        record_cache_miss();
        record_cache_remote_error("get");
        record_batch_dispatch(3, 1, true);
        record_upstream_retry();
        record_lookup("cache", true, Duration::from_millis(1));
        record_prefetch_dispatch(2, false);
    }

    #[test]
    fn test_disabled_metrics_return_none() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };
        assert!(init_metrics(&config).is_none());
    }
}
