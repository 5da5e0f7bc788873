//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_batch_dispatch, record_cache_hit,
    record_cache_miss, record_cache_remote_error, record_http_request, record_lookup,
    record_prefetch_dispatch, record_upstream_retry, PrometheusMetrics,
};
