use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::batch::{BatcherConfig, RetryPolicy};
use crate::domain::prefetch::{PrefetchConfig, Priority};
use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::services::SearchConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub dictionary: DictionarySettings,
    pub cache: CacheSettings,
    pub batcher: BatcherSettings,
    pub prefetch: PrefetchSettings,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DictionarySettings {
    pub path: PathBuf,
    pub min_query_length: usize,
    pub max_search_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub key_prefix: String,
    pub default_ttl_secs: u64,
    pub local_max_capacity: u64,
    pub local_max_ttl_secs: u64,
    /// Redis URL; unset or empty runs the local tier only
    pub redis_url: Option<String>,
    pub reconnect_interval_secs: u64,
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatcherSettings {
    pub max_batch_size: usize,
    pub batch_delay_ms: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Bulk definition endpoint; unset resolves from the loaded dictionary
    pub upstream_url: Option<String>,
    pub upstream_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrefetchSettings {
    pub enabled: bool,
    pub max_queue: usize,
    pub history_size: usize,
    pub confidence_threshold: f64,
    pub dispatch_interval_ms: u64,
    pub batch_size: usize,
    pub sequence_window_secs: u64,
    /// JSON file for learned state; unset keeps it in memory only
    pub state_path: Option<PathBuf>,
    pub priority: Priority,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DictionarySettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/dictionary.json"),
            min_query_length: 2,
            max_search_results: 50,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: "dict:".to_string(),
            default_ttl_secs: 3600,
            local_max_capacity: 100_000,
            local_max_ttl_secs: 86_400,
            redis_url: None,
            reconnect_interval_secs: 5,
            cleanup_interval_secs: 60,
        }
    }
}

impl Default for BatcherSettings {
    fn default() -> Self {
        Self {
            max_batch_size: 25,
            batch_delay_ms: 10,
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 3000,
            upstream_url: None,
            upstream_timeout_ms: 5000,
        }
    }
}

impl Default for PrefetchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_queue: 50,
            history_size: 100,
            confidence_threshold: 0.3,
            dispatch_interval_ms: 500,
            batch_size: 3,
            sequence_window_secs: 30,
            state_path: None,
            priority: Priority::default(),
        }
    }
}

impl DictionarySettings {
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_min_query_length(self.min_query_length)
            .with_max_search_results(self.max_search_results)
    }
}

impl CacheSettings {
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            redis_url: self.redis_url.clone().filter(|url| !url.is_empty()),
            key_prefix: self.key_prefix.clone(),
            default_ttl: Duration::from_secs(self.default_ttl_secs),
            local_max_capacity: self.local_max_capacity,
            local_max_ttl: Duration::from_secs(self.local_max_ttl_secs),
            reconnect_interval: Duration::from_secs(self.reconnect_interval_secs),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl BatcherSettings {
    pub fn batcher_config(&self) -> BatcherConfig {
        let retry = RetryPolicy::new(self.max_attempts)
            .with_initial_backoff(Duration::from_millis(self.initial_backoff_ms))
            .with_max_backoff(Duration::from_millis(self.max_backoff_ms));

        BatcherConfig::default()
            .with_max_batch_size(self.max_batch_size)
            .with_batch_delay(Duration::from_millis(self.batch_delay_ms))
            .with_retry(retry)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}

impl PrefetchSettings {
    pub fn prefetch_config(&self) -> PrefetchConfig {
        PrefetchConfig::default()
            .with_max_queue(self.max_queue)
            .with_history_size(self.history_size)
            .with_confidence_threshold(self.confidence_threshold)
            .with_sequence_window(Duration::from_secs(self.sequence_window_secs))
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms.max(1))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
