//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, BatcherSettings, CacheSettings, DictionarySettings, LogFormat, LoggingConfig,
    PrefetchSettings, ServerConfig,
};
