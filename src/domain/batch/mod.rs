//! Request coalescing contracts

mod config;
mod fetcher;
mod stats;

pub use config::{BatcherConfig, RetryPolicy};
pub use fetcher::BulkFetcher;
pub use stats::BatcherStats;

#[cfg(test)]
pub use fetcher::MockBulkFetcher;
