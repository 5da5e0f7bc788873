//! Upstream bulk-fetch implementations

mod http;
mod index;

pub use http::HttpBulkFetcher;
pub use index::IndexBulkFetcher;
