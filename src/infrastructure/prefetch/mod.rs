//! Prefetch persistence, scheduling and delivery

mod file_store;
mod scheduler;
mod service;
mod sinks;

pub use file_store::FilePrefetchStore;
pub use scheduler::PrefetchScheduler;
pub use service::PrefetchService;
pub use sinks::{CacheWarmingSink, ChannelPrefetchSink};
