//! Request coalescing

mod batcher;

pub use batcher::RequestBatcher;
