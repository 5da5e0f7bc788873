//! Cache domain - Tier abstraction, key hashing and counters

mod key;
mod repository;
mod stats;

pub use key::{canonical_json, hash_key, word_key, WORD_NAMESPACE};
pub use repository::{Cache, CacheExt};
pub(crate) use repository::glob_to_regex;
pub use stats::{CacheInfo, CacheStats};

#[cfg(test)]
pub use repository::mock::MockCache;
