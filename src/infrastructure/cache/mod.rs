//! Cache infrastructure - Local and remote tiers and the tiered facade

mod factory;
mod in_memory;
mod maintenance;
mod redis;
mod tiered;

pub use factory::{CacheConfig, CacheFactory};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use maintenance::spawn_cache_maintenance;
pub use redis::{RedisCache, RedisCacheConfig};
pub use tiered::{TieredCache, TieredCacheConfig};
