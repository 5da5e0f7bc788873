//! Infrastructure layer - Cache tiers, upstream access and background services

pub mod batch;
pub mod cache;
pub mod dictionary;
pub mod logging;
pub mod observability;
pub mod prefetch;
pub mod services;
pub mod upstream;
