//! Infrastructure services

mod lookup_service;
mod search_service;

pub use lookup_service::{LookupOutcome, LookupService, LookupSource};
pub use search_service::{LatestQueryGate, QueryTicket, SearchConfig, SearchService};
