//! Batcher counters

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatcherStats {
    /// Distinct keys waiting in the open window
    pub pending_keys: usize,
    pub has_pending_batch: bool,
    pub batches_dispatched: u64,
    pub keys_requested: u64,
    pub retries: u64,
    pub failed_batches: u64,
}
