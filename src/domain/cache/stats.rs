//! Cache counters

use serde::Serialize;

/// Plain counters reported by the tiered cache
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Percentage of reads served from any tier (0-100)
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn new(hits: u64, misses: u64, sets: u64, deletes: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            hits,
            misses,
            sets,
            deletes,
            hit_rate,
        }
    }
}

/// Cache status snapshot for health and stats reporting
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub remote_configured: bool,
    pub remote_available: bool,
    pub local_size: u64,
    pub stats: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_percentage() {
        let stats = CacheStats::new(3, 1, 0, 0);
        assert_eq!(stats.hit_rate, 75.0);
    }

    #[test]
    fn test_hit_rate_zero_without_reads() {
        assert_eq!(CacheStats::new(0, 0, 5, 0).hit_rate, 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&CacheStats::new(1, 1, 1, 1)).unwrap();
        assert!(json.contains("\"hitRate\":50.0"));
    }
}
