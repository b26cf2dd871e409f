//! Engine counters

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub ticks: u64,
    pub target_changes: u64,
    /// Shots planned from scratch
    pub solved: u64,
    /// Targets out of reach at the current speed
    pub unreachable: u64,
    /// Shots where neither arc reached the target
    pub obstructed: u64,
    /// Shots that needed the high arc
    pub high_arcs: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl EngineStats {
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    pub fn log_summary(&self) {
        log::debug!(
            "ticks={} targets={} solved={} unreachable={} obstructed={} high={} cache={:.0}%",
            self.ticks,
            self.target_changes,
            self.solved,
            self.unreachable,
            self.obstructed,
            self.high_arcs,
            self.cache_hit_rate() * 100.0
        );
    }
}
