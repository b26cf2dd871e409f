//! Short-lived per-target aim cache

use std::collections::HashMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::actor::ActorId;
use crate::ViewAngles;
use crate::consts::PREDICTION_TTL_MS;

/// What the host needs to show or steer toward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimPoint {
    pub point: DVec3,
    /// Launch orientation toward `point`
    pub view: ViewAngles,
}

#[derive(Debug, Clone, Copy)]
struct PredictionEntry {
    aim: AimPoint,
    stored_at_ms: u64,
}

/// Aim points keyed by target, expiring after `ttl_ms`
#[derive(Debug, Clone)]
pub struct PredictionCache {
    entries: HashMap<ActorId, PredictionEntry>,
    ttl_ms: u64,
    hits: u64,
    misses: u64,
}

impl Default for PredictionCache {
    fn default() -> Self {
        Self::new(PREDICTION_TTL_MS)
    }
}

impl PredictionCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms,
            hits: 0,
            misses: 0,
        }
    }

    pub fn set_ttl(&mut self, ttl_ms: u64) {
        self.ttl_ms = ttl_ms;
    }

    /// Drop entries older than the TTL
    pub fn purge(&mut self, now_ms: u64) {
        let ttl = self.ttl_ms;
        self.entries
            .retain(|_, e| now_ms.saturating_sub(e.stored_at_ms) < ttl);
    }

    /// Serve a live entry, or compute and store a fresh one
    ///
    /// `None` results are not stored.
    pub fn get_or_compute<F>(&mut self, target: ActorId, now_ms: u64, compute: F) -> Option<AimPoint>
    where
        F: FnOnce() -> Option<AimPoint>,
    {
        self.purge(now_ms);
        if let Some(entry) = self.entries.get(&target) {
            self.hits += 1;
            return Some(entry.aim);
        }

        self.misses += 1;
        let aim = compute()?;
        self.entries.insert(
            target,
            PredictionEntry {
                aim,
                stored_at_ms: now_ms,
            },
        );
        Some(aim)
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Prediction cache cleared ({} entries)", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn forget(&mut self, target: ActorId) {
        self.entries.remove(&target);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
