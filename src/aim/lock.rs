//! Aim lock: smoothed view steering toward the solved launch angles
//!
//! The engine only reports the steered view; the host decides whether to
//! apply it.

use crate::{ViewAngles, wrap_degrees};

#[derive(Debug, Clone)]
pub struct AimLock {
    enabled: bool,
    smoothing: f64,
}

impl AimLock {
    pub fn new(smoothing: f64) -> Self {
        Self {
            enabled: false,
            smoothing: smoothing.clamp(0.0, 1.0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_smoothing(&mut self, smoothing: f64) {
        self.smoothing = smoothing.clamp(0.0, 1.0);
    }

    /// Flip the lock; it can only turn on with a ranged weapon in hand
    pub fn toggle(&mut self, holds_ranged: bool) -> bool {
        self.enabled = !self.enabled && holds_ranged;
        log::debug!("Aim lock {}", if self.enabled { "on" } else { "off" });
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// One smoothing step from `current` toward `desired`
    pub fn steer(&self, current: ViewAngles, desired: ViewAngles) -> ViewAngles {
        let yaw = current.yaw + wrap_degrees(desired.yaw - current.yaw) * self.smoothing;
        let pitch = current.pitch + (desired.pitch - current.pitch) * self.smoothing;
        ViewAngles::new(wrap_degrees(yaw), pitch)
    }
}
