//! Bowsight - target acquisition and ballistic aim prediction
//!
//! Core modules:
//! - `aim`: Targeting engine (selection, hitboxes, ballistics, flight simulation)
//! - `world`: Host query adapter (actors, voxels, shooter) and an in-memory grid world
//! - `settings`: Tunable physics and targeting parameters
//! - `error`: Configuration errors

pub mod aim;
pub mod error;
pub mod settings;
pub mod world;

pub use aim::TargetingEngine;
pub use error::ConfigError;
pub use settings::{AimSettings, GapModel};

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (host runs 20 ticks per time unit)
    pub const TICK_DT: f64 = 1.0 / 20.0;
    /// Hard cap on flight simulation steps (`MAX_FLIGHT_TIME` at `TICK_DT`)
    pub const MAX_SIM_STEPS: usize = 6000;

    /// Projectile gravity (units / time²)
    pub const GRAVITY: f64 = 0.05;
    /// Gravity applied to airborne targets when extrapolating free fall
    pub const ACTOR_GRAVITY: f64 = 0.08;
    /// Velocity multiplier per time unit in air
    pub const AIR_DRAG: f64 = 0.99;
    /// Velocity multiplier per time unit in liquid
    pub const LIQUID_DRAG: f64 = 0.6;

    /// Bow projectile speed at full draw
    pub const BOW_MAX_SPEED: f64 = 3.0;
    /// Crossbow projectile speed (release-triggered, no draw)
    pub const CROSSBOW_SPEED: f64 = 3.15;

    /// Default target search radius
    pub const TARGET_RANGE: f64 = 128.0;
    /// Snap-to-look cone half-angle on each axis (degrees)
    pub const SNAP_CONE_DEGREES: f64 = 5.0;

    /// Predictive iterator bound
    pub const PREDICT_ITERATIONS: usize = 12;
    /// Largest iteration bound settings may request
    pub const MAX_PREDICT_ITERATIONS: usize = 16;
    /// Successive time-of-flight estimates closer than this have converged
    pub const CONVERGENCE_EPSILON: f64 = 0.01;
    /// Depth of the downward support probe beneath a target's feet
    pub const AIRBORNE_PROBE_DEPTH: f64 = 2.0;
    /// Deepest support search settings may request
    pub const MAX_SUPPORT_DEPTH: f64 = 8.0;

    /// Longest flight the validator will simulate (time units)
    ///
    /// Covers a full lob (2v/g) at the default speeds and gravity.
    pub const MAX_FLIGHT_TIME: f64 = 300.0;
    /// Simulated horizon per arc, as a multiple of its solved flight time
    pub const FLIGHT_TIME_SLACK: f64 = 1.25;
    /// Extra simulated time added on top of the scaled flight time
    pub const FLIGHT_TIME_MARGIN: f64 = 1.0;
    /// Bisection passes when fitting the lobbed arc to drag
    pub const LOB_FIT_PASSES: usize = 16;
    /// Flights slower than this in liquid are considered stopped
    pub const MIN_FLIGHT_SPEED: f64 = 0.01;

    /// Prediction cache time-to-live (milliseconds)
    pub const PREDICTION_TTL_MS: u64 = 100;
    /// Aim lock smoothing factor (fraction of the remaining rotation per tick)
    pub const AIM_SMOOTHING: f64 = 0.6;
}

/// View orientation in degrees.
///
/// Yaw 0 faces +Z and grows toward -X; positive pitch looks down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewAngles {
    pub yaw: f64,
    pub pitch: f64,
}

impl ViewAngles {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }

    /// Absolute per-axis offset to another orientation (yaw wrapped)
    pub fn offset_to(&self, other: ViewAngles) -> (f64, f64) {
        (
            wrap_degrees(other.yaw - self.yaw).abs(),
            (other.pitch - self.pitch).abs(),
        )
    }
}

/// Wrap an angle in degrees to [-180, 180)
#[inline]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Distance in the horizontal (XZ) plane
#[inline]
pub fn horizontal_distance(delta: DVec3) -> f64 {
    (delta.x * delta.x + delta.z * delta.z).sqrt()
}

/// Orientation needed to look from `from` toward `to`
pub fn look_angles(from: DVec3, to: DVec3) -> ViewAngles {
    let delta = to - from;
    let horizontal = horizontal_distance(delta);
    let yaw = delta.z.atan2(delta.x).to_degrees() - 90.0;
    let pitch = -delta.y.atan2(horizontal).to_degrees();
    ViewAngles::new(wrap_degrees(yaw), pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert!((wrap_degrees(190.0) - (-170.0)).abs() < 1e-9);
        assert!((wrap_degrees(-190.0) - 170.0).abs() < 1e-9);
        assert!((wrap_degrees(180.0) - (-180.0)).abs() < 1e-9);
        assert!((wrap_degrees(45.0) - 45.0).abs() < 1e-9);
        assert!((wrap_degrees(720.0 + 10.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_look_angles_axes() {
        // +Z is yaw 0
        let view = look_angles(DVec3::ZERO, DVec3::new(0.0, 0.0, 5.0));
        assert!(view.yaw.abs() < 1e-9);
        assert!(view.pitch.abs() < 1e-9);

        // +X is yaw -90
        let view = look_angles(DVec3::ZERO, DVec3::new(5.0, 0.0, 0.0));
        assert!((view.yaw + 90.0).abs() < 1e-9);

        // Looking up is negative pitch
        let view = look_angles(DVec3::ZERO, DVec3::new(0.0, 5.0, 5.0));
        assert!((view.pitch + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_wraps_yaw() {
        let a = ViewAngles::new(179.0, 0.0);
        let b = ViewAngles::new(-179.0, 3.0);
        let (dyaw, dpitch) = a.offset_to(b);
        assert!((dyaw - 2.0).abs() < 1e-9);
        assert!((dpitch - 3.0).abs() < 1e-9);
    }
}
