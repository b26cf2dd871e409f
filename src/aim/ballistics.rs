//! Closed-form projectile ballistics
//!
//! For a drag-free projectile launched at speed `v` under gravity `g`, the
//! angles that pass through a point `dxz` away horizontally and `dy` up are
//! the roots of
//!
//! ```text
//! tan θ = (v² ± sqrt(v⁴ - g(g·dxz² + 2·dy·v²))) / (g·dxz)
//! ```
//!
//! A negative discriminant means the point is out of reach at this speed.

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Horizontal distances below this are treated as straight up/down
pub const VERTICAL_EPSILON: f64 = 1e-6;

/// Which of the two solutions to fly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcKind {
    /// Flat arc (preferred)
    Low,
    /// Lobbed arc
    High,
}

/// Both launch angles (radians above horizontal) for one target point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchArc {
    pub low: f64,
    pub high: f64,
}

impl LaunchArc {
    pub fn angle(&self, kind: ArcKind) -> f64 {
        match kind {
            ArcKind::Low => self.low,
            ArcKind::High => self.high,
        }
    }
}

/// Solve launch angles for a target `dxz` away horizontally and `dy` up
pub fn solve(dxz: f64, dy: f64, speed: f64, gravity: f64) -> Option<LaunchArc> {
    if !(speed > 0.0 && speed.is_finite()) || !dxz.is_finite() || !dy.is_finite() {
        return None;
    }
    let dxz = dxz.abs();

    if gravity <= 0.0 {
        // Straight-line flight
        let angle = dy.atan2(dxz);
        return Some(LaunchArc { low: angle, high: angle });
    }

    let v2 = speed * speed;
    let root = v2 * v2 - gravity * (gravity * dxz * dxz + 2.0 * dy * v2);
    if root < 0.0 {
        return None;
    }

    if dxz < VERTICAL_EPSILON {
        let angle = if dy >= 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
        return Some(LaunchArc { low: angle, high: angle });
    }

    let sqrt = root.sqrt();
    let tan_low = (v2 - sqrt) / (gravity * dxz);
    let tan_high = (v2 + sqrt) / (gravity * dxz);
    Some(LaunchArc {
        low: tan_low.atan(),
        high: tan_high.atan(),
    })
}

/// Flight time to the target point along `angle`
pub fn time_of_flight(angle: f64, dxz: f64, dy: f64, speed: f64, gravity: f64) -> Option<f64> {
    if !(speed > 0.0) {
        return None;
    }
    let dxz = dxz.abs();
    let horizontal_speed = speed * angle.cos();

    if dxz >= VERTICAL_EPSILON && horizontal_speed > VERTICAL_EPSILON {
        return Some(dxz / horizontal_speed);
    }

    // Near-vertical: solve dy = vy*t - g*t²/2 for the first crossing
    let vy = speed * angle.sin();
    if gravity <= 0.0 {
        return (vy.abs() > VERTICAL_EPSILON && dy / vy >= 0.0).then(|| dy / vy);
    }
    let disc = vy * vy - 2.0 * gravity * dy;
    if disc < 0.0 {
        return None;
    }
    let t = (vy - disc.sqrt()) / gravity;
    if t >= 0.0 {
        Some(t)
    } else {
        Some((vy + disc.sqrt()) / gravity)
    }
}

/// Launch velocity along a horizontal heading at `angle` above horizontal
pub fn launch_velocity(heading: DVec3, angle: f64, speed: f64) -> DVec3 {
    let flat = DVec3::new(heading.x, 0.0, heading.z).normalize_or_zero();
    flat * (speed * angle.cos()) + DVec3::Y * (speed * angle.sin())
}
