//! Predictive intercept
//!
//! The flight time depends on where the target will be, and where the target
//! will be depends on the flight time. Starting from the straight-line time,
//! each pass extrapolates the target, re-solves the launch angle and takes
//! the new flight time, until successive times agree.

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

use super::actor::{ActorId, ActorView, ShooterState};
use super::ballistics::{self, LaunchArc};
use super::hitbox;
use super::volume::Volume;
use crate::consts::MAX_SUPPORT_DEPTH;
use crate::horizontal_distance;
use crate::settings::AimSettings;
use crate::world::VoxelQuery;

/// Result of the predictive iterator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub target: ActorId,
    /// Point to aim the launch at (shooter frame)
    pub aim_point: DVec3,
    /// Target volume where the projectile should meet it (world frame)
    pub volume: Volume,
    pub arc: LaunchArc,
    pub time_of_flight: f64,
    pub speed: f64,
    pub iterations: usize,
    pub converged: bool,
    pub airborne: bool,
}

/// Is there anything to stand on within `depth` below `feet`?
///
/// Scans the cell column under the feet from `feet.y - depth` up to the
/// cell the feet are in. `depth` is clamped to `MAX_SUPPORT_DEPTH`.
pub fn has_support_below<V: VoxelQuery + ?Sized>(world: &V, feet: DVec3, depth: f64) -> bool {
    if !feet.is_finite() {
        return false;
    }
    let depth = depth.max(0.0).min(MAX_SUPPORT_DEPTH);
    let x = feet.x.floor() as i32;
    let z = feet.z.floor() as i32;
    // Float to int casts saturate, so the column stays within i32
    let bottom = (feet.y - depth).floor() as i32;
    let top = feet.y.ceil() as i32;
    (bottom..top).any(|y| world.voxel_at(IVec3::new(x, y, z)).is_supporting())
}

/// Displacement of a target after `t` time units
///
/// Grounded targets keep to their height; airborne ones keep their vertical
/// velocity and fall.
pub fn extrapolate(velocity: DVec3, t: f64, airborne: bool, actor_gravity: f64) -> DVec3 {
    let horizontal = DVec3::new(velocity.x, 0.0, velocity.z) * t;
    if airborne {
        horizontal + DVec3::new(0.0, velocity.y * t - 0.5 * actor_gravity * t * t, 0.0)
    } else {
        horizontal
    }
}

/// Iterate the intercept point for `target`
///
/// `None` when the target is out of reach at `speed` on any pass. If the
/// iteration bound is hit first, the last estimate is returned with
/// `converged` unset.
pub fn predict<V: VoxelQuery + ?Sized>(
    world: &V,
    target: &ActorView,
    shooter: &ShooterState,
    speed: f64,
    settings: &AimSettings,
) -> Option<Prediction> {
    if !(speed > 0.0) {
        return None;
    }

    let volume = hitbox::resolve(target);
    let center = volume.center();
    let eye = shooter.eye();
    let airborne = !has_support_below(world, target.position, settings.airborne_probe_depth);

    let relative_velocity = if settings.inherit_shooter_velocity {
        target.velocity - DVec3::new(shooter.velocity.x, 0.0, shooter.velocity.z)
    } else {
        target.velocity
    };

    let mut time = eye.distance(center) / speed;
    let mut iterations = 0;
    let mut converged = false;
    let mut solved: Option<(DVec3, LaunchArc)> = None;

    while iterations < settings.max_iterations {
        iterations += 1;

        let point = center + extrapolate(relative_velocity, time, airborne, settings.actor_gravity);
        let delta = point - eye;
        let dxz = horizontal_distance(delta);

        let Some(arc) = ballistics::solve(dxz, delta.y, speed, settings.gravity) else {
            log::debug!("Target {:?} out of reach at speed {:.2}", target.id, speed);
            return None;
        };
        let next = ballistics::time_of_flight(arc.low, dxz, delta.y, speed, settings.gravity)?;

        converged = (next - time).abs() < settings.convergence_epsilon;
        time = next;
        solved = Some((point, arc));
        if converged {
            break;
        }
    }

    let (aim_point, arc) = solved?;
    if !converged {
        log::debug!("Prediction for {:?} did not converge in {} passes", target.id, iterations);
    }

    let offset = extrapolate(target.velocity, time, airborne, settings.actor_gravity);
    Some(Prediction {
        target: target.id,
        aim_point,
        volume: volume.translate(offset),
        arc,
        time_of_flight: time,
        speed,
        iterations,
        converged,
        airborne,
    })
}
