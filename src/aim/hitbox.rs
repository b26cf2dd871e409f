//! Targetable volume resolution
//!
//! Most actors are hit anywhere inside their bounding box. Multi-part actors
//! draw a bounding box far larger than any one collidable part, so aiming at
//! its center often misses. Those actors expose candidate part volumes and
//! the resolver picks the largest one.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::actor::{ActorId, ActorView};
use super::volume::Volume;

/// Something with a collision volume
pub trait Hittable {
    fn bounding_volume(&self) -> Volume;

    /// Separately collidable parts, if any
    fn multi_volume_hint(&self) -> Option<&[Volume]> {
        None
    }
}

impl Hittable for ActorView {
    fn bounding_volume(&self) -> Volume {
        self.bounds
    }

    fn multi_volume_hint(&self) -> Option<&[Volume]> {
        self.parts.as_deref()
    }
}

/// Largest candidate by width * height * depth (first wins on ties)
pub fn largest<I>(candidates: I) -> Option<Volume>
where
    I: IntoIterator<Item = Volume>,
{
    let mut best: Option<Volume> = None;
    for candidate in candidates {
        match best {
            Some(b) if candidate.volume() <= b.volume() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Effective targetable volume of an actor
pub fn resolve<H: Hittable + ?Sized>(actor: &H) -> Volume {
    let bounds = actor.bounding_volume();
    match actor.multi_volume_hint() {
        Some(parts) if !parts.is_empty() => {
            largest(std::iter::once(bounds).chain(parts.iter().copied())).unwrap_or(bounds)
        }
        _ => bounds,
    }
}

/// Resolve every actor independently
pub fn resolve_all(actors: &[&ActorView]) -> Vec<(ActorId, Volume)> {
    actors.iter().map(|a| (a.id, resolve(*a))).collect()
}

/// Approximate part layouts for hosts that cannot expose real part geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartLayout {
    /// Long flyer: swollen body plus a head well ahead of it
    Serpent,
    /// Narrow body with a central head and two side heads
    ThreeHeaded,
}

impl PartLayout {
    /// Candidate part volumes for an actor at `feet` facing `yaw` degrees
    pub fn parts(&self, feet: DVec3, yaw: f64, bounds: &Volume) -> Vec<Volume> {
        let yaw = yaw.to_radians();
        let forward = DVec3::new(-yaw.sin(), 0.0, yaw.cos());
        let side = DVec3::new(yaw.cos(), 0.0, yaw.sin());

        match self {
            PartLayout::Serpent => {
                let body = bounds.expand(DVec3::new(2.0, 1.0, 2.0));
                let head_center = feet + forward * 6.0 + DVec3::new(0.0, 1.0, 0.0);
                let head = Volume::from_center(head_center, DVec3::splat(4.0));
                vec![body, head]
            }
            PartLayout::ThreeHeaded => {
                let body = Volume::from_feet(feet, 0.9, 2.5);
                let head = Volume::from_feet(feet + DVec3::new(0.0, 2.5, 0.0), 0.9, 1.0);
                let side_base = feet + DVec3::new(0.0, 2.2, 0.0);
                let left = Volume::from_feet(side_base + side * 1.3, 0.6, 1.0);
                let right = Volume::from_feet(side_base - side * 1.3, 0.6, 1.0);
                vec![body, head, left, right]
            }
        }
    }
}
