//! Actor and shooter snapshots supplied by the host each tick

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::hitbox::PartLayout;
use super::volume::Volume;
use crate::settings::AimSettings;
use crate::{ViewAngles, look_angles};

/// Host-assigned actor identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Broad actor categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorCategory {
    Hostile,
    Neutral,
    Passive,
    /// Harmless ambient creatures
    Ambient,
    /// Another player-controlled actor
    Player,
    /// Stands, frames and other non-creatures
    Decoration,
}

/// Read-only view of one actor for the current tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorView {
    pub id: ActorId,
    /// Species tag, used only for exclusion
    pub species: String,
    pub category: ActorCategory,
    /// Feet position
    pub position: DVec3,
    pub velocity: DVec3,
    /// Facing (degrees, same convention as `ViewAngles::yaw`)
    pub yaw: f64,
    /// Host's ground flag; may lag behind reality by a few ticks
    pub on_ground: bool,
    pub alive: bool,
    /// Whole-actor bounding volume
    pub bounds: Volume,
    /// Separately targetable parts, when the actor has them
    pub parts: Option<Vec<Volume>>,
}

impl ActorView {
    /// A live, stationary, grounded actor standing on `feet`
    pub fn new(
        id: ActorId,
        species: impl Into<String>,
        category: ActorCategory,
        feet: DVec3,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id,
            species: species.into(),
            category,
            position: feet,
            velocity: DVec3::ZERO,
            yaw: 0.0,
            on_ground: true,
            alive: true,
            bounds: Volume::from_feet(feet, width, height),
            parts: None,
        }
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn grounded(mut self, on_ground: bool) -> Self {
        self.on_ground = on_ground;
        self
    }

    pub fn with_parts(mut self, parts: Vec<Volume>) -> Self {
        self.parts = Some(parts);
        self
    }

    /// Derive part volumes from a layout, position and facing
    pub fn with_layout(self, layout: PartLayout) -> Self {
        let parts = layout.parts(self.position, self.yaw, &self.bounds);
        self.with_parts(parts)
    }

    pub fn distance_squared_to(&self, point: DVec3) -> f64 {
        self.position.distance_squared(point)
    }
}

/// Held item classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponClass {
    /// Draw-based: speed scales with charge
    Bow,
    /// Release-triggered: fixed speed
    Crossbow,
    /// Anything that is not a ranged weapon
    #[default]
    Other,
}

impl WeaponClass {
    pub fn is_ranged(&self) -> bool {
        matches!(self, WeaponClass::Bow | WeaponClass::Crossbow)
    }
}

/// The shooter for the current tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShooterState {
    pub id: ActorId,
    /// Feet position
    pub position: DVec3,
    pub eye_height: f64,
    pub velocity: DVec3,
    pub view: ViewAngles,
    pub weapon: WeaponClass,
    /// Draw fraction (0.0 - 1.0)
    pub charge: f64,
    /// Weapon is currently being drawn
    pub drawing: bool,
}

impl Default for ShooterState {
    fn default() -> Self {
        Self {
            id: ActorId(0),
            position: DVec3::ZERO,
            eye_height: 1.62,
            velocity: DVec3::ZERO,
            view: ViewAngles::default(),
            weapon: WeaponClass::Other,
            charge: 0.0,
            drawing: false,
        }
    }
}

impl ShooterState {
    /// Shooter with its eye at `eye`, holding `weapon`
    pub fn at_eye(eye: DVec3, weapon: WeaponClass) -> Self {
        let eye_height = Self::default().eye_height;
        Self {
            position: eye - DVec3::new(0.0, eye_height, 0.0),
            eye_height,
            weapon,
            ..Default::default()
        }
    }

    #[inline]
    pub fn eye(&self) -> DVec3 {
        self.position + DVec3::new(0.0, self.eye_height, 0.0)
    }

    pub fn holds_ranged(&self) -> bool {
        self.weapon.is_ranged()
    }

    /// Turn the view toward a point
    pub fn look_at(&mut self, point: DVec3) {
        self.view = look_angles(self.eye(), point);
    }

    /// Launch speed for the held weapon
    ///
    /// Bows scale linearly with charge while drawing and assume a full draw
    /// otherwise. Returns `None` for non-ranged items or a zero-speed draw.
    pub fn projectile_speed(&self, settings: &AimSettings) -> Option<f64> {
        let speed = match self.weapon {
            WeaponClass::Bow if self.drawing => settings.bow_max_speed * self.charge.clamp(0.0, 1.0),
            WeaponClass::Bow => settings.bow_max_speed,
            WeaponClass::Crossbow => settings.crossbow_speed,
            WeaponClass::Other => return None,
        };
        (speed > 0.0).then_some(speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bow_speed_scales_with_draw() {
        let settings = AimSettings::default();
        let mut shooter = ShooterState::at_eye(DVec3::ZERO, WeaponClass::Bow);
        assert_eq!(shooter.projectile_speed(&settings), Some(3.0));

        shooter.drawing = true;
        shooter.charge = 0.5;
        assert_eq!(shooter.projectile_speed(&settings), Some(1.5));

        shooter.charge = 0.0;
        assert_eq!(shooter.projectile_speed(&settings), None);

        shooter.charge = 4.0;
        assert_eq!(shooter.projectile_speed(&settings), Some(3.0));
    }

    #[test]
    fn test_crossbow_and_other() {
        let settings = AimSettings::default();
        let crossbow = ShooterState::at_eye(DVec3::ZERO, WeaponClass::Crossbow);
        assert_eq!(crossbow.projectile_speed(&settings), Some(3.15));

        let sword = ShooterState::at_eye(DVec3::ZERO, WeaponClass::Other);
        assert!(!sword.holds_ranged());
        assert_eq!(sword.projectile_speed(&settings), None);
    }

    #[test]
    fn test_at_eye_places_eye() {
        let shooter = ShooterState::at_eye(DVec3::new(1.0, 2.0, 3.0), WeaponClass::Bow);
        assert!((shooter.eye() - DVec3::new(1.0, 2.0, 3.0)).length() < 1e-12);
    }
}
