//! Targeting and physics settings
//!
//! Stored by the host as JSON; the engine only parses and serializes it.

use serde::{Deserialize, Serialize};

use crate::aim::actor::ActorCategory;
use crate::consts::*;
use crate::error::{ConfigError, Result};

/// How partially-filled voxels (slabs, posts) treat a passing projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GapModel {
    /// Block only where the shape actually occupies the cell
    #[default]
    Geometric,
    /// Per-cell pass-through chance, reproducible for a given seed
    Seeded { seed: u64 },
}

impl GapModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapModel::Geometric => "Geometric",
            GapModel::Seeded { .. } => "Seeded",
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AimSettings {
    // === Target selection ===
    /// Radius searched for candidate actors
    pub search_radius: f64,
    /// Species tags that are never targeted
    pub excluded_species: Vec<String>,
    /// Categories that are never targeted
    pub excluded_categories: Vec<ActorCategory>,
    /// Snap-to-look cone half-angle per axis (degrees)
    pub snap_cone_degrees: f64,

    // === Projectile physics ===
    /// Projectile gravity
    pub gravity: f64,
    /// Velocity multiplier per time unit in air
    pub air_drag: f64,
    /// Velocity multiplier per time unit in liquid
    pub liquid_drag: f64,
    /// Liquids end the flight instead of slowing it
    pub stop_in_liquid: bool,
    /// Partial voxel behaviour
    pub gap_model: GapModel,
    /// Bow speed at full draw
    pub bow_max_speed: f64,
    /// Crossbow speed
    pub crossbow_speed: f64,
    /// Projectile inherits the shooter's horizontal velocity
    pub inherit_shooter_velocity: bool,
    /// Longest simulated flight (time units)
    pub max_flight_time: f64,

    // === Prediction ===
    /// Gravity used to extrapolate airborne targets
    pub actor_gravity: f64,
    /// Depth of the support probe beneath a target
    pub airborne_probe_depth: f64,
    /// Predictive iterator bound
    pub max_iterations: usize,
    /// Convergence threshold between successive time estimates
    pub convergence_epsilon: f64,
    /// Prediction cache time-to-live (ms)
    pub cache_ttl_ms: u64,

    // === Aim lock ===
    /// Fraction of the remaining rotation applied per tick (0.0 - 1.0)
    pub aim_smoothing: f64,
}

impl Default for AimSettings {
    fn default() -> Self {
        Self {
            search_radius: TARGET_RANGE,
            excluded_species: vec!["bat".to_string()],
            excluded_categories: vec![ActorCategory::Decoration],
            snap_cone_degrees: SNAP_CONE_DEGREES,

            gravity: GRAVITY,
            air_drag: AIR_DRAG,
            liquid_drag: LIQUID_DRAG,
            stop_in_liquid: true,
            gap_model: GapModel::Geometric,
            bow_max_speed: BOW_MAX_SPEED,
            crossbow_speed: CROSSBOW_SPEED,
            inherit_shooter_velocity: false,
            max_flight_time: MAX_FLIGHT_TIME,

            actor_gravity: ACTOR_GRAVITY,
            airborne_probe_depth: AIRBORNE_PROBE_DEPTH,
            max_iterations: PREDICT_ITERATIONS,
            convergence_epsilon: CONVERGENCE_EPSILON,
            cache_ttl_ms: PREDICTION_TTL_MS,

            aim_smoothing: AIM_SMOOTHING,
        }
    }
}

impl AimSettings {
    /// Parse settings from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::debug!("Loaded aim settings (gap model: {})", settings.gap_model.as_str());
        Ok(settings)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make the physics meaningless or unbounded
    pub fn validate(&self) -> Result<()> {
        if !(self.search_radius.is_finite() && self.search_radius > 0.0) {
            return Err(ConfigError::invalid("search_radius", "must be positive"));
        }
        if !(0.0..=90.0).contains(&self.snap_cone_degrees) {
            return Err(ConfigError::invalid("snap_cone_degrees", "must be within 0-90"));
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(ConfigError::invalid("gravity", "must be non-negative"));
        }
        if !(self.actor_gravity.is_finite() && self.actor_gravity >= 0.0) {
            return Err(ConfigError::invalid("actor_gravity", "must be non-negative"));
        }
        for (field, drag) in [("air_drag", self.air_drag), ("liquid_drag", self.liquid_drag)] {
            if !(drag > 0.0 && drag <= 1.0) {
                return Err(ConfigError::invalid(field, "must be within (0, 1]"));
            }
        }
        for (field, speed) in [
            ("bow_max_speed", self.bow_max_speed),
            ("crossbow_speed", self.crossbow_speed),
        ] {
            if !(speed.is_finite() && speed > 0.0) {
                return Err(ConfigError::invalid(field, "must be positive"));
            }
        }
        if !(self.max_flight_time > 0.0 && self.max_flight_time <= MAX_FLIGHT_TIME) {
            return Err(ConfigError::invalid(
                "max_flight_time",
                format!("must be within (0, {MAX_FLIGHT_TIME}]"),
            ));
        }
        if !(0.0..=MAX_SUPPORT_DEPTH).contains(&self.airborne_probe_depth) {
            return Err(ConfigError::invalid(
                "airborne_probe_depth",
                format!("must be within 0-{MAX_SUPPORT_DEPTH}"),
            ));
        }
        if self.max_iterations == 0 || self.max_iterations > MAX_PREDICT_ITERATIONS {
            return Err(ConfigError::invalid(
                "max_iterations",
                format!("must be within 1-{MAX_PREDICT_ITERATIONS}"),
            ));
        }
        if !(self.convergence_epsilon.is_finite() && self.convergence_epsilon > 0.0) {
            return Err(ConfigError::invalid("convergence_epsilon", "must be positive"));
        }
        if self.cache_ttl_ms == 0 {
            return Err(ConfigError::invalid("cache_ttl_ms", "must be at least 1ms"));
        }
        if !(0.0..=1.0).contains(&self.aim_smoothing) {
            return Err(ConfigError::invalid("aim_smoothing", "must be within 0-1"));
        }
        Ok(())
    }

    /// Species exclusion check (case-insensitive)
    pub fn excludes_species(&self, species: &str) -> bool {
        self.excluded_species
            .iter()
            .any(|s| s.eq_ignore_ascii_case(species))
    }
}
