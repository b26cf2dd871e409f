//! Targeting and aim prediction
//!
//! Everything here is pure over the snapshots the host hands in each tick:
//! - Fixed timestep flight simulation
//! - Seeded RNG only (partial voxel gap model)
//! - Stable candidate ordering (distance, then discovery order)
//! - Only `ActorId`s are retained across ticks

pub mod actor;
pub mod ballistics;
pub mod cache;
pub mod eligibility;
pub mod engine;
pub mod environment;
pub mod hitbox;
pub mod lock;
pub mod predict;
pub mod selector;
pub mod shot;
pub mod stats;
pub mod trajectory;
pub mod volume;

pub use actor::{ActorCategory, ActorId, ActorView, ShooterState, WeaponClass};
pub use ballistics::{ArcKind, LaunchArc};
pub use cache::{AimPoint, PredictionCache};
pub use eligibility::EligibilityFilter;
pub use engine::{TargetingEngine, TickReport};
pub use environment::EnvironmentalFactors;
pub use hitbox::{Hittable, PartLayout};
pub use lock::AimLock;
pub use predict::{Prediction, predict};
pub use selector::{TargetSelector, TargetState};
pub use shot::{AimSolution, PiercingShot, plan_piercing, plan_shot};
pub use stats::EngineStats;
pub use trajectory::{FlightModel, FlightOutcome, Trajectory, simulate};
pub use volume::Volume;
