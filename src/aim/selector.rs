//! Target lock state machine

use serde::{Deserialize, Serialize};

use super::actor::{ActorId, ActorView, ShooterState};
use super::hitbox;
use crate::look_angles;

/// Selector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetState {
    #[default]
    NoTarget,
    Locked(ActorId),
}

/// Holds the locked target across ticks (by id only)
#[derive(Debug, Clone, Default)]
pub struct TargetSelector {
    state: TargetState,
}

impl TargetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn current(&self) -> Option<ActorId> {
        match self.state {
            TargetState::Locked(id) => Some(id),
            TargetState::NoTarget => None,
        }
    }

    pub fn lock(&mut self, id: ActorId) {
        if self.state != TargetState::Locked(id) {
            log::debug!("Target locked: {:?}", id);
        }
        self.state = TargetState::Locked(id);
    }

    pub fn clear(&mut self) {
        if let TargetState::Locked(id) = self.state {
            log::debug!("Target released: {:?}", id);
        }
        self.state = TargetState::NoTarget;
    }

    /// Advance to the next eligible actor, wrapping around
    ///
    /// Starts from the closest actor when nothing valid is locked.
    pub fn cycle_next(&mut self, eligible: &[&ActorView]) -> Option<ActorId> {
        if eligible.is_empty() {
            self.clear();
            return None;
        }
        let next = self
            .current()
            .and_then(|id| eligible.iter().position(|a| a.id == id))
            .map_or(0, |i| (i + 1) % eligible.len());
        let id = eligible[next].id;
        self.lock(id);
        Some(id)
    }

    /// Lock the actor closest to the crosshair within `cone` degrees
    ///
    /// Leaves the state untouched when nothing is inside the cone.
    pub fn snap_to_look(
        &mut self,
        shooter: &ShooterState,
        eligible: &[&ActorView],
        cone: f64,
    ) -> Option<ActorId> {
        let eye = shooter.eye();
        let mut best: Option<(f64, ActorId)> = None;
        for actor in eligible {
            let center = hitbox::resolve(*actor).center();
            let (dyaw, dpitch) = shooter.view.offset_to(look_angles(eye, center));
            if dyaw > cone || dpitch > cone {
                continue;
            }
            let offset = dyaw.hypot(dpitch);
            if best.is_none_or(|(b, _)| offset < b) {
                best = Some((offset, actor.id));
            }
        }
        let (_, id) = best?;
        self.lock(id);
        Some(id)
    }

    /// Drop the lock if the target is gone or the weapon no longer fits
    ///
    /// Returns true when the lock was dropped.
    pub fn invalidate(&mut self, eligible: &[&ActorView], holds_ranged: bool) -> bool {
        let Some(id) = self.current() else {
            return false;
        };
        if !holds_ranged || !eligible.iter().any(|a| a.id == id) {
            self.clear();
            return true;
        }
        false
    }
}
