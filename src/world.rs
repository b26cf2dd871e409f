//! Host query adapter
//!
//! The engine never owns the world. Each tick the host answers three kinds of
//! question through these traits: which actors are near a point, what voxel
//! occupies a cell, and what the shooter is doing. `GridWorld` is a small
//! in-memory implementation for tests and the demo harness.

use std::collections::HashMap;

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

use crate::aim::actor::{ActorId, ActorView, ShooterState};

/// Liquid kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidKind {
    Water,
    Lava,
}

/// Shapes that fill only part of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartialShape {
    /// Lower half of the cell
    Slab,
    /// Narrow centered column (fences, walls)
    Post,
}

/// Contents of one voxel cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Voxel {
    #[default]
    Empty,
    /// Plants and other non-colliding decoration
    Foliage,
    Partial(PartialShape),
    Solid,
    Liquid(LiquidKind),
}

impl Voxel {
    /// Projectiles fly through without any test
    pub fn is_open(&self) -> bool {
        matches!(self, Voxel::Empty | Voxel::Foliage)
    }

    /// Something an actor can stand on (or float in)
    pub fn is_supporting(&self) -> bool {
        !self.is_open()
    }

    pub fn is_liquid(&self) -> bool {
        matches!(self, Voxel::Liquid(_))
    }
}

/// Cell containing a world point
#[inline]
pub fn cell_of(point: DVec3) -> IVec3 {
    point.floor().as_ivec3()
}

/// Voxel lookups
pub trait VoxelQuery {
    /// Contents of the cell at integer coordinates
    fn voxel_at(&self, cell: IVec3) -> Voxel;

    /// Contents of the cell containing a world point
    fn occupancy(&self, point: DVec3) -> Voxel {
        self.voxel_at(cell_of(point))
    }
}

/// Full host adapter
pub trait WorldQuery: VoxelQuery {
    /// Snapshot of actors within `radius` of `center`
    fn actors_in_radius(&self, center: DVec3, radius: f64) -> Vec<ActorView>;

    /// Current shooter state
    fn shooter_state(&self) -> ShooterState;
}

/// Sparse voxel grid plus an actor list
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    voxels: HashMap<IVec3, Voxel>,
    actors: Vec<ActorView>,
    shooter: ShooterState,
}

impl GridWorld {
    pub fn new(shooter: ShooterState) -> Self {
        Self {
            voxels: HashMap::new(),
            actors: Vec::new(),
            shooter,
        }
    }

    /// Set a single cell (`Voxel::Empty` clears it)
    pub fn set(&mut self, cell: IVec3, voxel: Voxel) {
        if voxel == Voxel::Empty {
            self.voxels.remove(&cell);
        } else {
            self.voxels.insert(cell, voxel);
        }
    }

    /// Fill an inclusive box of cells
    pub fn fill(&mut self, from: IVec3, to: IVec3, voxel: Voxel) {
        let lo = from.min(to);
        let hi = from.max(to);
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    self.set(IVec3::new(x, y, z), voxel);
                }
            }
        }
    }

    /// Add an actor, replacing any actor with the same id
    pub fn spawn(&mut self, actor: ActorView) {
        self.actors.retain(|a| a.id != actor.id);
        self.actors.push(actor);
    }

    pub fn despawn(&mut self, id: ActorId) {
        self.actors.retain(|a| a.id != id);
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorView> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    pub fn shooter_mut(&mut self) -> &mut ShooterState {
        &mut self.shooter
    }

    /// Advance every live actor by its velocity (demo harness helper)
    pub fn step_actors(&mut self, dt: f64) {
        for actor in self.actors.iter_mut().filter(|a| a.alive) {
            let offset = actor.velocity * dt;
            actor.position += offset;
            actor.bounds = actor.bounds.translate(offset);
            if let Some(parts) = actor.parts.as_mut() {
                for part in parts.iter_mut() {
                    *part = part.translate(offset);
                }
            }
        }
    }
}

impl VoxelQuery for GridWorld {
    fn voxel_at(&self, cell: IVec3) -> Voxel {
        self.voxels.get(&cell).copied().unwrap_or_default()
    }
}

impl WorldQuery for GridWorld {
    fn actors_in_radius(&self, center: DVec3, radius: f64) -> Vec<ActorView> {
        let radius_sq = radius * radius;
        self.actors
            .iter()
            .filter(|a| a.position.distance_squared(center) <= radius_sq)
            .cloned()
            .collect()
    }

    fn shooter_state(&self) -> ShooterState {
        self.shooter.clone()
    }
}
