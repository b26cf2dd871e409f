//! Line-of-sight diagnostics

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::world::VoxelQuery;

/// Most samples taken along the sight line
const MAX_SAMPLES: usize = 20;
/// Spacing between samples
const SAMPLE_SPACING: f64 = 2.0;

/// Diagnostic summary of the straight line from shooter to target
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentalFactors {
    /// Fraction of line samples that land in non-open voxels
    pub obstruction_ratio: f64,
    /// `target.y - start.y`
    pub elevation_delta: f64,
}

pub fn analyze<V: VoxelQuery + ?Sized>(world: &V, start: DVec3, target: DVec3) -> EnvironmentalFactors {
    let delta = target - start;
    let samples = ((delta.length() / SAMPLE_SPACING).floor() as usize).min(MAX_SAMPLES);

    let obstruction_ratio = if samples < 2 {
        0.0
    } else {
        let blocked = (1..samples)
            .map(|i| start + delta * (i as f64 / samples as f64))
            .filter(|p| !world.occupancy(*p).is_open())
            .count();
        blocked as f64 / samples as f64
    };

    EnvironmentalFactors {
        obstruction_ratio,
        elevation_delta: delta.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{GridWorld, Voxel};
    use glam::IVec3;

    #[test]
    fn test_clear_line() {
        let world = GridWorld::default();
        let f = analyze(&world, DVec3::ZERO, DVec3::new(20.0, 3.0, 0.0));
        assert_eq!(f.obstruction_ratio, 0.0);
        assert!((f.elevation_delta - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_line_has_no_ratio() {
        let mut world = GridWorld::default();
        world.set(IVec3::new(1, 0, 0), Voxel::Solid);
        let f = analyze(&world, DVec3::new(0.0, 0.5, 0.5), DVec3::new(3.0, 0.5, 0.5));
        assert_eq!(f.obstruction_ratio, 0.0);
    }

    #[test]
    fn test_wall_counts_samples() {
        let mut world = GridWorld::default();
        world.fill(IVec3::new(5, -5, -5), IVec3::new(9, 5, 5), Voxel::Solid);
        // 20 units, 10 samples, points at x = 2, 4, ... 18
        let f = analyze(&world, DVec3::new(0.0, 0.5, 0.5), DVec3::new(20.0, 0.5, 0.5));
        // x = 6 and 8 fall inside the wall
        assert!((f.obstruction_ratio - 0.2).abs() < 1e-12);
    }
}
