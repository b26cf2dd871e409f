//! Axis-aligned collision volumes

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box. `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    min: DVec3,
    max: DVec3,
}

impl Volume {
    /// Box spanning two corners (in any order)
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box of `size` centered on `center`
    pub fn from_center(center: DVec3, size: DVec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    /// Actor-style box: `width` wide on X/Z, `height` tall, standing on `feet`
    pub fn from_feet(feet: DVec3, width: f64, height: f64) -> Self {
        let half = width.abs() * 0.5;
        Self::new(
            DVec3::new(feet.x - half, feet.y, feet.z - half),
            DVec3::new(feet.x + half, feet.y + height.abs(), feet.z + half),
        )
    }

    #[inline]
    pub fn min(&self) -> DVec3 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> DVec3 {
        self.max
    }

    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Width, height, depth
    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// width * height * depth
    #[inline]
    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Min-inclusive, max-exclusive containment
    #[inline]
    pub fn contains(&self, p: DVec3) -> bool {
        p.x >= self.min.x
            && p.x < self.max.x
            && p.y >= self.min.y
            && p.y < self.max.y
            && p.z >= self.min.z
            && p.z < self.max.z
    }

    /// Grow by `by` on each side (negative shrinks, never past the center)
    pub fn expand(&self, by: DVec3) -> Self {
        let center = self.center();
        let min = (self.min - by).min(center);
        let max = (self.max + by).max(center);
        Self { min, max }
    }

    pub fn translate(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
