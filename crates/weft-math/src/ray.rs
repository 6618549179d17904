//! World-space rays produced by the camera for particle picking.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use weft_types::constants::EPSILON;

/// A half-line `origin + t * direction` with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Ray start (usually the camera eye or near-plane point).
    pub origin: Vec3,
    /// Normalized direction.
    pub direction: Vec3,
}

/// Where a point sits relative to a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayProjection {
    /// Signed distance along the ray to the closest point.
    pub distance: f32,
    /// Perpendicular distance between the point and the ray's line.
    pub offset: f32,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// A zero direction falls back to `-Z` (the conventional view axis).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = if direction.length_squared() > EPSILON {
            direction.normalize()
        } else {
            Vec3::NEG_Z
        };
        Self { origin, direction }
    }

    /// Creates a ray from `from` through `to`.
    pub fn through(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Point at signed distance `t` along the ray.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Projects `point` onto the ray's line.
    #[inline]
    pub fn project(&self, point: Vec3) -> RayProjection {
        let rel = point - self.origin;
        let distance = self.direction.dot(rel);
        let offset = (rel - self.direction * distance).length();
        RayProjection { distance, offset }
    }
}
