//! Raw generated topology, before it is wrapped into a [`MeshDescription`].
//!
//! [`MeshDescription`]: crate::description::MeshDescription

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Vertex/index data produced by a procedural generator.
///
/// Every per-point array has the same length; triangle and quad indices
/// reference into them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClothTopology {
    /// Point positions.
    pub points: Vec<Vec3>,
    /// Per-point normals.
    pub normals: Vec<Vec3>,
    /// Per-point texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Per-point inverse mass (0 = pinned).
    pub inv_masses: Vec<f32>,
    /// Triangle list.
    pub triangles: Vec<[u32; 3]>,
    /// Optional quad list covering the same surface as `triangles`.
    pub quads: Vec<[u32; 4]>,
}

impl ClothTopology {
    /// Creates an empty topology with pre-allocated capacity.
    pub fn with_capacity(points: usize, triangles: usize) -> Self {
        Self {
            points: Vec::with_capacity(points),
            normals: Vec::with_capacity(points),
            uvs: Vec::with_capacity(points),
            inv_masses: Vec::with_capacity(points),
            triangles: Vec::with_capacity(triangles),
            quads: Vec::new(),
        }
    }

    /// Returns the number of points.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Appends one point with all of its attributes.
    #[inline]
    pub fn push_point(&mut self, position: Vec3, normal: Vec3, uv: Vec2, inv_mass: f32) {
        self.points.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.inv_masses.push(inv_mass);
    }

    /// Applies an affine transform to positions and normals.
    pub fn transform(&mut self, m: &Mat4) {
        for p in &mut self.points {
            *p = m.transform_point3(*p);
        }
        for n in &mut self.normals {
            *n = weft_math::transform::transform_normal(m, *n, *n);
        }
    }

    /// Returns the largest index referenced by any triangle or quad.
    pub fn max_index(&self) -> Option<u32> {
        let tri_max = self.triangles.iter().flatten().copied().max();
        let quad_max = self.quads.iter().flatten().copied().max();
        tri_max.max(quad_max)
    }
}
