//! Solver-consumable mesh descriptions.
//!
//! A [`MeshDescription`] is what gets cooked into a fabric: points,
//! triangles (and optional quads), per-point inverse mass, plus the
//! parallel [`RenderMesh`] the renderer draws. Pinning helpers zero out
//! inverse masses; [`MeshDescription::merge`] concatenates descriptions
//! with index rewriting so several sheets can share one cloth instance.

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tracing::debug;
use weft_types::constants::INV_MASS_EPSILON;
use weft_types::{WeftError, WeftResult};

use crate::normals::vertex_normals;
use crate::render::RenderMesh;
use crate::topology::ClothTopology;

/// Cloth mesh ready for fabric cooking.
///
/// Invariant: `points`, `inv_masses` and the render mesh's vertices have
/// the same length, and every triangle/quad index is a valid point index.
/// [`validate`](Self::validate) checks both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshDescription {
    /// Particle rest positions.
    pub points: Vec<Vec3>,
    /// Triangle list.
    pub triangles: Vec<[u32; 3]>,
    /// Optional quads over the same surface.
    pub quads: Vec<[u32; 4]>,
    /// Per-point inverse mass (0 = pinned).
    pub inv_masses: Vec<f32>,
    /// Parallel render mesh.
    pub render: RenderMesh,
}

/// Raw position input for [`MeshDescription::build_from_raw_buffers`].
#[derive(Debug, Clone, Copy)]
pub enum PositionBuffer<'a> {
    /// Flat `[x0, y0, z0, x1, ...]` floats.
    Packed(&'a [f32]),
    /// One vector per point.
    Vectors(&'a [Vec3]),
}

impl PositionBuffer<'_> {
    /// Number of whole points in the buffer.
    pub fn point_count(&self) -> usize {
        match self {
            Self::Packed(data) => data.len() / 3,
            Self::Vectors(data) => data.len(),
        }
    }

    /// Iterates over whole points.
    pub fn iter(&self) -> Box<dyn Iterator<Item = Vec3> + '_> {
        match self {
            Self::Packed(data) => Box::new(data.chunks_exact(3).map(Vec3::from_slice)),
            Self::Vectors(data) => Box::new(data.iter().copied()),
        }
    }
}

/// Index input of either width, read through one code path.
#[derive(Debug, Clone, Copy)]
pub enum IndexBuffer<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl IndexBuffer<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::U16(data) => data.len(),
            Self::U32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over indices widened to `u32`.
    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Self::U16(data) => Box::new(data.iter().map(|&i| u32::from(i))),
            Self::U32(data) => Box::new(data.iter().copied()),
        }
    }
}

impl MeshDescription {
    /// Wraps generated topology, building the render mirror alongside.
    pub fn from_topology(topo: ClothTopology) -> Self {
        let render = RenderMesh::from_topology(&topo);
        Self {
            points: topo.points,
            triangles: topo.triangles,
            quads: topo.quads,
            inv_masses: topo.inv_masses,
            render,
        }
    }

    /// Ingests externally provided positions and a flat triangle index list.
    ///
    /// Positions are transformed by `transform`, every point gets inverse
    /// mass 1, and render normals are recomputed from the triangles.
    /// Fails with fewer than 3 points or 3 indices, an index count not
    /// divisible by 3, or an out-of-range index.
    pub fn build_from_raw_buffers(
        positions: PositionBuffer<'_>,
        indices: IndexBuffer<'_>,
        transform: Mat4,
    ) -> WeftResult<Self> {
        if let PositionBuffer::Packed(data) = positions {
            if data.len() % 3 != 0 {
                return Err(WeftError::InvalidMesh(format!(
                    "Packed position count ({}) is not divisible by 3",
                    data.len()
                )));
            }
        }
        let n = positions.point_count();
        if n < 3 {
            return Err(WeftError::InvalidMesh(format!(
                "Need at least 3 points, got {n}"
            )));
        }
        if indices.len() < 3 {
            return Err(WeftError::InvalidMesh(format!(
                "Need at least 3 indices, got {}",
                indices.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(WeftError::InvalidMesh(format!(
                "Index count ({}) is not divisible by 3",
                indices.len()
            )));
        }

        let points: Vec<Vec3> = positions
            .iter()
            .map(|p| transform.transform_point3(p))
            .collect();

        let flat: Vec<u32> = indices.iter().collect();
        if let Some((at, &bad)) = flat.iter().enumerate().find(|&(_, &i)| i as usize >= n) {
            return Err(WeftError::InvalidMesh(format!(
                "Index {bad} at position {at} is out of range (point count: {n})"
            )));
        }
        let triangles: Vec<[u32; 3]> = flat.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();

        let normals = vertex_normals(&points, &triangles, Vec3::Y);
        let mut render = RenderMesh::with_capacity(n, triangles.len());
        for (p, normal) in points.iter().zip(&normals) {
            render.push_vertex(*p, *normal, Vec2::ZERO);
        }
        render.indices = flat;

        debug!(points = n, triangles = triangles.len(), "ingested raw mesh buffers");

        Ok(Self {
            inv_masses: vec![1.0; n],
            points,
            triangles,
            quads: Vec::new(),
            render,
        })
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

    /// Returns the number of quads.
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Returns true if point `i` is pinned.
    #[inline]
    pub fn is_pinned(&self, i: usize) -> bool {
        self.inv_masses[i] <= INV_MASS_EPSILON
    }

    /// Number of pinned points.
    pub fn pinned_count(&self) -> usize {
        (0..self.point_count()).filter(|&i| self.is_pinned(i)).count()
    }

    /// Validates description integrity.
    ///
    /// Checks:
    /// - At least 3 points and 1 triangle
    /// - Point, inverse-mass and render-vertex counts agree
    /// - Every triangle/quad index is a valid point index
    /// - Inverse masses are finite and non-negative
    pub fn validate(&self) -> WeftResult<()> {
        let n = self.point_count();
        if n < 3 || self.triangles.is_empty() {
            return Err(WeftError::InvalidMesh(format!(
                "Description needs at least 3 points and 1 triangle (got {} points, {} triangles)",
                n,
                self.triangles.len()
            )));
        }
        if self.inv_masses.len() != n {
            return Err(WeftError::InvalidMesh(format!(
                "Inverse mass count ({}) != point count ({})",
                self.inv_masses.len(),
                n
            )));
        }
        if self.render.vertex_count() != n {
            return Err(WeftError::InvalidMesh(format!(
                "Render vertex count ({}) != point count ({})",
                self.render.vertex_count(),
                n
            )));
        }
        let tri_indices = self.triangles.iter().flatten();
        let quad_indices = self.quads.iter().flatten();
        if let Some(&bad) = tri_indices.chain(quad_indices).find(|&&i| i as usize >= n) {
            return Err(WeftError::InvalidMesh(format!(
                "Index {bad} is out of range (point count: {n})"
            )));
        }
        if let Some(bad) = self.inv_masses.iter().find(|m| !m.is_finite() || **m < 0.0) {
            return Err(WeftError::InvalidMesh(format!(
                "Inverse mass {bad} is not a finite non-negative number"
            )));
        }
        self.render.validate()
    }

    /// Sets the inverse mass of every movable point to `value`.
    ///
    /// Points already pinned keep inverse mass 0, so pin first and set
    /// the mass second.
    pub fn set_uniform_inverse_mass(&mut self, value: f32) {
        for m in &mut self.inv_masses {
            if *m > INV_MASS_EPSILON {
                *m = value;
            }
        }
    }

    /// Pins a whole edge of a generated plane.
    ///
    /// `by_width` pins the first row (`y == 0`), otherwise the first
    /// column (`x == 0`).
    pub fn pin_by_side(&mut self, segments_x: usize, segments_y: usize, by_width: bool) {
        self.assert_plane_layout(segments_x, segments_y);
        let cols = segments_x + 1;
        if by_width {
            for x in 0..cols {
                self.inv_masses[x] = 0.0;
            }
        } else {
            for y in 0..=segments_y {
                self.inv_masses[y * cols] = 0.0;
            }
        }
    }

    /// Pins only the two corners of an edge of a generated plane, as for a flag.
    ///
    /// `by_width` pins both ends of the first row, otherwise both ends of
    /// the first column.
    pub fn pin_by_corner_angles(&mut self, segments_x: usize, segments_y: usize, by_width: bool) {
        self.assert_plane_layout(segments_x, segments_y);
        let cols = segments_x + 1;
        self.inv_masses[0] = 0.0;
        if by_width {
            self.inv_masses[segments_x] = 0.0;
        } else {
            self.inv_masses[segments_y * cols] = 0.0;
        }
    }

    /// Pins every point within `threshold` of the highest point (+Y).
    pub fn pin_topmost(&mut self, threshold: f32) {
        let Some(top) = self.points.iter().map(|p| p.y).reduce(f32::max) else {
            return;
        };
        for (p, m) in self.points.iter().zip(&mut self.inv_masses) {
            if p.y >= top - threshold {
                *m = 0.0;
            }
        }
    }

    /// Appends `other`, rewriting its triangle/quad indices past this
    /// description's points.
    ///
    /// The existing points, masses and render vertices are left untouched.
    pub fn merge(&mut self, other: &MeshDescription) {
        let offset = self.point_count() as u32;
        self.points.extend_from_slice(&other.points);
        self.inv_masses.extend_from_slice(&other.inv_masses);
        self.triangles
            .extend(other.triangles.iter().map(|t| t.map(|i| i + offset)));
        self.quads
            .extend(other.quads.iter().map(|q| q.map(|i| i + offset)));
        self.render.append(&other.render);
    }

    /// Applies an affine transform to points and render vertices.
    pub fn apply_transform(&mut self, m: &Mat4) {
        for (i, p) in self.points.iter_mut().enumerate() {
            *p = m.transform_point3(*p);
            self.render.set_position(i, *p);
        }
        let normal_matrix = m.inverse().transpose();
        for i in 0..self.render.vertex_count() {
            let n = self.render.normal(i);
            let t = normal_matrix.transform_vector3(n).try_normalize().unwrap_or(n);
            self.render.normal_x[i] = t.x;
            self.render.normal_y[i] = t.y;
            self.render.normal_z[i] = t.z;
        }
    }

    /// Mean of all points (origin for an empty description).
    pub fn center_of_mass(&self) -> Vec3 {
        if self.points.is_empty() {
            return Vec3::ZERO;
        }
        self.points.iter().copied().sum::<Vec3>() / self.points.len() as f32
    }

    /// Initial particle buffer: xyz = rest position, w = inverse mass.
    pub fn initial_particles(&self) -> Vec<Vec4> {
        self.points
            .iter()
            .zip(&self.inv_masses)
            .map(|(p, &w)| p.extend(w))
            .collect()
    }

    fn assert_plane_layout(&self, segments_x: usize, segments_y: usize) {
        assert_eq!(
            self.point_count(),
            (segments_x + 1) * (segments_y + 1),
            "pinning expects a {segments_x}×{segments_y} plane layout"
        );
    }
}
