//! Render-mesh mirror of a cloth.
//!
//! Channels are stored one per array (`pos_x`, `pos_y`, ... ) so a
//! renderer can upload them without repacking. The simulation controller
//! rewrites the position channels from the particle buffers once per
//! frame; the renderer only reads.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use weft_types::{WeftError, WeftResult};

use crate::topology::ClothTopology;

/// Positions, normals and UVs the renderer draws, plus a flat index list.
///
/// Vertex `i` of the render mesh mirrors particle `i` of its cloth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderMesh {
    pub pos_x: Vec<f32>,
    pub pos_y: Vec<f32>,
    pub pos_z: Vec<f32>,

    pub normal_x: Vec<f32>,
    pub normal_y: Vec<f32>,
    pub normal_z: Vec<f32>,

    pub uv_u: Vec<f32>,
    pub uv_v: Vec<f32>,

    /// `[t0v0, t0v1, t0v2, t1v0, ...]`
    pub indices: Vec<u32>,
}

impl RenderMesh {
    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the position of vertex `i`.
    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Returns the normal of vertex `i`.
    #[inline]
    pub fn normal(&self, i: usize) -> Vec3 {
        Vec3::new(self.normal_x[i], self.normal_y[i], self.normal_z[i])
    }

    /// Returns the texture coordinate of vertex `i`.
    #[inline]
    pub fn uv(&self, i: usize) -> Vec2 {
        Vec2::new(self.uv_u[i], self.uv_v[i])
    }

    /// Returns the three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Sets the position of vertex `i`.
    #[inline]
    pub fn set_position(&mut self, i: usize, p: Vec3) {
        self.pos_x[i] = p.x;
        self.pos_y[i] = p.y;
        self.pos_z[i] = p.z;
    }

    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            pos_z: Vec::with_capacity(vertex_capacity),
            normal_x: Vec::with_capacity(vertex_capacity),
            normal_y: Vec::with_capacity(vertex_capacity),
            normal_z: Vec::with_capacity(vertex_capacity),
            uv_u: Vec::with_capacity(vertex_capacity),
            uv_v: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
        }
    }

    /// Appends one vertex.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) {
        self.pos_x.push(position.x);
        self.pos_y.push(position.y);
        self.pos_z.push(position.z);
        self.normal_x.push(normal.x);
        self.normal_y.push(normal.y);
        self.normal_z.push(normal.z);
        self.uv_u.push(uv.x);
        self.uv_v.push(uv.y);
    }

    /// Builds the render mirror of a generated topology.
    pub fn from_topology(topo: &ClothTopology) -> Self {
        let mut mesh = Self::with_capacity(topo.point_count(), topo.triangle_count());
        for i in 0..topo.point_count() {
            mesh.push_vertex(topo.points[i], topo.normals[i], topo.uvs[i]);
        }
        mesh.indices.extend(topo.triangles.iter().flatten());
        mesh
    }

    /// Appends `other`, offsetting its indices by this mesh's vertex count.
    pub fn append(&mut self, other: &RenderMesh) {
        let offset = self.vertex_count() as u32;
        self.pos_x.extend_from_slice(&other.pos_x);
        self.pos_y.extend_from_slice(&other.pos_y);
        self.pos_z.extend_from_slice(&other.pos_z);
        self.normal_x.extend_from_slice(&other.normal_x);
        self.normal_y.extend_from_slice(&other.normal_y);
        self.normal_z.extend_from_slice(&other.normal_z);
        self.uv_u.extend_from_slice(&other.uv_u);
        self.uv_v.extend_from_slice(&other.uv_v);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Overwrites vertex positions from a particle buffer (xyz + inverse mass).
    ///
    /// The homogeneous inverse-mass component is dropped.
    pub fn copy_positions_from_particles(&mut self, particles: &[Vec4]) -> WeftResult<()> {
        if particles.len() != self.vertex_count() {
            return Err(WeftError::InvariantViolation(format!(
                "particle count ({}) != render vertex count ({})",
                particles.len(),
                self.vertex_count()
            )));
        }
        for (i, p) in particles.iter().enumerate() {
            self.pos_x[i] = p.x;
            self.pos_y[i] = p.y;
            self.pos_z[i] = p.z;
        }
        Ok(())
    }

    /// Checks that every channel has one entry per vertex and every
    /// index names a vertex.
    pub fn validate(&self) -> WeftResult<()> {
        let n = self.vertex_count();
        let channels = [
            ("pos_y", &self.pos_y),
            ("pos_z", &self.pos_z),
            ("normal_x", &self.normal_x),
            ("normal_y", &self.normal_y),
            ("normal_z", &self.normal_z),
            ("uv_u", &self.uv_u),
            ("uv_v", &self.uv_v),
        ];
        if let Some((name, channel)) = channels.iter().find(|(_, c)| c.len() != n) {
            return Err(WeftError::InvalidMesh(format!(
                "Render channel {name} has {} entries, expected {n}",
                channel.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(WeftError::InvalidMesh(format!(
                "Render index count ({}) is not divisible by 3",
                self.indices.len()
            )));
        }
        if let Some(&idx) = self.indices.iter().find(|&&idx| idx as usize >= n) {
            return Err(WeftError::InvalidMesh(format!(
                "Render index {idx} is out of range (vertex count: {n})"
            )));
        }
        Ok(())
    }
}
