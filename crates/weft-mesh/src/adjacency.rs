//! Mesh adjacency queries.
//!
//! Builds adjacency data structures from a triangle list, enabling the
//! neighbor queries fabric cooking needs (unique edges, wing vertices
//! across interior edges, 1-ring neighborhoods).

use std::collections::{BTreeMap, BTreeSet};

/// Edge and triangle adjacency of a triangle list.
///
/// Edges are stored in ascending `(v_min, v_max)` order so that cooking
/// the same mesh twice yields identical constraint ordering.
#[derive(Debug, Clone)]
pub struct Adjacency {
    /// Triangles touching each vertex.
    pub vertex_triangles: Vec<Vec<u32>>,
    /// Unique edges as `[v_min, v_max]`.
    pub edges: Vec<[u32; 2]>,
    /// Triangles sharing each edge; one for a boundary edge.
    pub edge_triangles: Vec<Vec<u32>>,
    /// Edges shared by exactly two triangles.
    pub interior_edges: Vec<InteriorEdge>,
}

/// An edge shared by two triangles, with the vertex each triangle has
/// off the edge. Bending constraints join the two wings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteriorEdge {
    pub v0: u32,
    pub v1: u32,
    pub wing_a: u32,
    pub wing_b: u32,
}

impl Adjacency {
    /// Build adjacency for `vertex_count` vertices from a triangle list.
    pub fn build(vertex_count: usize, triangles: &[[u32; 3]]) -> Self {
        let mut vertex_triangles = vec![Vec::new(); vertex_count];
        let mut edge_map: BTreeMap<(u32, u32), Vec<u32>> = BTreeMap::new();

        for (t, &[a, b, c]) in triangles.iter().enumerate() {
            let t = t as u32;
            vertex_triangles[a as usize].push(t);
            vertex_triangles[b as usize].push(t);
            vertex_triangles[c as usize].push(t);

            for (v0, v1) in [(a, b), (b, c), (c, a)] {
                edge_map.entry((v0.min(v1), v0.max(v1))).or_default().push(t);
            }
        }

        let mut edges = Vec::with_capacity(edge_map.len());
        let mut edge_triangles = Vec::with_capacity(edge_map.len());
        let mut interior_edges = Vec::new();

        for ((v0, v1), tris) in edge_map {
            edges.push([v0, v1]);

            if let &[tri_a, tri_b] = tris.as_slice() {
                interior_edges.push(InteriorEdge {
                    v0,
                    v1,
                    wing_a: wing_vertex(triangles[tri_a as usize], v0, v1),
                    wing_b: wing_vertex(triangles[tri_b as usize], v0, v1),
                });
            }
            edge_triangles.push(tris);
        }

        Self {
            vertex_triangles,
            edges,
            edge_triangles,
            interior_edges,
        }
    }

    /// Vertices sharing a triangle with `v`.
    pub fn one_ring(&self, v: u32, triangles: &[[u32; 3]]) -> BTreeSet<u32> {
        let mut neighbors = BTreeSet::new();
        for &tri in &self.vertex_triangles[v as usize] {
            for w in triangles[tri as usize] {
                if w != v {
                    neighbors.insert(w);
                }
            }
        }
        neighbors
    }

    /// Edges with a single adjacent triangle.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_triangles
            .iter()
            .filter(|tris| tris.len() == 1)
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }
}

fn wing_vertex(tri: [u32; 3], v0: u32, v1: u32) -> u32 {
    tri.into_iter()
        .find(|&v| v != v0 && v != v1)
        .unwrap_or(tri[2])
}
