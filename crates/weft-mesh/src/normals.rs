//! Vertex normal computation from triangle mesh data.
//!
//! Computes area-weighted vertex normals by accumulating
//! face normals from each adjacent triangle.

use glam::Vec3;
use weft_types::constants::DEGENERATE_NORMAL_THRESHOLD;

use crate::render::RenderMesh;

/// Area-weighted vertex normals for `positions` indexed by `triangles`.
///
/// Vertices whose accumulated normal is (near) zero, e.g. isolated points
/// or fully collapsed fans, get `fallback` instead of a NaN.
pub fn vertex_normals(positions: &[Vec3], triangles: &[[u32; 3]], fallback: Vec3) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for &[a, b, c] in triangles {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        // Magnitude = 2 × triangle area
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }

    for n in &mut normals {
        *n = if n.length_squared() > DEGENERATE_NORMAL_THRESHOLD {
            n.normalize()
        } else {
            fallback
        };
    }
    normals
}

/// Recompute a render mesh's vertex normals in place.
///
/// Degenerate vertices fall back to +Y.
pub fn compute_vertex_normals(mesh: &mut RenderMesh) {
    let n = mesh.vertex_count();
    let tri_count = mesh.triangle_count();

    for i in 0..n {
        mesh.normal_x[i] = 0.0;
        mesh.normal_y[i] = 0.0;
        mesh.normal_z[i] = 0.0;
    }

    for t in 0..tri_count {
        let [ia, ib, ic] = mesh.triangle(t);
        let (a, b, c) = (ia as usize, ib as usize, ic as usize);

        let pa = mesh.position(a);
        let face = (mesh.position(b) - pa).cross(mesh.position(c) - pa);

        for v in [a, b, c] {
            mesh.normal_x[v] += face.x;
            mesh.normal_y[v] += face.y;
            mesh.normal_z[v] += face.z;
        }
    }

    for i in 0..n {
        let normal = mesh.normal(i);
        let unit = if normal.length_squared() > DEGENERATE_NORMAL_THRESHOLD {
            normal.normalize()
        } else {
            Vec3::Y
        };
        mesh.normal_x[i] = unit.x;
        mesh.normal_y[i] = unit.y;
        mesh.normal_z[i] = unit.z;
    }
}
