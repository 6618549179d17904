//! Affine helpers shared by mesh generation, picking, and render sync.
//!
//! Transforms are `Mat4` affine matrices (no projective row).

use glam::{Mat4, Vec3};

/// Transforms a point (applies translation).
#[inline]
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    m.transform_point3(p)
}

/// Transforms a direction (ignores translation).
#[inline]
pub fn transform_vector(m: &Mat4, v: Vec3) -> Vec3 {
    m.transform_vector3(v)
}

/// Maps a world-space direction into the local frame of `m`.
///
/// Uses the full inverse so that scaled transforms map offsets correctly.
#[inline]
pub fn inverse_transform_vector(m: &Mat4, v: Vec3) -> Vec3 {
    m.inverse().transform_vector3(v)
}

/// Transforms a normal and renormalizes it, falling back to `fallback`
/// when the result degenerates.
pub fn transform_normal(m: &Mat4, n: Vec3, fallback: Vec3) -> Vec3 {
    let normal_matrix = m.inverse().transpose();
    normal_matrix
        .transform_vector3(n)
        .try_normalize()
        .unwrap_or(fallback)
}

/// Linear interpolation between two scalars.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
