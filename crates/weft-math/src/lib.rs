//! # weft-math
//!
//! Math primitives for the Weft cloth orchestration engine.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Vec4`, `Mat4`, etc.)
//! - [`Ray`] for screen-space picking
//! - Affine helpers for moving particles between local and world space

pub mod ray;
pub mod transform;

pub use ray::Ray;

// Re-export glam types as the canonical math types for Weft.
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4, Vec4Swizzles};
