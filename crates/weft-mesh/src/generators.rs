//! Procedural cloth generators.
//!
//! These generators produce deterministic, resolution-configurable sheets
//! and tubes with consistent winding order and UV coordinates. All points
//! are passed through the descriptor's affine transform.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use weft_math::transform::{lerp, transform_normal};

use crate::topology::ClothTopology;

/// Parameters for [`generate_plane`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneDesc {
    /// Extent along local X (meters).
    pub width: f32,
    /// Extent along local Z (meters).
    pub height: f32,
    /// Cells along X (point columns = `segments_x + 1`).
    pub segments_x: usize,
    /// Cells along Z (point rows = `segments_y + 1`).
    pub segments_y: usize,
    /// Also emit one quad per cell.
    pub make_quads: bool,
    /// Applied to every generated point.
    pub transform: Mat4,
    /// Flip the split diagonal of every other cell in a checkerboard.
    pub alternating_diagonals: bool,
    /// Flip the split diagonal on every other row.
    pub zigzag_mode: bool,
}

impl PlaneDesc {
    /// A `width × height` sheet with `segments_x × segments_y` cells.
    pub fn new(width: f32, height: f32, segments_x: usize, segments_y: usize) -> Self {
        Self {
            width,
            height,
            segments_x,
            segments_y,
            make_quads: false,
            transform: Mat4::IDENTITY,
            alternating_diagonals: false,
            zigzag_mode: false,
        }
    }

    pub fn with_quads(mut self) -> Self {
        self.make_quads = true;
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn alternating(mut self) -> Self {
        self.alternating_diagonals = true;
        self
    }

    pub fn zigzag(mut self) -> Self {
        self.zigzag_mode = true;
        self
    }

    /// Number of points the generator will emit.
    pub fn point_count(&self) -> usize {
        (self.segments_x + 1) * (self.segments_y + 1)
    }
}

/// Parameters for [`generate_cylinder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CylinderDesc {
    /// Radius of the top ring.
    pub radius_top: f32,
    /// Radius of the bottom ring.
    pub radius_bottom: f32,
    /// Height of the tube, centred on the origin along +Y.
    pub height: f32,
    /// Number of radial waves around the circumference.
    pub frequency: f32,
    /// Wave amplitude at the top ring.
    pub amplitude_top: f32,
    /// Wave amplitude at the bottom ring.
    pub amplitude_bottom: f32,
    /// Cells around the full circumference.
    pub segments_x: usize,
    /// Cells from top to bottom.
    pub segments_y: usize,
    /// Applied to every generated point.
    pub transform: Mat4,
    /// Pin the top ring.
    pub attach_top: bool,
    /// Pin the bottom ring.
    pub attach_bottom: bool,
    /// Also emit one quad per cell.
    pub make_quads: bool,
    /// Cells removed from the circumference, leaving an open tube.
    pub missing_x_segments: usize,
}

impl CylinderDesc {
    /// A straight, closed tube with no waves and nothing pinned.
    pub fn new(radius: f32, height: f32, segments_x: usize, segments_y: usize) -> Self {
        Self {
            radius_top: radius,
            radius_bottom: radius,
            height,
            frequency: 0.0,
            amplitude_top: 0.0,
            amplitude_bottom: 0.0,
            segments_x,
            segments_y,
            transform: Mat4::IDENTITY,
            attach_top: false,
            attach_bottom: false,
            make_quads: false,
            missing_x_segments: 0,
        }
    }

    /// Number of point columns (an open tube needs one extra seam column).
    pub fn columns(&self) -> usize {
        let cells = self.segments_x - self.missing_x_segments;
        if self.missing_x_segments > 0 {
            cells + 1
        } else {
            cells
        }
    }
}

/// Generates a rectangular cloth sheet in the local XZ plane.
///
/// The sheet spans `[-width/2, width/2]` in X and `[-height/2, height/2]` in Z,
/// facing +Y before the transform is applied. Point `(x, y)` is stored at
/// `x + y * (segments_x + 1)`.
///
/// # Example
/// ```
/// use weft_mesh::generators::{generate_plane, PlaneDesc};
/// let topo = generate_plane(&PlaneDesc::new(1.0, 1.0, 2, 2));
/// assert_eq!(topo.point_count(), 9);     // 3×3 points
/// assert_eq!(topo.triangle_count(), 8);  // 2×2 cells × 2 tris each
/// ```
pub fn generate_plane(desc: &PlaneDesc) -> ClothTopology {
    assert!(
        desc.segments_x >= 1 && desc.segments_y >= 1,
        "plane needs at least one segment per side"
    );
    assert!(desc.width > 0.0 && desc.height > 0.0, "plane dimensions must be positive");

    let sx = desc.segments_x;
    let sy = desc.segments_y;
    let cols = sx + 1;
    let rows = sy + 1;

    let mut topo = ClothTopology::with_capacity(cols * rows, sx * sy * 2);

    let top_left = Vec3::new(-0.5 * desc.width, 0.0, -0.5 * desc.height);
    let normal = transform_normal(&desc.transform, Vec3::Y, Vec3::Y);

    // Keep texels square whatever the sheet's aspect ratio.
    let uv_scale = desc.width.max(desc.height);
    let uv_sx = desc.width / uv_scale;
    let uv_sy = desc.height / uv_scale;

    for y in 0..rows {
        for x in 0..cols {
            let fx = x as f32 / sx as f32;
            let fy = y as f32 / sy as f32;
            let local = top_left + Vec3::new(fx * desc.width, 0.0, fy * desc.height);
            topo.push_point(
                desc.transform.transform_point3(local),
                normal,
                Vec2::new(fx * uv_sx, fy * uv_sy),
                1.0,
            );
        }
    }

    for y in 0..sy {
        for x in 0..sx {
            let top_left = (x + y * cols) as u32;
            let top_right = top_left + 1;
            let bot_left = top_left + cols as u32;
            let bot_right = bot_left + 1;

            let flip = if desc.alternating_diagonals {
                (x ^ y) & 1 == 1
            } else {
                desc.zigzag_mode && y & 1 == 1
            };

            if flip {
                // Split along top-right → bottom-left
                topo.triangles.push([top_left, bot_left, top_right]);
                topo.triangles.push([top_right, bot_left, bot_right]);
            } else {
                // Split along top-left → bottom-right
                topo.triangles.push([top_left, bot_left, bot_right]);
                topo.triangles.push([top_left, bot_right, top_right]);
            }

            if desc.make_quads {
                topo.quads.push([top_left, bot_left, bot_right, top_right]);
            }
        }
    }

    topo
}

/// Generates a (possibly wavy, possibly open) cloth tube around +Y.
///
/// Ring 0 is the top ring at `+height/2`. When `missing_x_segments > 0` the
/// tube is left open and gets an extra seam column; a closed tube wraps its
/// last cell back to column 0.
pub fn generate_cylinder(desc: &CylinderDesc) -> ClothTopology {
    assert!(
        desc.segments_x >= 1 && desc.segments_y >= 1,
        "cylinder needs at least one segment per side"
    );
    assert!(
        desc.missing_x_segments < desc.segments_x,
        "missing_x_segments ({}) must be less than segments_x ({})",
        desc.missing_x_segments,
        desc.segments_x
    );

    let sx = desc.segments_x;
    let sy = desc.segments_y;
    let cells_x = sx - desc.missing_x_segments;
    let cols = desc.columns();
    let rows = sy + 1;

    let mut topo = ClothTopology::with_capacity(cols * rows, cells_x * sy * 2);

    for y in 0..rows {
        let t = y as f32 / sy as f32;
        let ring_radius = lerp(desc.radius_top, desc.radius_bottom, t);
        let amplitude = lerp(desc.amplitude_top, desc.amplitude_bottom, t);
        let ring_height = desc.height * (0.5 - t);

        let pinned = (desc.attach_top && y == 0) || (desc.attach_bottom && y == sy);
        let inv_mass = if pinned { 0.0 } else { 1.0 };

        for x in 0..cols {
            let angle = std::f32::consts::TAU * x as f32 / sx as f32;
            let (sin, cos) = angle.sin_cos();
            let radius = ring_radius + amplitude * (desc.frequency * angle).sin();

            let local = Vec3::new(cos * radius, ring_height, sin * radius);
            let radial = Vec3::new(cos, 0.0, sin);
            topo.push_point(
                desc.transform.transform_point3(local),
                transform_normal(&desc.transform, radial, radial),
                Vec2::new(x as f32 / sx as f32, t),
                inv_mass,
            );
        }
    }

    for y in 0..sy {
        for x in 0..cells_x {
            // Closed tubes wrap the last cell onto column 0.
            let next = (x + 1) % cols;
            let i0 = (x + y * cols) as u32;
            let i1 = (next + y * cols) as u32;
            let i2 = (x + (y + 1) * cols) as u32;
            let i3 = (next + (y + 1) * cols) as u32;

            topo.triangles.push([i0, i1, i3]);
            topo.triangles.push([i0, i3, i2]);

            if desc.make_quads {
                topo.quads.push([i0, i1, i3, i2]);
            }
        }
    }

    topo
}
