//! Screen-to-world ray casting.

use glam::{Mat4, Vec2, Vec3};
use weft_math::Ray;

/// Produces a world-space ray through a screen point (pixels, origin top-left).
pub trait RayCaster {
    fn screen_point_to_ray(&self, screen: Vec2) -> Ray;
}

/// A camera defined by its view and projection matrices and viewport size.
///
/// Projections are expected to map depth to `[0, 1]`, as glam's
/// `perspective_rh` does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    inverse_view_projection: Mat4,
    viewport: Vec2,
}

impl ViewCamera {
    pub fn new(view: Mat4, projection: Mat4, viewport: Vec2) -> Self {
        Self {
            inverse_view_projection: (projection * view).inverse(),
            viewport,
        }
    }

    /// Perspective camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, fov_y: f32, viewport: Vec2) -> Self {
        let aspect = viewport.x / viewport.y.max(1.0);
        let view = Mat4::look_at_rh(eye, target, up);
        let projection = Mat4::perspective_rh(fov_y, aspect, 0.01, 100.0);
        Self::new(view, projection, viewport)
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }
}

impl RayCaster for ViewCamera {
    fn screen_point_to_ray(&self, screen: Vec2) -> Ray {
        let ndc = Vec2::new(
            2.0 * screen.x / self.viewport.x - 1.0,
            1.0 - 2.0 * screen.y / self.viewport.y,
        );
        let near = self
            .inverse_view_projection
            .project_point3(ndc.extend(0.0));
        let far = self
            .inverse_view_projection
            .project_point3(ndc.extend(1.0));
        Ray::through(near, far)
    }
}
