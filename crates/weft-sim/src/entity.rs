//! The scene object that owns a cloth instance.

use glam::Mat4;

/// Supplies a cloth's local-to-world transform.
///
/// Read during picking and dragging; the simulation never writes it.
pub trait OwningEntity: Send + Sync {
    fn world_transform(&self) -> Mat4;
}

/// An entity with a fixed transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticEntity(pub Mat4);

impl StaticEntity {
    pub fn identity() -> Self {
        Self(Mat4::IDENTITY)
    }
}

impl Default for StaticEntity {
    fn default() -> Self {
        Self::identity()
    }
}

impl OwningEntity for StaticEntity {
    fn world_transform(&self) -> Mat4 {
        self.0
    }
}
