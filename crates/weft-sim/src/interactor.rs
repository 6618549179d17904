//! Ray-based particle picking and soft-falloff dragging.
//!
//! `Idle → Dragging → Idle`, driven by pointer events:
//!
//! - **down**: every particle is projected onto the pick ray; the
//!   candidate with the lowest `distance + offset_weight * offset` wins,
//!   provided its perpendicular offset is under the pick tolerance.
//! - **move**: the target is the point on the new ray at the recorded
//!   distance. The clamped world offset from the dragged particle to the
//!   target is taken into the cloth's local space and subtracted from the
//!   *previous* positions of nearby movable particles, weighted by a
//!   linear falloff, then blended toward current positions. Verlet
//!   integration turns that into a velocity on the next step.
//! - **up**: back to idle.

use glam::{Mat4, Vec2, Vec4, Vec4Swizzles};
use weft_math::transform::inverse_transform_vector;
use weft_math::Ray;
use weft_types::constants::INV_MASS_EPSILON;
use weft_types::ParticleId;

use crate::config::DragConfig;
use crate::registry::ClothKey;

/// Best score before any particle has been considered.
const NO_CANDIDATE: f32 = 9_999_999.0;

/// Pointer input in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
}

/// Single-slot drag state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        cloth: ClothKey,
        particle: ParticleId,
        /// Distance along the pick ray, reused on every move.
        distance: f32,
        /// Perpendicular offset at pick time.
        offset: f32,
    },
}

/// A pick result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub cloth: ClothKey,
    pub particle: ParticleId,
    pub distance: f32,
    pub offset: f32,
}

/// Displacement applied by one drag update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragUpdate {
    /// World-space offset after clamping.
    pub world_offset: glam::Vec3,
    /// Particles whose previous position received a non-zero weight.
    pub affected: usize,
}

/// Picking/dragging state machine.
#[derive(Debug, Clone)]
pub struct Interactor {
    config: DragConfig,
    state: DragState,
}

impl Interactor {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Finds the best particle under `ray` among `candidates`
    /// (cloth, world transform, particles) without changing state.
    pub fn pick<'a>(
        &self,
        ray: &Ray,
        candidates: impl IntoIterator<Item = (ClothKey, Mat4, &'a [Vec4])>,
    ) -> Option<PickHit> {
        let mut best_score = NO_CANDIDATE;
        let mut hit = None;

        for (cloth, transform, particles) in candidates {
            for (i, p) in particles.iter().enumerate() {
                let world = transform.transform_point3(p.xyz());
                let projection = ray.project(world);
                if projection.distance < 0.0 || projection.offset >= self.config.pick_tolerance {
                    continue;
                }
                let score = projection.distance + self.config.pick_offset_weight * projection.offset;
                if score < best_score {
                    best_score = score;
                    hit = Some(PickHit {
                        cloth,
                        particle: ParticleId::from(i),
                        distance: projection.distance,
                        offset: projection.offset,
                    });
                }
            }
        }
        hit
    }

    /// Enters `Dragging` on a hit, otherwise stays idle.
    pub fn begin<'a>(
        &mut self,
        ray: &Ray,
        candidates: impl IntoIterator<Item = (ClothKey, Mat4, &'a [Vec4])>,
    ) -> Option<PickHit> {
        let hit = self.pick(ray, candidates);
        self.state = match hit {
            Some(h) => DragState::Dragging {
                cloth: h.cloth,
                particle: h.particle,
                distance: h.distance,
                offset: h.offset,
            },
            None => DragState::Idle,
        };
        hit
    }

    /// Applies one drag step to the dragged cloth's buffers.
    ///
    /// `transform` is the cloth's world transform. Pinned particles are
    /// never written.
    pub fn drag(&self, ray: &Ray, transform: Mat4, current: &[Vec4], previous: &mut [Vec4]) -> Option<DragUpdate> {
        let DragState::Dragging { particle, distance, .. } = self.state else {
            return None;
        };
        let dragged = current.get(particle.index())?.xyz();

        let target = ray.point_at(distance);
        let world_offset = (target - transform.transform_point3(dragged))
            .clamp_length_max(self.config.max_offset);
        let local_offset = inverse_transform_vector(&transform, world_offset);

        let radius = self.config.soft_selection_radius;
        let blend = self.config.previous_blend;
        let mut affected = 0;

        for (cur, prev) in current.iter().zip(previous.iter_mut()) {
            if cur.w <= INV_MASS_EPSILON {
                continue;
            }
            let falloff = (1.0 - cur.xyz().distance(dragged) / radius).clamp(0.0, 1.0);
            let weight = falloff * self.config.max_weight;
            if weight > 0.0 {
                affected += 1;
            }
            let nudged = (prev.xyz() - local_offset * weight) * blend + cur.xyz() * (1.0 - blend);
            *prev = nudged.extend(prev.w);
        }

        Some(DragUpdate {
            world_offset,
            affected,
        })
    }

    /// Returns to idle. Reports whether a drag was in progress.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }

    /// Drops the drag if it targets `cloth`.
    pub(crate) fn forget(&mut self, cloth: ClothKey) {
        if matches!(self.state, DragState::Dragging { cloth: c, .. } if c == cloth) {
            self.state = DragState::Idle;
        }
    }
}

impl Default for Interactor {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}
