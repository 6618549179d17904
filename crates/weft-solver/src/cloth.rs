//! Particle state of one cloth instance.
//!
//! Each particle is a `Vec4`: xyz = position, w = inverse mass
//! (0 = pinned). Velocity is implicit in `current - previous`, so the
//! previous buffer is part of the simulation state, not a history.

use std::sync::Arc;

use glam::{Vec4, Vec4Swizzles};
use weft_types::constants::INV_MASS_EPSILON;
use weft_types::{WeftError, WeftResult};

use crate::backend::ClothSim;
use crate::fabric::Fabric;

/// Reference cloth instance used by the CPU backend.
#[derive(Debug, Clone)]
pub struct Cloth {
    fabric: Arc<Fabric>,
    current: Vec<Vec4>,
    previous: Vec<Vec4>,
}

impl Cloth {
    /// Creates a cloth at rest: previous equals current.
    pub fn new(particles: Vec<Vec4>, fabric: Arc<Fabric>) -> WeftResult<Self> {
        if particles.len() != fabric.particle_count() {
            return Err(WeftError::InvalidMesh(format!(
                "Particle count ({}) != fabric particle count ({})",
                particles.len(),
                fabric.particle_count()
            )));
        }
        Ok(Self {
            previous: particles.clone(),
            current: particles,
            fabric,
        })
    }
}

impl ClothSim for Cloth {
    fn fabric(&self) -> &Arc<Fabric> {
        &self.fabric
    }

    fn current_particles(&self) -> &[Vec4] {
        &self.current
    }

    fn current_particles_mut(&mut self) -> &mut [Vec4] {
        &mut self.current
    }

    fn previous_particles(&self) -> &[Vec4] {
        &self.previous
    }

    fn previous_particles_mut(&mut self) -> &mut [Vec4] {
        &mut self.previous
    }

    fn buffers_mut(&mut self) -> (&mut [Vec4], &mut [Vec4]) {
        (&mut self.current, &mut self.previous)
    }
}

/// Total kinetic energy: 0.5 * Σ m_i * ||v_i||², with v = (cur - prev) / dt.
///
/// Pinned particles carry no kinetic energy.
pub fn kinetic_energy(cloth: &dyn ClothSim, dt: f32) -> f64 {
    let inv_dt = 1.0 / dt as f64;
    cloth
        .current_particles()
        .iter()
        .zip(cloth.previous_particles())
        .filter(|(cur, _)| cur.w > INV_MASS_EPSILON)
        .map(|(cur, prev)| {
            let v = (cur.xyz() - prev.xyz()).as_dvec3() * inv_dt;
            0.5 * v.length_squared() / cur.w as f64
        })
        .sum()
}

/// Lowest particle height in the cloth.
pub fn lowest_point(cloth: &dyn ClothSim) -> f32 {
    cloth
        .current_particles()
        .iter()
        .map(|p| p.y)
        .fold(f32::INFINITY, f32::min)
}
