//! Reference CPU backend.
//!
//! Position-based Verlet integration: velocity is `current - previous`,
//! constraints are projected phase by phase weighted by inverse mass,
//! and tethers clamp how far a particle may stray from its anchor.
//! Pinned particles (w = 0) never move.

use std::sync::Arc;
use std::time::Instant;

use glam::{Vec3, Vec4, Vec4Swizzles};
use tracing::{trace, warn};
use weft_mesh::MeshDescription;
use weft_types::constants::{EPSILON, INV_MASS_EPSILON};
use weft_types::{ClothId, WeftError, WeftResult};

use crate::backend::{ClothFactory, ClothSim, PhysicsBackend, Solver, StepResult};
use crate::cloth::Cloth;
use crate::config::SolverConfig;
use crate::cooker::cook_fabric;
use crate::fabric::{ConstraintPhase, Fabric, PhaseKind, Tether};

/// The always-available CPU backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl PhysicsBackend for CpuBackend {
    fn create_factory(&self) -> WeftResult<Box<dyn ClothFactory>> {
        Ok(Box::new(CpuFactory))
    }

    fn name(&self) -> &str {
        "cpu"
    }
}

/// Factory for CPU solvers and cloths.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuFactory;

impl ClothFactory for CpuFactory {
    fn cook_fabric(&self, desc: &MeshDescription, gravity: Vec3) -> WeftResult<Arc<Fabric>> {
        Ok(Arc::new(cook_fabric(desc, gravity)?))
    }

    fn create_solver(&self, config: &SolverConfig) -> Box<dyn Solver> {
        Box::new(CpuSolver::new(config.clone()))
    }

    fn create_cloth(&self, particles: Vec<Vec4>, fabric: Arc<Fabric>) -> WeftResult<Box<dyn ClothSim>> {
        Ok(Box::new(Cloth::new(particles, fabric)?))
    }
}

/// Single-threaded Verlet/PBD solver.
pub struct CpuSolver {
    config: SolverConfig,
    cloths: Vec<(ClothId, Box<dyn ClothSim>)>,
}

impl CpuSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            cloths: Vec::new(),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Per-iteration stiffness giving `stiffness` after all iterations.
    fn iteration_stiffness(&self, stiffness: f32) -> f32 {
        let n = self.config.iterations.max(1) as f32;
        1.0 - (1.0 - stiffness.clamp(0.0, 1.0)).powf(1.0 / n)
    }

    fn phase_stiffness(&self, kind: PhaseKind) -> f32 {
        let stiffness = match kind {
            PhaseKind::Horizontal | PhaseKind::Vertical => self.config.stretch_stiffness,
            PhaseKind::Shearing => self.config.shear_stiffness,
            PhaseKind::Bending => self.config.bend_stiffness,
        };
        self.iteration_stiffness(stiffness)
    }
}

impl Solver for CpuSolver {
    fn add_cloth(&mut self, id: ClothId, cloth: Box<dyn ClothSim>) -> Result<(), Box<dyn ClothSim>> {
        if self.cloths.iter().any(|(cid, _)| *cid == id) {
            warn!(?id, "cloth id already present in solver, refusing");
            return Err(cloth);
        }
        self.cloths.push((id, cloth));
        Ok(())
    }

    fn remove_cloth(&mut self, id: ClothId) -> Option<Box<dyn ClothSim>> {
        let at = self.cloths.iter().position(|(cid, _)| *cid == id)?;
        Some(self.cloths.remove(at).1)
    }

    fn cloth(&self, id: ClothId) -> Option<&dyn ClothSim> {
        for (cid, cloth) in &self.cloths {
            if *cid == id {
                return Some(&**cloth);
            }
        }
        None
    }

    fn cloth_mut(&mut self, id: ClothId) -> Option<&mut dyn ClothSim> {
        for (cid, cloth) in &mut self.cloths {
            if *cid == id {
                return Some(&mut **cloth);
            }
        }
        None
    }

    fn cloth_count(&self) -> usize {
        self.cloths.len()
    }

    fn step(&mut self, dt: f32) -> WeftResult<StepResult> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(WeftError::InvalidConfig(format!(
                "timestep must be positive and finite, got {dt}"
            )));
        }
        let start = Instant::now();

        let gravity_dt2 = self.config.gravity_vec() * dt * dt;
        let damping = self.config.damping;
        let iterations = self.config.iterations;
        let tether_stiffness = self.iteration_stiffness(self.config.tether_stiffness);
        let tether_scale = self.config.tether_scale;
        let stiffness: Vec<f32> = [
            PhaseKind::Horizontal,
            PhaseKind::Vertical,
            PhaseKind::Bending,
            PhaseKind::Shearing,
        ]
        .iter()
        .map(|&k| self.phase_stiffness(k))
        .collect();

        for (_, cloth) in &mut self.cloths {
            let fabric = Arc::clone(cloth.fabric());
            let (current, previous) = cloth.buffers_mut();

            integrate(current, previous, gravity_dt2, damping);
            for _ in 0..iterations {
                for phase in fabric.phases() {
                    let k = stiffness[phase_slot(phase.kind)];
                    project_phase(current, phase, k);
                }
                clamp_tethers(current, fabric.tethers(), tether_scale, tether_stiffness);
            }
        }

        let wall_time = start.elapsed().as_secs_f64();
        trace!(cloths = self.cloths.len(), wall_time, "cpu solver step");

        Ok(StepResult {
            iterations,
            cloths: self.cloths.len(),
            wall_time,
        })
    }

    fn name(&self) -> &str {
        "cpu_verlet"
    }
}

fn phase_slot(kind: PhaseKind) -> usize {
    match kind {
        PhaseKind::Horizontal => 0,
        PhaseKind::Vertical => 1,
        PhaseKind::Bending => 2,
        PhaseKind::Shearing => 3,
    }
}

/// Verlet step: x' = x + (x - x_prev)(1 - damping) + g dt².
fn integrate(current: &mut [Vec4], previous: &mut [Vec4], gravity_dt2: Vec3, damping: f32) {
    let keep = 1.0 - damping;
    for (cur, prev) in current.iter_mut().zip(previous.iter_mut()) {
        if cur.w <= INV_MASS_EPSILON {
            *prev = *cur;
            continue;
        }
        let pos = cur.xyz();
        let velocity = (pos - prev.xyz()) * keep;
        *prev = *cur;
        *cur = (pos + velocity + gravity_dt2).extend(cur.w);
    }
}

fn project_phase(current: &mut [Vec4], phase: &ConstraintPhase, stiffness: f32) {
    for c in &phase.constraints {
        let (a, b) = (c.a as usize, c.b as usize);
        let (pa, pb) = (current[a], current[b]);
        let w_sum = pa.w + pb.w;
        if w_sum <= INV_MASS_EPSILON {
            continue;
        }
        let delta = pb.xyz() - pa.xyz();
        let len = delta.length();
        if len <= EPSILON {
            continue;
        }
        let correction = delta * (stiffness * (len - c.rest_length) / (len * w_sum));
        current[a] += (correction * pa.w).extend(0.0);
        current[b] -= (correction * pb.w).extend(0.0);
    }
}

fn clamp_tethers(current: &mut [Vec4], tethers: &[Tether], scale: f32, stiffness: f32) {
    for t in tethers {
        let p = current[t.particle as usize];
        if p.w <= INV_MASS_EPSILON {
            continue;
        }
        let anchor = current[t.anchor as usize].xyz();
        let offset = p.xyz() - anchor;
        let dist = offset.length();
        let limit = t.length * scale;
        if dist <= limit || dist <= EPSILON {
            continue;
        }
        let target = anchor + offset * (limit / dist);
        let moved = p.xyz() + (target - p.xyz()) * stiffness;
        current[t.particle as usize] = moved.extend(p.w);
    }
}
