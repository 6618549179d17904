//! Physics backend boundary.
//!
//! The orchestration layer only ever talks to a backend through these
//! traits:
//!
//! ```text
//! let factory = backend.create_factory()?;
//! let fabric = factory.cook_fabric(&desc, gravity)?;
//! let mut solver = factory.create_solver(&config);
//! solver.add_cloth(id, factory.create_cloth(particles, fabric)?);  // Err hands a duplicate back
//! loop {
//!     solver.step(dt)?;
//! }
//! ```
//!
//! # Implementations
//!
//! - [`CpuBackend`](crate::cpu::CpuBackend): single-threaded Verlet/PBD reference backend

use std::sync::Arc;

use glam::{Vec3, Vec4};
use weft_mesh::MeshDescription;
use weft_types::{ClothId, WeftResult};

use crate::config::SolverConfig;
use crate::fabric::Fabric;

/// Result of a solver step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepResult {
    /// Constraint iterations performed.
    pub iterations: u32,
    /// Cloths advanced.
    pub cloths: usize,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
}

/// Entry point of a physics backend.
pub trait PhysicsBackend {
    /// Allocates the factory everything else is created from.
    ///
    /// Failure here is fatal for the caller: nothing can be simulated.
    fn create_factory(&self) -> WeftResult<Box<dyn ClothFactory>>;

    /// Returns the backend's name.
    fn name(&self) -> &str;
}

/// Creates fabrics, solvers and cloth instances for one backend.
pub trait ClothFactory {
    /// Cooks a mesh description into shareable constraint topology.
    fn cook_fabric(&self, desc: &MeshDescription, gravity: Vec3) -> WeftResult<Arc<Fabric>>;

    /// Creates an empty solver.
    fn create_solver(&self, config: &SolverConfig) -> Box<dyn Solver>;

    /// Creates a cloth instance from an initial particle buffer
    /// (xyz = position, w = inverse mass).
    ///
    /// Fails when the buffer length differs from the fabric's particle count.
    fn create_cloth(&self, particles: Vec<Vec4>, fabric: Arc<Fabric>) -> WeftResult<Box<dyn ClothSim>>;
}

/// A stateful integrator advancing zero or more cloths.
pub trait Solver: Send {
    /// Takes ownership of `cloth` under `id`.
    ///
    /// An `id` already held is refused and `cloth` is handed back.
    fn add_cloth(&mut self, id: ClothId, cloth: Box<dyn ClothSim>) -> Result<(), Box<dyn ClothSim>>;

    /// Hands the cloth stored under `id` back to the caller.
    fn remove_cloth(&mut self, id: ClothId) -> Option<Box<dyn ClothSim>>;

    fn cloth(&self, id: ClothId) -> Option<&dyn ClothSim>;

    fn cloth_mut(&mut self, id: ClothId) -> Option<&mut dyn ClothSim>;

    fn cloth_count(&self) -> usize;

    /// Advances every cloth by `dt` seconds.
    fn step(&mut self, dt: f32) -> WeftResult<StepResult>;

    /// Returns the solver's name.
    fn name(&self) -> &str;
}

/// One live cloth instance: a fabric plus its particle buffers.
///
/// Both buffers always hold exactly `fabric().particle_count()` entries.
pub trait ClothSim: Send {
    fn fabric(&self) -> &Arc<Fabric>;

    fn particle_count(&self) -> usize {
        self.current_particles().len()
    }

    fn current_particles(&self) -> &[Vec4];

    fn current_particles_mut(&mut self) -> &mut [Vec4];

    fn previous_particles(&self) -> &[Vec4];

    fn previous_particles_mut(&mut self) -> &mut [Vec4];

    /// Current and previous buffers at once, for integrators.
    fn buffers_mut(&mut self) -> (&mut [Vec4], &mut [Vec4]);
}
