//! # weft-solver
//!
//! The physics backend boundary, plus a reference CPU backend.
//!
//! ## Key Types
//!
//! - [`PhysicsBackend`] / [`ClothFactory`]: Backend entry point and object factory
//! - [`Solver`]: Integrator that owns and advances cloth instances
//! - [`ClothSim`]: One cloth's current/previous particle buffers
//! - [`Fabric`]: Immutable cooked constraint topology, shared via `Arc`
//! - [`SolverConfig`]: Iterations, gravity, damping, stiffness
//! - [`CpuBackend`]: Verlet/PBD reference implementation

pub mod backend;
pub mod cloth;
pub mod config;
pub mod cooker;
pub mod cpu;
pub mod fabric;

pub use backend::{ClothFactory, ClothSim, PhysicsBackend, Solver, StepResult};
pub use cloth::Cloth;
pub use config::SolverConfig;
pub use cooker::cook_fabric;
pub use cpu::{CpuBackend, CpuFactory, CpuSolver};
pub use fabric::{ConstraintPhase, DistanceConstraint, Fabric, PhaseKind, Tether};
