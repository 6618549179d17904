//! # weft-sim
//!
//! Cloth simulation orchestration on top of a [`weft_solver::PhysicsBackend`].
//!
//! ## Key Types
//!
//! - [`ClothController`]: Owns everything; runs start / wait / sync each frame
//! - [`Registry`]: Fabrics, solvers and cloth actors with their associations
//! - [`StepHelper`]: Moves a solver into a scheduler job and back
//! - [`Interactor`]: Ray picking and soft-selection dragging
//! - [`ControllerConfig`]: TOML-loadable controller settings

pub mod camera;
pub mod config;
pub mod controller;
pub mod entity;
pub mod helper;
pub mod interactor;
pub mod registry;

pub use camera::{RayCaster, ViewCamera};
pub use config::{ControllerConfig, DragConfig};
pub use controller::{ClothController, SimulationStep, StepReport};
pub use entity::{OwningEntity, StaticEntity};
pub use helper::StepHelper;
pub use interactor::{DragState, DragUpdate, Interactor, PickHit, PointerEvent};
pub use registry::{ClothActor, ClothKey, Registry, SolverKey, SolverRecord, SyncReport};
