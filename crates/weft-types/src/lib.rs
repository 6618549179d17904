//! # weft-types
//!
//! Shared types, identifiers, error types, and simulation constants
//! for the Weft cloth orchestration engine.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other Weft crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{WeftError, WeftResult};
pub use ids::{ClothId, ParticleId};
