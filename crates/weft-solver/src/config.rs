//! Solver configuration.
//!
//! Parameters that control solver behavior: iteration counts,
//! gravity, damping, and per-phase stiffness.

use serde::{Deserialize, Serialize};
use weft_types::constants::{DEFAULT_SOLVER_ITERATIONS, GRAVITY};
use weft_types::{WeftError, WeftResult};

/// Configuration for a solver instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Constraint iterations per timestep.
    pub iterations: u32,

    /// Gravity vector [gx, gy, gz] in m/s². Also the cooking hint that
    /// splits stretch edges into horizontal and vertical phases.
    pub gravity: [f32; 3],

    /// Velocity damping factor (0.0 = no damping, 1.0 = full damping).
    pub damping: f32,

    /// Stiffness of horizontal and vertical stretch phases (0–1).
    pub stretch_stiffness: f32,

    /// Stiffness of shearing phases (0–1).
    pub shear_stiffness: f32,

    /// Stiffness of bending phases (0–1).
    pub bend_stiffness: f32,

    /// Stiffness of tether clamping (0–1).
    pub tether_stiffness: f32,

    /// Tethers allow this multiple of their rest length before clamping.
    pub tether_scale: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_SOLVER_ITERATIONS,
            gravity: [0.0, -GRAVITY, 0.0],
            damping: 0.01,
            stretch_stiffness: 1.0,
            shear_stiffness: 0.8,
            bend_stiffness: 0.5,
            tether_stiffness: 1.0,
            tether_scale: 1.1,
        }
    }
}

impl SolverConfig {
    /// Creates a config for debugging (fewer iterations, softer cloth).
    pub fn debug() -> Self {
        Self {
            iterations: 2,
            bend_stiffness: 0.1,
            ..Default::default()
        }
    }

    /// Creates a high-quality config (more iterations, stiffer bending).
    pub fn high_quality() -> Self {
        Self {
            iterations: 24,
            bend_stiffness: 0.8,
            tether_scale: 1.02,
            ..Default::default()
        }
    }

    /// Gravity as a vector.
    pub fn gravity_vec(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.gravity)
    }

    /// Rejects values the solver cannot integrate.
    pub fn validate(&self) -> WeftResult<()> {
        if self.iterations == 0 {
            return Err(WeftError::InvalidConfig(
                "solver iterations must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(WeftError::InvalidConfig(format!(
                "damping {} is outside [0, 1]",
                self.damping
            )));
        }
        for (name, value) in [
            ("stretch_stiffness", self.stretch_stiffness),
            ("shear_stiffness", self.shear_stiffness),
            ("bend_stiffness", self.bend_stiffness),
            ("tether_stiffness", self.tether_stiffness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WeftError::InvalidConfig(format!(
                    "{name} {value} is outside [0, 1]"
                )));
            }
        }
        if self.tether_scale < 1.0 {
            return Err(WeftError::InvalidConfig(format!(
                "tether_scale {} must be at least 1",
                self.tether_scale
            )));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(WeftError::InvalidConfig("gravity must be finite".into()));
        }
        Ok(())
    }
}
