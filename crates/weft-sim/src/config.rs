//! Controller configuration.
//!
//! Everything the controller needs at construction, loadable from TOML.
//! Missing keys fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use weft_solver::SolverConfig;
use weft_types::{WeftError, WeftResult};

/// Picking and soft-selection dragging parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Largest perpendicular ray offset that still picks a particle.
    pub pick_tolerance: f32,
    /// Weight of the perpendicular offset in the pick score.
    pub pick_offset_weight: f32,
    /// Largest per-event drag offset (meters); longer pulls are clamped.
    pub max_offset: f32,
    /// Falloff radius around the dragged particle (local space).
    pub soft_selection_radius: f32,
    /// Weight at the dragged particle itself.
    pub max_weight: f32,
    /// Share of the nudged previous position kept; the rest blends toward current.
    pub previous_blend: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            pick_tolerance: 0.1,
            pick_offset_weight: 0.5,
            max_offset: 0.2,
            soft_selection_radius: 0.4,
            max_weight: 0.4,
            previous_blend: 0.99,
        }
    }
}

impl DragConfig {
    pub fn validate(&self) -> WeftResult<()> {
        for (name, value) in [
            ("pick_tolerance", self.pick_tolerance),
            ("max_offset", self.max_offset),
            ("soft_selection_radius", self.soft_selection_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(WeftError::InvalidConfig(format!(
                    "drag.{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.pick_offset_weight.is_finite() && self.pick_offset_weight >= 0.0) {
            return Err(WeftError::InvalidConfig(format!(
                "drag.pick_offset_weight must be non-negative, got {}",
                self.pick_offset_weight
            )));
        }
        for (name, value) in [
            ("max_weight", self.max_weight),
            ("previous_blend", self.previous_blend),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WeftError::InvalidConfig(format!(
                    "drag.{name} {value} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Top-level controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Worker threads for solver stepping (0 = one per core).
    pub worker_threads: usize,
    /// Recompute render normals after each sync.
    pub recompute_normals: bool,
    /// Emit frame-phase telemetry events.
    pub telemetry: bool,
    /// Configuration of every solver the controller creates.
    pub solver: SolverConfig,
    /// Picking and dragging.
    pub drag: DragConfig,
}

impl ControllerConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> WeftResult<Self> {
        toml::from_str(text).map_err(|e| WeftError::Parse(e.to_string()))
    }

    /// Reads and parses a TOML file.
    pub fn from_toml_file(path: &Path) -> WeftResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> WeftResult<String> {
        toml::to_string(self).map_err(|e| WeftError::Serialization(e.to_string()))
    }

    /// Validates solver and drag settings.
    pub fn validate(&self) -> WeftResult<()> {
        self.solver.validate()?;
        self.drag.validate()
    }
}
