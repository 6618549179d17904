//! Benchmark scenarios: procedural mesh + pinning + config for each test case.
//!
//! Four canonical scenarios for regression testing:
//! 1. **Hanging sheet**: Horizontal sheet pinned along one edge, drapes under gravity
//! 2. **Flag**: Vertical sheet pinned at the two pole corners
//! 3. **Tube**: Open-ended cylinder hanging from its top ring
//! 4. **Merged sheets**: Two sheets merged into one cloth instance

use std::f32::consts::FRAC_PI_2;
use std::str::FromStr;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use weft_mesh::generators::{generate_cylinder, generate_plane, CylinderDesc, PlaneDesc};
use weft_mesh::MeshDescription;
use weft_sim::ControllerConfig;
use weft_types::constants::DEFAULT_DT;
use weft_types::WeftError;

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Sheet pinned along its first row, hanging under gravity.
    HangingSheet,
    /// Vertical sheet held at two corners.
    Flag,
    /// Cylinder hanging from its top ring.
    Tube,
    /// Two pinned sheets sharing one cloth instance.
    MergedSheets,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::HangingSheet,
            ScenarioKind::Flag,
            ScenarioKind::Tube,
            ScenarioKind::MergedSheets,
        ]
    }

    /// Returns the scenario's command-line name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::HangingSheet => "hanging_sheet",
            ScenarioKind::Flag => "flag",
            ScenarioKind::Tube => "tube",
            ScenarioKind::MergedSheets => "merged_sheets",
        }
    }
}

impl FromStr for ScenarioKind {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::all().iter().map(|k| k.name()).collect();
                WeftError::InvalidConfig(format!(
                    "Unknown scenario '{s}'. Available: {}",
                    names.join(", ")
                ))
            })
    }
}

/// A fully specified benchmark scenario.
pub struct Scenario {
    /// Scenario type.
    pub kind: ScenarioKind,
    /// The cloth to cook and simulate.
    pub description: MeshDescription,
    /// Controller configuration (solver + drag + workers).
    pub config: ControllerConfig,
    /// Number of frames to simulate.
    pub frames: u32,
    /// Timestep size (seconds).
    pub dt: f32,
}

impl Scenario {
    /// Create the hanging sheet scenario.
    ///
    /// A 1m × 1m cloth at 20×20 resolution, one metre up, pinned along
    /// its first row, hanging for 2 seconds at 60fps.
    pub fn hanging_sheet() -> Self {
        let plane = PlaneDesc::new(1.0, 1.0, 20, 20)
            .with_quads()
            .with_transform(Mat4::from_translation(Vec3::Y));
        let mut description = MeshDescription::from_topology(generate_plane(&plane));
        description.pin_by_side(20, 20, true);

        Self::new(ScenarioKind::HangingSheet, description, 120)
    }

    /// Create the flag scenario.
    ///
    /// A 1.5m × 1m vertical sheet at 24×16 resolution held by the two
    /// corners of its pole edge.
    pub fn flag() -> Self {
        let transform = Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0))
            * Mat4::from_rotation_x(FRAC_PI_2);
        let plane = PlaneDesc::new(1.5, 1.0, 24, 16)
            .with_quads()
            .with_transform(transform);
        let mut description = MeshDescription::from_topology(generate_plane(&plane));
        description.pin_by_corner_angles(24, 16, false);

        Self::new(ScenarioKind::Flag, description, 120)
    }

    /// Create the tube scenario.
    ///
    /// A 0.3m-radius, 1m-tall tube with a gentle wave, pinned at its top ring.
    pub fn tube() -> Self {
        let mut cylinder = CylinderDesc::new(0.3, 1.0, 24, 12);
        cylinder.frequency = 6.0;
        cylinder.amplitude_bottom = 0.03;
        cylinder.attach_top = true;
        cylinder.make_quads = true;
        cylinder.transform = Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0));
        let description = MeshDescription::from_topology(generate_cylinder(&cylinder));

        Self::new(ScenarioKind::Tube, description, 120)
    }

    /// Create the merged sheets scenario.
    ///
    /// Two 10×10 hanging sheets side by side, merged into one description
    /// so a single cloth instance carries both.
    pub fn merged_sheets() -> Self {
        let sheet = |x: f32| {
            let plane = PlaneDesc::new(1.0, 1.0, 10, 10)
                .with_quads()
                .with_transform(Mat4::from_translation(Vec3::new(x, 1.0, 0.0)));
            let mut desc = MeshDescription::from_topology(generate_plane(&plane));
            desc.pin_by_side(10, 10, true);
            desc
        };
        let mut description = sheet(-0.75);
        description.merge(&sheet(0.75));

        Self::new(ScenarioKind::MergedSheets, description, 120)
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::HangingSheet => Self::hanging_sheet(),
            ScenarioKind::Flag => Self::flag(),
            ScenarioKind::Tube => Self::tube(),
            ScenarioKind::MergedSheets => Self::merged_sheets(),
        }
    }

    /// Override the number of frames.
    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    /// Override the controller configuration.
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    fn new(kind: ScenarioKind, description: MeshDescription, frames: u32) -> Self {
        Self {
            kind,
            description,
            config: ControllerConfig::default(),
            frames,
            dt: DEFAULT_DT,
        }
    }
}
