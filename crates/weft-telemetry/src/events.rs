//! Simulation event types.
//!
//! Structured events emitted by the controller at each frame phase.
//! Events are lightweight value types that carry just enough data to be
//! useful for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by the controller.
///
/// Events are tagged with the frame index they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Frame number (0-indexed).
    pub frame: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Stepping was submitted for every tracked solver.
    FrameBegin {
        /// Timestep handed to every solver (seconds).
        dt: f32,
        /// Number of solvers submitted.
        solver_count: usize,
    },

    /// Every solver finished stepping.
    StepComplete {
        /// Wall-clock time from start to the end of the wait (seconds).
        wall_time: f64,
        /// Solvers whose step returned an error.
        failed: usize,
    },

    /// Render meshes were refreshed from particle buffers.
    RenderSync {
        /// Number of cloth instances synced.
        cloth_count: usize,
    },

    /// A particle was picked for dragging.
    DragBegin {
        /// Index of the picked particle in its cloth.
        particle: u32,
        /// Distance along the pick ray.
        distance: f32,
    },

    /// Dragging stopped.
    DragEnd,

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given frame.
    pub fn new(frame: u64, kind: EventKind) -> Self {
        Self { frame, kind }
    }
}
