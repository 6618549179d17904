//! Cooked constraint topology.
//!
//! A [`Fabric`] is immutable once cooked and shared between every cloth
//! instance created from it through an `Arc`. Constraints are grouped
//! into phases; within a phase no particle appears twice, so a phase can
//! be projected in any order (or in parallel) without write conflicts.

use serde::{Deserialize, Serialize};

/// What a constraint phase models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Stretch edges running across gravity.
    Horizontal,
    /// Stretch edges running along gravity.
    Vertical,
    /// Wing-to-wing distance across interior edges.
    Bending,
    /// Cell diagonals that are not stretch edges.
    Shearing,
}

/// Keeps two particles at their rest distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceConstraint {
    pub a: u32,
    pub b: u32,
    pub rest_length: f32,
}

/// One independent set of constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintPhase {
    pub kind: PhaseKind,
    pub constraints: Vec<DistanceConstraint>,
}

/// Limits how far a movable particle may drift from its nearest pin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tether {
    pub particle: u32,
    pub anchor: u32,
    pub length: f32,
}

/// Immutable cooked topology for one mesh description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fabric {
    particle_count: usize,
    phases: Vec<ConstraintPhase>,
    tethers: Vec<Tether>,
    triangles: Vec<[u32; 3]>,
}

impl Fabric {
    pub(crate) fn new(
        particle_count: usize,
        phases: Vec<ConstraintPhase>,
        tethers: Vec<Tether>,
        triangles: Vec<[u32; 3]>,
    ) -> Self {
        Self {
            particle_count,
            phases,
            tethers,
            triangles,
        }
    }

    /// Number of particles every cloth built from this fabric must have.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Constraint phases in projection order.
    #[inline]
    pub fn phases(&self) -> &[ConstraintPhase] {
        &self.phases
    }

    #[inline]
    pub fn tethers(&self) -> &[Tether] {
        &self.tethers
    }

    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Number of phases of the given kind.
    pub fn phase_count(&self, kind: PhaseKind) -> usize {
        self.phases.iter().filter(|p| p.kind == kind).count()
    }

    /// Number of constraints of the given kind across all its phases.
    pub fn constraint_count(&self, kind: PhaseKind) -> usize {
        self.phases
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.constraints.len())
            .sum()
    }

    /// Total constraints across every phase.
    pub fn total_constraints(&self) -> usize {
        self.phases.iter().map(|p| p.constraints.len()).sum()
    }
}
