//! Fabric cooking: mesh description → constraint phases and tethers.
//!
//! ## Phases
//!
//! - Horizontal / Vertical: stretch edges, split by the gravity hint
//! - Shearing: triangle edges that are not quad sides (only when the
//!   description carries quads)
//! - Bending: the two wing vertices across every interior edge
//!
//! Each kind is greedily partitioned into independent sets. Constraints
//! whose particles are all pinned are dropped since projecting them is
//! a no-op.

use std::collections::BTreeSet;

use glam::Vec3;
use tracing::debug;
use weft_mesh::{Adjacency, MeshDescription};
use weft_types::WeftResult;

use crate::fabric::{ConstraintPhase, DistanceConstraint, Fabric, PhaseKind, Tether};

/// Cooks `desc` into a fabric. `gravity` only orients the stretch split;
/// a zero vector puts every stretch edge in the horizontal phases.
pub fn cook_fabric(desc: &MeshDescription, gravity: Vec3) -> WeftResult<Fabric> {
    desc.validate()?;

    let n = desc.point_count();
    let adjacency = Adjacency::build(n, &desc.triangles);
    let down = gravity.try_normalize();

    let quad_sides: BTreeSet<(u32, u32)> = desc
        .quads
        .iter()
        .flat_map(|&[a, b, c, d]| [(a, b), (b, c), (c, d), (d, a)])
        .map(canonical)
        .collect();

    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    let mut shearing = Vec::new();

    for &[a, b] in &adjacency.edges {
        let Some(constraint) = distance_constraint(desc, a, b) else {
            continue;
        };
        if !quad_sides.is_empty() && !quad_sides.contains(&(a, b)) {
            shearing.push(constraint);
            continue;
        }
        let dir = desc.points[b as usize] - desc.points[a as usize];
        let along_gravity = match (down, dir.try_normalize()) {
            (Some(g), Some(d)) => d.dot(g).abs() >= std::f32::consts::FRAC_1_SQRT_2,
            _ => false,
        };
        if along_gravity {
            vertical.push(constraint);
        } else {
            horizontal.push(constraint);
        }
    }

    let mut wing_pairs = BTreeSet::new();
    let bending: Vec<DistanceConstraint> = adjacency
        .interior_edges
        .iter()
        .filter(|edge| edge.wing_a != edge.wing_b)
        .filter(|edge| wing_pairs.insert(canonical((edge.wing_a, edge.wing_b))))
        .filter_map(|edge| distance_constraint(desc, edge.wing_a, edge.wing_b))
        .collect();

    let mut phases = Vec::new();
    phases.extend(partition(PhaseKind::Horizontal, horizontal, n));
    phases.extend(partition(PhaseKind::Vertical, vertical, n));
    phases.extend(partition(PhaseKind::Shearing, shearing, n));
    phases.extend(partition(PhaseKind::Bending, bending, n));

    let tethers = build_tethers(desc);

    let fabric = Fabric::new(n, phases, tethers, desc.triangles.clone());
    debug!(
        particles = n,
        phases = fabric.phases().len(),
        constraints = fabric.total_constraints(),
        tethers = fabric.tethers().len(),
        "cooked fabric"
    );
    Ok(fabric)
}

fn canonical((a, b): (u32, u32)) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn distance_constraint(desc: &MeshDescription, a: u32, b: u32) -> Option<DistanceConstraint> {
    if desc.is_pinned(a as usize) && desc.is_pinned(b as usize) {
        return None;
    }
    let rest_length = desc.points[a as usize].distance(desc.points[b as usize]);
    Some(DistanceConstraint { a, b, rest_length })
}

/// Greedy first-fit colouring: each constraint joins the first phase
/// that touches neither of its particles.
fn partition(kind: PhaseKind, constraints: Vec<DistanceConstraint>, n: usize) -> Vec<ConstraintPhase> {
    let mut phases: Vec<ConstraintPhase> = Vec::new();
    let mut touched: Vec<Vec<bool>> = Vec::new();

    for c in constraints {
        let (a, b) = (c.a as usize, c.b as usize);
        let slot = match touched.iter().position(|t| !t[a] && !t[b]) {
            Some(slot) => slot,
            None => {
                touched.push(vec![false; n]);
                phases.push(ConstraintPhase {
                    kind,
                    constraints: Vec::new(),
                });
                phases.len() - 1
            }
        };
        touched[slot][a] = true;
        touched[slot][b] = true;
        phases[slot].constraints.push(c);
    }
    phases
}

/// One tether per movable particle, anchored at the nearest pinned point.
fn build_tethers(desc: &MeshDescription) -> Vec<Tether> {
    let anchors: Vec<u32> = (0..desc.point_count())
        .filter(|&i| desc.is_pinned(i))
        .map(|i| i as u32)
        .collect();
    if anchors.is_empty() {
        return Vec::new();
    }

    (0..desc.point_count())
        .filter(|&i| !desc.is_pinned(i))
        .filter_map(|i| {
            let p = desc.points[i];
            anchors
                .iter()
                .map(|&a| (a, p.distance(desc.points[a as usize])))
                .min_by(|x, y| x.1.total_cmp(&y.1))
                .map(|(anchor, length)| Tether {
                    particle: i as u32,
                    anchor,
                    length,
                })
        })
        .collect()
}
