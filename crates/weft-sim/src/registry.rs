//! Simulation object registry.
//!
//! Owns the three resource pools (fabrics, solvers, cloth actors) and the
//! cloth → solver association. It enforces invariants and nothing else:
//!
//! - a tracked solver always has its [`StepHelper`] (they live in one record)
//! - a cloth is integrated by at most one solver at a time
//! - a solver cannot be untracked while it still integrates cloths
//! - a cloth cannot be untracked while a solver integrates it
//!
//! Violations are returned as [`WeftError::InvariantViolation`], logged at
//! error level, and leave the registry unchanged.
//!
//! Teardown order on drop is fixed: detach every cloth from its solver,
//! drop the solvers (and helpers), drop the cloths, release the fabrics.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec4;
use slotmap::{new_key_type, Key, SlotMap};
use tracing::{debug, error, info};
use weft_mesh::normals::compute_vertex_normals;
use weft_mesh::RenderMesh;
use weft_solver::{ClothSim, Fabric, Solver};
use weft_types::{ClothId, WeftError, WeftResult};

use crate::entity::OwningEntity;
use crate::helper::StepHelper;

new_key_type! {
    /// Handle to a tracked solver.
    pub struct SolverKey;
    /// Handle to a tracked cloth actor.
    pub struct ClothKey;
}

/// The identity a solver stores a cloth under.
pub(crate) fn cloth_id(key: ClothKey) -> ClothId {
    ClothId(key.data().as_ffi())
}

/// Outcome of one render sync pass over every tracked cloth.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub synced: usize,
    /// Cloths whose render mirror was left untouched.
    pub failures: Vec<(ClothKey, WeftError)>,
}

/// A cloth instance plus everything the host needs alongside it.
pub struct ClothActor {
    /// Held here only while no solver integrates the cloth.
    sim: Option<Box<dyn ClothSim>>,
    fabric: Arc<Fabric>,
    render: RenderMesh,
    entity: Arc<dyn OwningEntity>,
}

impl ClothActor {
    pub fn new(sim: Box<dyn ClothSim>, render: RenderMesh, entity: Arc<dyn OwningEntity>) -> Self {
        Self {
            fabric: Arc::clone(sim.fabric()),
            sim: Some(sim),
            render,
            entity,
        }
    }

    pub fn fabric(&self) -> &Arc<Fabric> {
        &self.fabric
    }

    pub fn render(&self) -> &RenderMesh {
        &self.render
    }

    pub fn entity(&self) -> &Arc<dyn OwningEntity> {
        &self.entity
    }

    /// True while the actor holds its own simulation handle.
    pub fn is_detached(&self) -> bool {
        self.sim.is_some()
    }
}

/// One tracked solver and its stepping helper.
pub struct SolverRecord {
    helper: StepHelper,
}

impl SolverRecord {
    pub fn helper(&self) -> &StepHelper {
        &self.helper
    }

    pub fn helper_mut(&mut self) -> &mut StepHelper {
        &mut self.helper
    }
}

/// Central bookkeeping for fabrics, solvers and cloth actors.
#[derive(Default)]
pub struct Registry {
    fabrics: Vec<Arc<Fabric>>,
    solvers: SlotMap<SolverKey, SolverRecord>,
    cloths: SlotMap<ClothKey, ClothActor>,
    cloth_solver: HashMap<ClothKey, SolverKey>,
}

fn violation(message: String) -> WeftError {
    error!("{message}");
    WeftError::InvariantViolation(message)
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Fabrics ──────────────────────────────────────────────

    pub fn track_fabric(&mut self, fabric: Arc<Fabric>) {
        self.fabrics.push(fabric);
    }

    /// Stops tracking `fabric` and hands the registry's reference back.
    ///
    /// Dropping the returned `Arc` is what releases it; cloth actors built
    /// from the fabric keep their own references.
    pub fn untrack_fabric(&mut self, fabric: &Arc<Fabric>) -> Option<Arc<Fabric>> {
        let at = self.fabrics.iter().position(|f| Arc::ptr_eq(f, fabric))?;
        Some(self.fabrics.swap_remove(at))
    }

    pub fn fabrics(&self) -> &[Arc<Fabric>] {
        &self.fabrics
    }

    // ─── Solvers ──────────────────────────────────────────────

    /// Tracks a solver together with its freshly created helper.
    pub fn track_solver(&mut self, solver: Box<dyn Solver>) -> SolverKey {
        let name = solver.name().to_owned();
        let key = self.solvers.insert(SolverRecord {
            helper: StepHelper::new(solver),
        });
        info!(?key, solver = %name, "tracking solver");
        key
    }

    /// Untracks a solver that integrates no cloths, returning it.
    pub fn untrack_solver(&mut self, key: SolverKey) -> WeftResult<Box<dyn Solver>> {
        if !self.solvers.contains_key(key) {
            return Err(WeftError::UnknownHandle(format!("{key:?}")));
        }
        let attached = self.cloths_in_solver(key).len();
        if attached > 0 {
            return Err(violation(format!(
                "cannot untrack {key:?}: it still integrates {attached} cloth(s)"
            )));
        }
        let record = self
            .solvers
            .remove(key)
            .ok_or_else(|| WeftError::UnknownHandle(format!("{key:?}")))?;
        info!(?key, "untracked solver");
        record
            .helper
            .into_solver()
            .ok_or_else(|| violation(format!("{key:?} lost its solver during a step")))
    }

    pub fn solver_record(&self, key: SolverKey) -> Option<&SolverRecord> {
        self.solvers.get(key)
    }

    pub fn solver(&self, key: SolverKey) -> Option<&dyn Solver> {
        self.solvers.get(key)?.helper.solver()
    }

    pub fn solver_keys(&self) -> Vec<SolverKey> {
        self.solvers.keys().collect()
    }

    pub(crate) fn solver_records_mut(&mut self) -> impl Iterator<Item = (SolverKey, &mut SolverRecord)> {
        self.solvers.iter_mut()
    }

    // ─── Cloth actors ─────────────────────────────────────────

    pub fn track_cloth_actor(&mut self, actor: ClothActor) -> ClothKey {
        let key = self.cloths.insert(actor);
        debug!(?key, "tracking cloth actor");
        key
    }

    /// Untracks a cloth that no solver integrates, returning it.
    pub fn untrack_cloth_actor(&mut self, key: ClothKey) -> WeftResult<ClothActor> {
        if let Some(solver) = self.cloth_solver.get(&key) {
            return Err(violation(format!(
                "cannot untrack {key:?}: it is still integrated by {solver:?}"
            )));
        }
        self.cloths
            .remove(key)
            .ok_or_else(|| WeftError::UnknownHandle(format!("{key:?}")))
    }

    pub fn cloth(&self, key: ClothKey) -> Option<&ClothActor> {
        self.cloths.get(key)
    }

    pub fn cloth_keys(&self) -> Vec<ClothKey> {
        self.cloths.keys().collect()
    }

    pub fn cloth_count(&self) -> usize {
        self.cloths.len()
    }

    pub fn solver_count(&self) -> usize {
        self.solvers.len()
    }

    // ─── Associations ─────────────────────────────────────────

    /// The solver currently integrating `cloth`.
    pub fn solver_of(&self, cloth: ClothKey) -> Option<SolverKey> {
        self.cloth_solver.get(&cloth).copied()
    }

    pub fn cloths_in_solver(&self, solver: SolverKey) -> Vec<ClothKey> {
        self.cloth_solver
            .iter()
            .filter(|(_, s)| **s == solver)
            .map(|(c, _)| *c)
            .collect()
    }

    /// Hands `cloth`'s simulation handle to `solver`.
    ///
    /// Fails if the cloth is already integrated by any solver.
    pub fn add_cloth_to_solver(&mut self, cloth: ClothKey, solver: SolverKey) -> WeftResult<()> {
        self.check_addable(cloth, solver)?;
        self.attach(cloth, solver)
    }

    /// Batch form of [`add_cloth_to_solver`](Self::add_cloth_to_solver).
    ///
    /// Every cloth is checked before any is added, so a failing batch
    /// changes nothing.
    pub fn add_cloths_to_solver(&mut self, cloths: &[ClothKey], solver: SolverKey) -> WeftResult<()> {
        for (i, &cloth) in cloths.iter().enumerate() {
            self.check_addable(cloth, solver)?;
            if cloths[..i].contains(&cloth) {
                return Err(violation(format!("{cloth:?} appears twice in one batch")));
            }
        }
        for &cloth in cloths {
            self.attach(cloth, solver)?;
        }
        Ok(())
    }

    /// Takes `cloth` back from its solver.
    pub fn remove_cloth_from_solver(&mut self, cloth: ClothKey) -> WeftResult<()> {
        let solver = self
            .cloth_solver
            .get(&cloth)
            .copied()
            .ok_or_else(|| violation(format!("{cloth:?} is not in any solver")))?;
        let sim = self
            .solvers
            .get_mut(solver)
            .and_then(|r| r.helper.solver_mut())
            .and_then(|s| s.remove_cloth(cloth_id(cloth)))
            .ok_or_else(|| violation(format!("{solver:?} does not hold {cloth:?}")))?;
        if let Some(actor) = self.cloths.get_mut(cloth) {
            actor.sim = Some(sim);
        }
        self.cloth_solver.remove(&cloth);
        debug!(?cloth, ?solver, "removed cloth from solver");
        Ok(())
    }

    fn check_addable(&self, cloth: ClothKey, solver: SolverKey) -> WeftResult<()> {
        if let Some(current) = self.cloth_solver.get(&cloth) {
            return Err(violation(format!(
                "{cloth:?} is already integrated by {current:?}"
            )));
        }
        let actor = self
            .cloths
            .get(cloth)
            .ok_or_else(|| WeftError::UnknownHandle(format!("{cloth:?}")))?;
        let record = self
            .solvers
            .get(solver)
            .ok_or_else(|| WeftError::UnknownHandle(format!("{solver:?}")))?;
        if actor.sim.is_none() {
            return Err(violation(format!("{cloth:?} has no simulation handle")));
        }
        if record.helper.is_stepping() {
            return Err(violation(format!("{solver:?} is mid-step")));
        }
        Ok(())
    }

    fn attach(&mut self, cloth: ClothKey, solver: SolverKey) -> WeftResult<()> {
        let sim = self
            .cloths
            .get_mut(cloth)
            .and_then(|a| a.sim.take())
            .ok_or_else(|| violation(format!("{cloth:?} has no simulation handle")))?;
        let refused = match self.solvers.get_mut(solver).and_then(|r| r.helper.solver_mut()) {
            Some(s) => s
                .add_cloth(cloth_id(cloth), sim)
                .err()
                .map(|sim| (sim, violation(format!("{solver:?} already holds {cloth:?}")))),
            None => Some((sim, WeftError::UnknownHandle(format!("{solver:?}")))),
        };
        if let Some((sim, err)) = refused {
            if let Some(actor) = self.cloths.get_mut(cloth) {
                actor.sim = Some(sim);
            }
            return Err(err);
        }
        self.cloth_solver.insert(cloth, solver);
        debug!(?cloth, ?solver, "added cloth to solver");
        Ok(())
    }

    // ─── Particle access ──────────────────────────────────────

    /// The simulation handle of `cloth`, wherever it currently lives.
    pub fn sim(&self, cloth: ClothKey) -> Option<&dyn ClothSim> {
        let actor = self.cloths.get(cloth)?;
        if let Some(sim) = &actor.sim {
            return Some(&**sim);
        }
        let solver = self.cloth_solver.get(&cloth)?;
        self.solvers
            .get(*solver)?
            .helper
            .solver()?
            .cloth(cloth_id(cloth))
    }

    pub fn sim_mut(&mut self, cloth: ClothKey) -> Option<&mut dyn ClothSim> {
        let actor = self.cloths.get_mut(cloth)?;
        if let Some(sim) = actor.sim.as_mut() {
            return Some(&mut **sim);
        }
        let solver = self.cloth_solver.get(&cloth)?;
        self.solvers
            .get_mut(*solver)?
            .helper
            .solver_mut()?
            .cloth_mut(cloth_id(cloth))
    }

    /// Current particles of every cloth paired with its world transform.
    pub fn pick_candidates(&self) -> Vec<(ClothKey, glam::Mat4, &[Vec4])> {
        self.cloths
            .iter()
            .filter_map(|(key, actor)| {
                let particles = self.sim(key)?.current_particles();
                Some((key, actor.entity.world_transform(), particles))
            })
            .collect()
    }

    /// Copies every cloth's current positions into its render mesh.
    ///
    /// Returns the number of cloths synced.
    pub fn sync_render_meshes(&mut self, recompute_normals: bool) -> SyncReport {
        let mut report = SyncReport::default();
        for (key, actor) in self.cloths.iter_mut() {
            let particles = match &actor.sim {
                Some(sim) => Some(sim.current_particles()),
                None => self
                    .cloth_solver
                    .get(&key)
                    .and_then(|s| self.solvers.get(*s))
                    .and_then(|r| r.helper.solver())
                    .and_then(|s| s.cloth(cloth_id(key)))
                    .map(|sim| sim.current_particles()),
            };
            let Some(particles) = particles else {
                let err = violation(format!("{key:?} has no reachable particles"));
                report.failures.push((key, err));
                continue;
            };
            if let Err(err) = actor.render.copy_positions_from_particles(particles) {
                error!(?key, %err, "render sync failed");
                report.failures.push((key, err));
                continue;
            }
            if recompute_normals {
                compute_vertex_normals(&mut actor.render);
            }
            report.synced += 1;
        }
        report
    }

    // ─── Teardown ─────────────────────────────────────────────

    /// Releases everything in dependency order.
    pub fn clear(&mut self) {
        let detached = self.cloth_solver.len();
        let associations: Vec<(ClothKey, SolverKey)> = self.cloth_solver.drain().collect();
        for (cloth, solver) in associations {
            let sim = self
                .solvers
                .get_mut(solver)
                .and_then(|r| r.helper.solver_mut())
                .and_then(|s| s.remove_cloth(cloth_id(cloth)));
            if let (Some(sim), Some(actor)) = (sim, self.cloths.get_mut(cloth)) {
                actor.sim = Some(sim);
            }
        }
        let solvers = self.solvers.len();
        self.solvers.clear();
        let cloths = self.cloths.len();
        self.cloths.clear();
        let fabrics = self.fabrics.len();
        self.fabrics.clear();
        if detached + solvers + cloths + fabrics > 0 {
            debug!(detached, solvers, cloths, fabrics, "registry torn down");
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.clear();
    }
}
