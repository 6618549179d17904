//! Integration tests for weft-sim.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use weft_math::Ray;
use weft_mesh::generators::{generate_plane, PlaneDesc};
use weft_mesh::MeshDescription;
use weft_sim::{
    ClothController, ClothKey, ControllerConfig, DragConfig, DragState, Interactor, PointerEvent,
    RayCaster, Registry, StaticEntity, ViewCamera,
};
use weft_solver::{
    cook_fabric, Cloth, ClothFactory, ClothSim, CpuBackend, Fabric, PhysicsBackend, Solver,
    SolverConfig, StepResult,
};
use weft_telemetry::{EventKind, VecSink};
use weft_types::constants::GRAVITY;
use weft_types::{ClothId, WeftError, WeftResult};

const DT: f32 = 1.0 / 60.0;

fn plane(sx: usize, sy: usize) -> MeshDescription {
    MeshDescription::from_topology(generate_plane(&PlaneDesc::new(1.0, 1.0, sx, sy)))
}

fn hanging_sheet() -> MeshDescription {
    let mut desc = plane(4, 4);
    desc.pin_by_side(4, 4, true);
    desc.set_uniform_inverse_mass(1.0);
    desc
}

fn entity() -> Arc<StaticEntity> {
    Arc::new(StaticEntity::identity())
}

fn cpu_controller() -> ClothController {
    let config = ControllerConfig {
        worker_threads: 2,
        ..Default::default()
    };
    ClothController::new(&CpuBackend, config).unwrap()
}

// ─── Instrumented Backend ─────────────────────────────────────

/// Ordered record of everything the stub backend and the test observe.
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn position(&self, entry: &str) -> usize {
        self.entries()
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("{entry} not journaled"))
    }
}

struct JournaledCloth {
    inner: Cloth,
    journal: Journal,
}

impl Drop for JournaledCloth {
    fn drop(&mut self) {
        self.journal.push("cloth dropped");
    }
}

impl ClothSim for JournaledCloth {
    fn fabric(&self) -> &Arc<Fabric> {
        self.inner.fabric()
    }

    fn current_particles(&self) -> &[Vec4] {
        self.inner.current_particles()
    }

    fn current_particles_mut(&mut self) -> &mut [Vec4] {
        self.inner.current_particles_mut()
    }

    fn previous_particles(&self) -> &[Vec4] {
        self.inner.previous_particles()
    }

    fn previous_particles_mut(&mut self) -> &mut [Vec4] {
        self.inner.previous_particles_mut()
    }

    fn buffers_mut(&mut self) -> (&mut [Vec4], &mut [Vec4]) {
        self.inner.buffers_mut()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum StepMode {
    Normal,
    Fail,
    Panic,
}

/// Raises every particle by 1 per step, slowly.
struct JournaledSolver {
    cloths: Vec<(ClothId, Box<dyn ClothSim>)>,
    journal: Journal,
    mode: StepMode,
}

impl Drop for JournaledSolver {
    fn drop(&mut self) {
        self.journal.push(format!("solver dropped with {}", self.cloths.len()));
    }
}

impl Solver for JournaledSolver {
    fn add_cloth(&mut self, id: ClothId, cloth: Box<dyn ClothSim>) -> Result<(), Box<dyn ClothSim>> {
        if self.cloths.iter().any(|(i, _)| *i == id) {
            return Err(cloth);
        }
        self.cloths.push((id, cloth));
        Ok(())
    }

    fn remove_cloth(&mut self, id: ClothId) -> Option<Box<dyn ClothSim>> {
        let index = self.cloths.iter().position(|(i, _)| *i == id)?;
        Some(self.cloths.remove(index).1)
    }

    fn cloth(&self, id: ClothId) -> Option<&dyn ClothSim> {
        self.cloths.iter().find(|(i, _)| *i == id).map(|(_, c)| &**c)
    }

    fn cloth_mut(&mut self, id: ClothId) -> Option<&mut dyn ClothSim> {
        self.cloths
            .iter_mut()
            .find(|(i, _)| *i == id)
            .map(|(_, c)| &mut **c as &mut dyn ClothSim)
    }

    fn cloth_count(&self) -> usize {
        self.cloths.len()
    }

    fn step(&mut self, _dt: f32) -> WeftResult<StepResult> {
        self.journal.push("step begin");
        thread::sleep(Duration::from_millis(20));
        if self.mode == StepMode::Panic {
            panic!("stub solver exploded");
        }
        if self.mode == StepMode::Fail {
            self.journal.push("step end");
            return Err(WeftError::InvalidConfig("stub failure".into()));
        }
        for (_, cloth) in &mut self.cloths {
            for p in cloth.current_particles_mut() {
                p.y += 1.0;
            }
        }
        self.journal.push("step end");
        Ok(StepResult {
            iterations: 1,
            cloths: self.cloths.len(),
            wall_time: 0.0,
        })
    }

    fn name(&self) -> &str {
        "journaled"
    }
}

struct JournaledFactory {
    journal: Journal,
    mode: StepMode,
}

impl ClothFactory for JournaledFactory {
    fn cook_fabric(&self, desc: &MeshDescription, gravity: Vec3) -> WeftResult<Arc<Fabric>> {
        Ok(Arc::new(cook_fabric(desc, gravity)?))
    }

    fn create_solver(&self, _config: &SolverConfig) -> Box<dyn Solver> {
        Box::new(JournaledSolver {
            cloths: Vec::new(),
            journal: self.journal.clone(),
            mode: self.mode,
        })
    }

    fn create_cloth(&self, particles: Vec<Vec4>, fabric: Arc<Fabric>) -> WeftResult<Box<dyn ClothSim>> {
        Ok(Box::new(JournaledCloth {
            inner: Cloth::new(particles, fabric)?,
            journal: self.journal.clone(),
        }))
    }
}

struct JournaledBackend {
    journal: Journal,
    mode: StepMode,
}

impl PhysicsBackend for JournaledBackend {
    fn create_factory(&self) -> WeftResult<Box<dyn ClothFactory>> {
        Ok(Box::new(JournaledFactory {
            journal: self.journal.clone(),
            mode: self.mode,
        }))
    }

    fn name(&self) -> &str {
        "journaled"
    }
}

struct MissingBackend;

impl PhysicsBackend for MissingBackend {
    fn create_factory(&self) -> WeftResult<Box<dyn ClothFactory>> {
        Err(WeftError::BackendUnavailable("no device".into()))
    }

    fn name(&self) -> &str {
        "missing"
    }
}

fn journaled_controller(journal: &Journal, mode: StepMode) -> ClothController {
    let backend = JournaledBackend {
        journal: journal.clone(),
        mode,
    };
    ClothController::new(&backend, ControllerConfig::default()).unwrap()
}

// ─── Registry Tests ───────────────────────────────────────────

fn registry_with_cloth() -> (Registry, Box<dyn ClothFactory>, ClothKey, Arc<Fabric>) {
    let factory = CpuBackend.create_factory().unwrap();
    let desc = plane(2, 2);
    let fabric = factory.cook_fabric(&desc, Vec3::NEG_Y).unwrap();
    let sim = factory
        .create_cloth(desc.initial_particles(), Arc::clone(&fabric))
        .unwrap();
    let mut registry = Registry::new();
    registry.track_fabric(Arc::clone(&fabric));
    let cloth = registry.track_cloth_actor(weft_sim::ClothActor::new(sim, desc.render.clone(), entity()));
    (registry, factory, cloth, fabric)
}

#[test]
fn double_add_fails_every_time() {
    let (mut registry, factory, cloth, _) = registry_with_cloth();
    let solver = registry.track_solver(factory.create_solver(&SolverConfig::default()));
    let other = registry.track_solver(factory.create_solver(&SolverConfig::default()));

    registry.add_cloth_to_solver(cloth, solver).unwrap();
    for target in [solver, other, solver] {
        assert!(matches!(
            registry.add_cloth_to_solver(cloth, target),
            Err(WeftError::InvariantViolation(_))
        ));
    }
    assert_eq!(registry.solver_of(cloth), Some(solver));
    assert_eq!(registry.solver(solver).unwrap().cloth_count(), 1);
    assert_eq!(registry.solver(other).unwrap().cloth_count(), 0);

    // Re-adding is fine after a removal.
    registry.remove_cloth_from_solver(cloth).unwrap();
    registry.add_cloth_to_solver(cloth, other).unwrap();
    assert_eq!(registry.solver_of(cloth), Some(other));
}

#[test]
fn batch_add_is_all_or_nothing() {
    let (mut registry, factory, cloth, _) = registry_with_cloth();
    let solver = registry.track_solver(factory.create_solver(&SolverConfig::default()));
    assert!(matches!(
        registry.add_cloths_to_solver(&[cloth, cloth], solver),
        Err(WeftError::InvariantViolation(_))
    ));
    assert_eq!(registry.solver_of(cloth), None);
    assert!(registry.cloth(cloth).unwrap().is_detached());

    registry.add_cloths_to_solver(&[cloth], solver).unwrap();
    assert_eq!(registry.cloths_in_solver(solver), vec![cloth]);
}

#[test]
fn untracking_attached_objects_is_rejected() {
    let (mut registry, factory, cloth, _) = registry_with_cloth();
    let solver = registry.track_solver(factory.create_solver(&SolverConfig::default()));
    registry.add_cloth_to_solver(cloth, solver).unwrap();

    assert!(matches!(
        registry.untrack_solver(solver),
        Err(WeftError::InvariantViolation(_))
    ));
    assert!(matches!(
        registry.untrack_cloth_actor(cloth),
        Err(WeftError::InvariantViolation(_))
    ));
    assert_eq!(registry.solver_count(), 1);
    assert_eq!(registry.cloth_count(), 1);

    registry.remove_cloth_from_solver(cloth).unwrap();
    assert!(registry.untrack_solver(solver).is_ok());
    assert!(registry.untrack_cloth_actor(cloth).is_ok());
    assert!(matches!(
        registry.untrack_solver(solver),
        Err(WeftError::UnknownHandle(_))
    ));
}

#[test]
fn sim_follows_the_cloth_between_homes() {
    let (mut registry, factory, cloth, _) = registry_with_cloth();
    let solver = registry.track_solver(factory.create_solver(&SolverConfig::default()));
    assert_eq!(registry.sim(cloth).unwrap().particle_count(), 9);

    registry.add_cloth_to_solver(cloth, solver).unwrap();
    assert!(!registry.cloth(cloth).unwrap().is_detached());
    assert_eq!(registry.sim(cloth).unwrap().particle_count(), 9);
    registry.sim_mut(cloth).unwrap().previous_particles_mut()[0].x = 7.0;

    registry.remove_cloth_from_solver(cloth).unwrap();
    assert_eq!(registry.sim(cloth).unwrap().previous_particles()[0].x, 7.0);
}

#[test]
fn untracking_a_fabric_hands_it_back() {
    let (mut registry, _, _, fabric) = registry_with_cloth();
    assert_eq!(registry.fabrics().len(), 1);
    let released = registry.untrack_fabric(&fabric).unwrap();
    assert!(Arc::ptr_eq(&released, &fabric));
    assert!(registry.fabrics().is_empty());
    assert!(registry.untrack_fabric(&fabric).is_none());
}

#[test]
fn sync_reaches_every_cloth_past_a_bad_one() {
    let (mut registry, factory, _, fabric) = registry_with_cloth();
    let desc = plane(2, 2);
    let sim = factory
        .create_cloth(desc.initial_particles(), Arc::clone(&fabric))
        .unwrap();
    let good = registry.track_cloth_actor(weft_sim::ClothActor::new(sim, desc.render.clone(), entity()));
    let sim = factory
        .create_cloth(desc.initial_particles(), Arc::clone(&fabric))
        .unwrap();
    let oversized = plane(3, 2).render;
    let bad = registry.track_cloth_actor(weft_sim::ClothActor::new(sim, oversized, entity()));
    registry.sim_mut(good).unwrap().current_particles_mut()[0].y = 3.0;

    let report = registry.sync_render_meshes(false);
    assert_eq!(report.synced, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, bad);
    assert!((registry.cloth(good).unwrap().render().position(0).y - 3.0).abs() < 1e-6);
}

// ─── Teardown Tests ───────────────────────────────────────────

#[test]
fn teardown_detaches_then_drops_solvers_then_cloths() {
    let journal = Journal::default();
    let mut controller = journaled_controller(&journal, StepMode::Normal);
    let desc = hanging_sheet();
    let solver = controller.create_solver().unwrap();
    let cloth = controller.spawn_cloth(&desc, entity(), solver).unwrap();
    let fabric = Arc::clone(controller.registry().cloth(cloth).unwrap().fabric());
    assert!(Arc::strong_count(&fabric) > 1);

    drop(controller);

    assert_eq!(
        journal.entries(),
        vec!["solver dropped with 0".to_string(), "cloth dropped".to_string()]
    );
    assert_eq!(Arc::strong_count(&fabric), 1);
}

#[test]
fn destroying_a_solver_keeps_its_cloths() {
    let journal = Journal::default();
    let mut controller = journaled_controller(&journal, StepMode::Normal);
    let solver = controller.create_solver().unwrap();
    let cloth = controller.spawn_cloth(&plane(2, 2), entity(), solver).unwrap();

    controller.destroy_solver(solver).unwrap();
    assert_eq!(journal.entries(), vec!["solver dropped with 0".to_string()]);
    assert_eq!(controller.registry().solver_of(cloth), None);
    assert_eq!(controller.particles(cloth).unwrap().len(), 9);

    controller.destroy_cloth(cloth).unwrap();
    assert_eq!(journal.entries().last().unwrap(), "cloth dropped");
    assert!(matches!(
        controller.particles(cloth),
        Err(WeftError::UnknownHandle(_))
    ));
}

// ─── Controller Phase Tests ───────────────────────────────────

#[test]
fn wait_is_a_barrier_before_sync() {
    let journal = Journal::default();
    let mut controller = journaled_controller(&journal, StepMode::Normal);
    let desc = plane(2, 2);
    let solver = controller.create_solver().unwrap();
    let cloth = controller.spawn_cloth(&desc, entity(), solver).unwrap();

    let step = controller.start_simulation(DT);
    journal.push("start returned");
    let report = step.wait();
    journal.push("wait returned");

    assert!(report.is_ok());
    assert_eq!(report.solvers, 1);
    assert_eq!(report.iterations, 1);
    assert!(journal.position("step end") < journal.position("wait returned"));

    // Reads after the wait see the whole step.
    for (p, rest) in controller.particles(cloth).unwrap().iter().zip(&desc.points) {
        assert!((p.y - rest.y - 1.0).abs() < 1e-6);
    }

    controller.sync_render_meshes().unwrap();
    let render = controller.render_mesh(cloth).unwrap();
    for i in 0..render.vertex_count() {
        assert!((render.position(i).y - desc.points[i].y - 1.0).abs() < 1e-6);
    }
}

#[test]
fn start_returns_before_the_step_finishes() {
    let journal = Journal::default();
    let mut controller = journaled_controller(&journal, StepMode::Normal);
    let solver = controller.create_solver().unwrap();
    controller.spawn_cloth(&plane(1, 1), entity(), solver).unwrap();

    let step = controller.start_simulation(DT);
    journal.push("start returned");
    drop(step);
    journal.push("dropped");

    // The stub sleeps inside step, so start got back first.
    assert!(journal.position("start returned") < journal.position("step end"));
    assert!(journal.position("step end") < journal.position("dropped"));
}

#[test]
fn every_solver_runs_each_frame() {
    let journal = Journal::default();
    let mut controller = journaled_controller(&journal, StepMode::Normal);
    let mut cloths = Vec::new();
    for _ in 0..3 {
        let solver = controller.create_solver().unwrap();
        cloths.push(controller.spawn_cloth(&plane(1, 1), entity(), solver).unwrap());
    }

    let report = controller.update(DT).unwrap();
    assert_eq!(report.solvers, 3);
    assert_eq!(controller.frame(), 1);
    let steps = journal.entries().iter().filter(|e| *e == "step end").count();
    assert_eq!(steps, 3);
    for cloth in cloths {
        assert!((controller.render_mesh(cloth).unwrap().position(0).y - 1.0).abs() < 1e-6);
    }
}

#[test]
fn failed_steps_are_reported() {
    let journal = Journal::default();
    let mut controller = journaled_controller(&journal, StepMode::Fail);
    let solver = controller.create_solver().unwrap();
    controller.spawn_cloth(&plane(1, 1), entity(), solver).unwrap();

    let report = controller.update(DT).unwrap();
    assert!(!report.is_ok());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, solver);

    // The solver came back and can step again.
    assert!(controller.registry().solver(solver).is_some());
    assert_eq!(controller.update(DT).unwrap().failures.len(), 1);
}

#[test]
fn panicking_step_hands_the_solver_back() {
    let journal = Journal::default();
    let mut controller = journaled_controller(&journal, StepMode::Panic);
    let solver = controller.create_solver().unwrap();
    let cloth = controller.spawn_cloth(&plane(1, 1), entity(), solver).unwrap();

    let report = controller.update(DT).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, solver);
    assert!(matches!(
        &report.failures[0].1,
        WeftError::StepPanicked(msg) if msg.contains("exploded")
    ));

    // Record and association survive; the cloth is still reachable.
    assert!(controller.registry().solver(solver).is_some());
    assert_eq!(controller.registry().solver_of(cloth), Some(solver));
    assert_eq!(controller.particles(cloth).unwrap().len(), 4);
    assert_eq!(controller.update(DT).unwrap().failures.len(), 1);

    controller.destroy_solver(solver).unwrap();
    assert_eq!(controller.registry().solver_of(cloth), None);
    controller.destroy_cloth(cloth).unwrap();
}

#[test]
fn telemetry_records_each_phase() {
    let journal = Journal::default();
    let mut controller = journaled_controller(&journal, StepMode::Normal);
    let sink = VecSink::new();
    controller.add_telemetry_sink(Box::new(sink.clone()));
    let solver = controller.create_solver().unwrap();
    controller.spawn_cloth(&plane(1, 1), entity(), solver).unwrap();

    controller.update(DT).unwrap();
    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0].kind, EventKind::FrameBegin { solver_count: 1, .. }));
    assert!(matches!(events[1].kind, EventKind::StepComplete { failed: 0, .. }));
    assert!(matches!(events[2].kind, EventKind::RenderSync { cloth_count: 1 }));
    assert!(events.iter().all(|e| e.frame == 0));
}

#[test]
fn mismatched_render_mirror_is_never_tracked() {
    let mut controller = cpu_controller();
    let solver = controller.create_solver().unwrap();
    controller.spawn_cloth(&plane(2, 2), entity(), solver).unwrap();

    let mut desc = plane(2, 2);
    let fabric = controller.cook_fabric(&desc).unwrap();
    desc.render = plane(3, 2).render;
    assert!(matches!(
        controller.create_cloth(&desc, &fabric, entity()),
        Err(WeftError::InvalidMesh(_))
    ));
    assert!(matches!(
        controller.create_cloth(&MeshDescription::default(), &fabric, entity()),
        Err(WeftError::InvalidMesh(_))
    ));
    assert!(matches!(
        controller.create_cloth(&plane(3, 3), &fabric, entity()),
        Err(WeftError::InvalidMesh(_))
    ));
    assert_eq!(controller.registry().cloth_count(), 1);

    controller.update(DT).unwrap();
    controller.update(DT).unwrap();
    assert_eq!(controller.frame(), 2);
}

// ─── Inert Controller Tests ───────────────────────────────────

#[test]
fn missing_factory_leaves_controller_inert() {
    let mut controller = ClothController::new(&MissingBackend, ControllerConfig::default()).unwrap();
    assert!(controller.is_inert());
    assert!(matches!(
        controller.init_error(),
        Some(WeftError::BackendUnavailable(_))
    ));

    assert!(matches!(
        controller.cook_fabric(&plane(1, 1)),
        Err(WeftError::ControllerInert)
    ));
    assert!(matches!(
        controller.create_solver(),
        Err(WeftError::ControllerInert)
    ));
    assert_eq!(controller.registry().fabrics().len(), 0);

    // Frames still run, with nothing to do.
    let report = controller.update(DT).unwrap();
    assert_eq!(report.solvers, 0);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = ControllerConfig::default();
    config.drag.pick_tolerance = 0.0;
    assert!(matches!(
        ClothController::new(&CpuBackend, config),
        Err(WeftError::InvalidConfig(_))
    ));
}

// ─── End-to-End Tests ─────────────────────────────────────────

#[test]
fn hanging_sheet_falls_but_pins_hold() {
    let desc = hanging_sheet();
    assert_eq!(desc.point_count(), 25);
    assert_eq!(desc.triangle_count(), 32);
    assert_eq!(desc.pinned_count(), 5);

    let mut controller = cpu_controller();
    let solver = controller.create_solver().unwrap();
    let fabric = controller.cook_fabric(&desc).unwrap();
    let cloth = controller.create_cloth(&desc, &fabric, entity()).unwrap();
    controller.add_cloth_to_solver(cloth, solver).unwrap();

    controller.update(DT).unwrap();

    let particles = controller.particles(cloth).unwrap();
    for (i, (p, rest)) in particles.iter().zip(&desc.points).enumerate() {
        if i < 5 {
            assert_eq!(p.xyz(), *rest);
        } else {
            assert!(p.y < rest.y, "point {i} did not fall");
            assert!(p.y > rest.y - 2.0 * GRAVITY * DT * DT);
        }
    }
    let render = controller.render_mesh(cloth).unwrap();
    assert!((render.position(24).y - particles[24].y).abs() < 1e-6);
}

#[test]
fn merged_sheets_share_one_cloth() {
    let mut a = plane(3, 3);
    let mut b = plane(3, 3);
    b.apply_transform(&Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
    a.merge(&b);
    assert_eq!(a.point_count(), 32);
    assert_eq!(a.triangle_count(), 36);
    assert!(a.triangles[18..].iter().flatten().all(|&i| i >= 16));

    let mut controller = cpu_controller();
    let solver = controller.create_solver().unwrap();
    let cloth = controller.spawn_cloth(&a, entity(), solver).unwrap();
    controller.update(DT).unwrap();
    assert_eq!(controller.particles(cloth).unwrap().len(), 32);
    assert_eq!(controller.render_mesh(cloth).unwrap().vertex_count(), 32);
}

#[test]
fn one_fabric_backs_many_cloths() {
    let desc = plane(2, 2);
    let mut controller = cpu_controller();
    let solver = controller.create_solver().unwrap();
    let fabric = controller.cook_fabric(&desc).unwrap();
    let first = controller.create_cloth(&desc, &fabric, entity()).unwrap();
    let second = controller.create_cloth(&desc, &fabric, entity()).unwrap();
    controller.add_cloths_to_solver(&[first, second], solver).unwrap();
    assert_eq!(controller.registry().fabrics().len(), 1);
    // test + registry + two actors + two cloths
    assert_eq!(Arc::strong_count(&fabric), 6);

    assert!(controller.release_fabric(&fabric));
    assert_eq!(Arc::strong_count(&fabric), 5);
    controller.update(DT).unwrap();
}

#[test]
fn previous_particles_can_be_borrowed_between_frames() {
    let desc = plane(2, 2);
    let mut controller = cpu_controller();
    let solver = controller.create_solver().unwrap();
    let cloth = controller.spawn_cloth(&desc, entity(), solver).unwrap();

    // Give the free sheet an upward velocity through the previous buffer.
    for p in controller.borrow_previous_particles(cloth).unwrap() {
        p.y -= 0.1;
    }
    controller.update(DT).unwrap();
    assert!(controller.particles(cloth).unwrap().iter().all(|p| p.y > 0.0));
}

// ─── Interactor Tests ─────────────────────────────────────────

fn down_ray() -> Ray {
    Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y)
}

#[test]
fn pick_prefers_near_particles_on_the_ray() {
    let interactor = Interactor::default();
    let key = ClothKey::default();
    let particles = [
        Vec4::new(0.0, 0.0, 0.0, 1.0),  // on the ray, distance 2
        Vec4::new(0.0, 1.0, 0.0, 1.0),  // on the ray, distance 1
        Vec4::new(0.5, 1.5, 0.0, 1.0),  // too far off the ray
        Vec4::new(0.0, 3.0, 0.0, 1.0),  // behind the origin
    ];
    let hit = interactor
        .pick(&down_ray(), [(key, Mat4::IDENTITY, &particles[..])])
        .unwrap();
    assert_eq!(hit.particle.0, 1);
    assert!((hit.distance - 1.0).abs() < 1e-6);
    assert!(hit.offset.abs() < 1e-6);
}

#[test]
fn pick_score_weighs_offset_and_distance() {
    let interactor = Interactor::default();
    let key = ClothKey::default();
    // 1.0 + 0.5 * 0.09 beats 1.2 + 0.
    let particles = [Vec4::new(0.0, 0.8, 0.0, 1.0), Vec4::new(0.09, 1.0, 0.0, 1.0)];
    let hit = interactor
        .pick(&down_ray(), [(key, Mat4::IDENTITY, &particles[..])])
        .unwrap();
    assert_eq!(hit.particle.0, 1);
}

#[test]
fn pick_uses_world_transform() {
    let interactor = Interactor::default();
    let key = ClothKey::default();
    let particles = [Vec4::new(-3.0, 0.0, 0.0, 1.0)];
    let shifted = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
    assert!(interactor
        .pick(&down_ray(), [(key, Mat4::IDENTITY, &particles[..])])
        .is_none());
    assert!(interactor
        .pick(&down_ray(), [(key, shifted, &particles[..])])
        .is_some());
}

#[test]
fn drag_offset_is_bounded_and_pins_are_untouched() {
    let config = DragConfig::default();
    let mut interactor = Interactor::new(config.clone());
    let key = ClothKey::default();

    let mut desc = plane(4, 4);
    desc.pin_by_side(4, 4, true);
    let current = desc.initial_particles();
    let mut previous = current.clone();

    let hit = interactor
        .begin(&down_ray(), [(key, Mat4::IDENTITY, &current[..])])
        .unwrap();
    assert_eq!(hit.particle.0, 12);

    // A ray far to the side would pull the point by a lot.
    let far = Ray::new(Vec3::new(5.0, 2.0, 0.0), Vec3::NEG_Y);
    let update = interactor
        .drag(&far, Mat4::IDENTITY, &current, &mut previous)
        .unwrap();
    assert!(update.world_offset.length() <= config.max_offset + 1e-6);
    assert!(update.affected > 0);

    let bound = config.max_weight * config.max_offset + 1e-6;
    for (i, (prev, cur)) in previous.iter().zip(&current).enumerate() {
        let moved = prev.xyz().distance(cur.xyz());
        assert!(moved <= bound, "particle {i} moved {moved}");
        if desc.is_pinned(i) {
            assert_eq!(prev, cur);
        }
    }
    // The dragged particle gets the full weight.
    assert!(previous[12].x < current[12].x);
}

#[test]
fn drag_requires_a_pick() {
    let mut interactor = Interactor::default();
    let particles = [Vec4::new(5.0, 0.0, 5.0, 1.0)];
    let mut previous = particles;
    assert!(interactor
        .begin(&down_ray(), [(ClothKey::default(), Mat4::IDENTITY, &particles[..])])
        .is_none());
    assert_eq!(interactor.state(), DragState::Idle);
    assert!(interactor
        .drag(&down_ray(), Mat4::IDENTITY, &particles, &mut previous)
        .is_none());
    assert!(!interactor.end());
}

#[test]
fn pointer_events_drive_the_controller() {
    let mut desc = plane(4, 4);
    desc.pin_by_side(4, 4, true);
    let mut controller = cpu_controller();
    let solver = controller.create_solver().unwrap();
    let cloth = controller.spawn_cloth(&desc, entity(), solver).unwrap();

    let viewport = Vec2::new(800.0, 600.0);
    let camera = ViewCamera::look_at(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, Vec3::NEG_Z, 1.0, viewport);
    let centre = viewport * 0.5;

    controller
        .handle_pointer_event(PointerEvent::Down(centre), &camera)
        .unwrap();
    assert_eq!(controller.dragged_particle().map(|(c, p)| (c, p.0)), Some((cloth, 12)));

    let update = controller
        .handle_pointer_event(PointerEvent::Move(centre + Vec2::new(200.0, 0.0)), &camera)
        .unwrap()
        .unwrap();
    assert!(update.world_offset.length() > 0.0);
    let before = controller.particles(cloth).unwrap()[12];
    assert_ne!(controller.previous_particles(cloth).unwrap()[12], before);

    controller
        .handle_pointer_event(PointerEvent::Up, &camera)
        .unwrap();
    assert_eq!(controller.drag_state(), DragState::Idle);
    assert!(controller
        .handle_pointer_event(PointerEvent::Move(centre), &camera)
        .unwrap()
        .is_none());
}

#[test]
fn destroying_the_dragged_cloth_ends_the_drag() {
    let mut controller = cpu_controller();
    let solver = controller.create_solver().unwrap();
    let cloth = controller.spawn_cloth(&plane(4, 4), entity(), solver).unwrap();
    let viewport = Vec2::new(400.0, 400.0);
    let camera = ViewCamera::look_at(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, Vec3::NEG_Z, 1.0, viewport);

    controller
        .handle_pointer_event(PointerEvent::Down(viewport * 0.5), &camera)
        .unwrap();
    assert!(controller.dragged_particle().is_some());
    controller.destroy_cloth(cloth).unwrap();
    assert_eq!(controller.drag_state(), DragState::Idle);
}

// ─── Camera Tests ─────────────────────────────────────────────

#[test]
fn camera_centre_ray_points_at_target() {
    let viewport = Vec2::new(640.0, 480.0);
    let eye = Vec3::new(0.0, 0.0, 5.0);
    let camera = ViewCamera::look_at(eye, Vec3::ZERO, Vec3::Y, 0.8, viewport);
    let ray = camera.screen_point_to_ray(viewport * 0.5);
    assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    assert!(ray.origin.distance(eye) < 0.05);

    // Screen y grows downward.
    let lower = camera.screen_point_to_ray(Vec2::new(320.0, 400.0));
    assert!(lower.direction.y < 0.0);
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn config_toml_overrides_defaults() {
    let config = ControllerConfig::from_toml_str(
        r#"
        worker_threads = 3
        telemetry = true

        [solver]
        iterations = 4

        [drag]
        max_offset = 0.5
        "#,
    )
    .unwrap();
    assert_eq!(config.worker_threads, 3);
    assert!(config.telemetry);
    assert_eq!(config.solver.iterations, 4);
    assert!((config.drag.max_offset - 0.5).abs() < 1e-6);
    assert!((config.drag.pick_tolerance - 0.1).abs() < 1e-6);
    assert!(config.validate().is_ok());

    let text = config.to_toml_string().unwrap();
    assert_eq!(ControllerConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn config_rejects_bad_input() {
    assert!(matches!(
        ControllerConfig::from_toml_str("worker_threads = \"many\""),
        Err(WeftError::Parse(_))
    ));
    let config = ControllerConfig::from_toml_str("[drag]\nprevious_blend = 1.5").unwrap();
    assert!(matches!(config.validate(), Err(WeftError::InvalidConfig(_))));
    assert!(matches!(
        ControllerConfig::from_toml_file(std::path::Path::new("/nonexistent/weft.toml")),
        Err(WeftError::Io(_))
    ));
}
