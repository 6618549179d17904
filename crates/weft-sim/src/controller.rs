//! Simulation controller: the per-frame orchestrator.
//!
//! Each frame runs three phases in order:
//!
//! ```text
//! let step = controller.start_simulation(dt); // submit every solver
//! let report = step.wait();                   // barrier
//! controller.sync_render_meshes()?;           // particles → render meshes
//! ```
//!
//! [`SimulationStep`] holds `&mut ClothController`, so no particle buffer,
//! render mesh or registry operation is reachable between start and wait.
//! Dropping the step without calling `wait` still waits.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec4;
use tracing::{debug, error, info, warn};
use weft_jobs::JobScheduler;
use weft_mesh::{MeshDescription, RenderMesh};
use weft_solver::{ClothFactory, Fabric, PhysicsBackend, SolverConfig};
use weft_telemetry::{EventBus, EventKind, EventSink};
use weft_types::{ParticleId, WeftError, WeftResult};

use crate::camera::RayCaster;
use crate::config::ControllerConfig;
use crate::entity::OwningEntity;
use crate::interactor::{DragState, DragUpdate, Interactor, PointerEvent};
use crate::registry::{ClothActor, ClothKey, Registry, SolverKey};

/// Outcome of one start/wait cycle.
#[derive(Debug, Default)]
pub struct StepReport {
    /// Timestep handed to every solver.
    pub dt: f32,
    /// Solvers that were submitted.
    pub solvers: usize,
    /// Total constraint iterations across solvers.
    pub iterations: u64,
    /// Wall-clock time from start to the end of the wait (seconds).
    pub wall_time: f64,
    /// Solvers whose step returned an error.
    pub failures: Vec<(SolverKey, WeftError)>,
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Top-level orchestrator owning the registry, scheduler and interactor.
pub struct ClothController {
    registry: Registry,
    scheduler: JobScheduler,
    factory: Option<Box<dyn ClothFactory>>,
    init_error: Option<WeftError>,
    config: ControllerConfig,
    interactor: Interactor,
    telemetry: Option<EventBus>,
    frame: u64,
}

impl ClothController {
    /// Builds a controller on `backend`.
    ///
    /// Fails only on an invalid configuration. If the backend cannot
    /// create its factory the controller is returned inert: the error is
    /// logged once, kept in [`init_error`](Self::init_error), and every
    /// creation call fails with [`WeftError::ControllerInert`].
    pub fn new(backend: &dyn PhysicsBackend, config: ControllerConfig) -> WeftResult<Self> {
        config.validate()?;

        let (factory, init_error) = match backend.create_factory() {
            Ok(factory) => {
                info!(backend = backend.name(), "physics factory created");
                (Some(factory), None)
            }
            Err(err) => {
                error!(backend = backend.name(), %err, "physics factory unavailable, controller is inert");
                (None, Some(err))
            }
        };

        let telemetry = config.telemetry.then(EventBus::new);

        Ok(Self {
            registry: Registry::new(),
            scheduler: JobScheduler::new(config.worker_threads),
            factory,
            init_error,
            interactor: Interactor::new(config.drag.clone()),
            config,
            telemetry,
            frame: 0,
        })
    }

    pub fn is_inert(&self) -> bool {
        self.factory.is_none()
    }

    /// The factory creation error, if the controller is inert.
    pub fn init_error(&self) -> Option<&WeftError> {
        self.init_error.as_ref()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Frames completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn worker_count(&self) -> usize {
        self.scheduler.worker_count()
    }

    fn factory(&self) -> WeftResult<&dyn ClothFactory> {
        self.factory.as_deref().ok_or(WeftError::ControllerInert)
    }

    // ─── Telemetry ────────────────────────────────────────────

    /// Registers a telemetry sink, enabling telemetry if it was off.
    pub fn add_telemetry_sink(&mut self, sink: Box<dyn EventSink>) {
        self.telemetry.get_or_insert_with(EventBus::new).add_sink(sink);
    }

    fn record(&self, kind: EventKind) {
        if let Some(bus) = &self.telemetry {
            bus.record(self.frame, kind);
        }
    }

    fn flush_telemetry(&mut self) {
        if let Some(bus) = &mut self.telemetry {
            bus.flush();
        }
    }

    // ─── Object lifecycle ─────────────────────────────────────

    /// Cooks `desc` into a fabric and tracks it.
    pub fn cook_fabric(&mut self, desc: &MeshDescription) -> WeftResult<Arc<Fabric>> {
        let gravity = self.config.solver.gravity_vec();
        let fabric = self.factory()?.cook_fabric(desc, gravity)?;
        self.registry.track_fabric(Arc::clone(&fabric));
        Ok(fabric)
    }

    /// Stops tracking `fabric` and drops the controller's reference.
    pub fn release_fabric(&mut self, fabric: &Arc<Fabric>) -> bool {
        self.registry.untrack_fabric(fabric).is_some()
    }

    /// Creates and tracks a solver using the controller's solver config.
    pub fn create_solver(&mut self) -> WeftResult<SolverKey> {
        let config = self.config.solver.clone();
        self.create_solver_with(&config)
    }

    pub fn create_solver_with(&mut self, config: &SolverConfig) -> WeftResult<SolverKey> {
        config.validate()?;
        let solver = self.factory()?.create_solver(config);
        Ok(self.registry.track_solver(solver))
    }

    /// Creates a cloth actor from `desc`'s initial particles and render mesh.
    ///
    /// The actor is tracked but not yet integrated by any solver.
    pub fn create_cloth(
        &mut self,
        desc: &MeshDescription,
        fabric: &Arc<Fabric>,
        entity: Arc<dyn OwningEntity>,
    ) -> WeftResult<ClothKey> {
        let factory = self.factory()?;
        desc.validate()?;
        let particles = desc.initial_particles();
        if particles.len() != fabric.particle_count() {
            return Err(WeftError::InvalidMesh(format!(
                "description has {} points but the fabric expects {}",
                particles.len(),
                fabric.particle_count()
            )));
        }
        let sim = factory.create_cloth(particles, Arc::clone(fabric))?;
        let actor = ClothActor::new(sim, desc.render.clone(), entity);
        Ok(self.registry.track_cloth_actor(actor))
    }

    /// Cooks, creates and attaches a cloth in one call.
    pub fn spawn_cloth(
        &mut self,
        desc: &MeshDescription,
        entity: Arc<dyn OwningEntity>,
        solver: SolverKey,
    ) -> WeftResult<ClothKey> {
        let fabric = self.cook_fabric(desc)?;
        let cloth = self.create_cloth(desc, &fabric, entity)?;
        self.add_cloth_to_solver(cloth, solver)?;
        Ok(cloth)
    }

    pub fn add_cloth_to_solver(&mut self, cloth: ClothKey, solver: SolverKey) -> WeftResult<()> {
        self.factory()?;
        self.registry.add_cloth_to_solver(cloth, solver)
    }

    pub fn add_cloths_to_solver(&mut self, cloths: &[ClothKey], solver: SolverKey) -> WeftResult<()> {
        self.factory()?;
        self.registry.add_cloths_to_solver(cloths, solver)
    }

    pub fn remove_cloth_from_solver(&mut self, cloth: ClothKey) -> WeftResult<()> {
        self.registry.remove_cloth_from_solver(cloth)
    }

    /// Detaches `cloth` if needed and destroys it.
    pub fn destroy_cloth(&mut self, cloth: ClothKey) -> WeftResult<()> {
        if self.registry.solver_of(cloth).is_some() {
            self.registry.remove_cloth_from_solver(cloth)?;
        }
        self.registry.untrack_cloth_actor(cloth)?;
        self.interactor.forget(cloth);
        Ok(())
    }

    /// Detaches every cloth the solver integrates, then destroys it.
    ///
    /// Detached cloths stay tracked and can be added to another solver.
    pub fn destroy_solver(&mut self, solver: SolverKey) -> WeftResult<()> {
        for cloth in self.registry.cloths_in_solver(solver) {
            self.registry.remove_cloth_from_solver(cloth)?;
        }
        self.registry.untrack_solver(solver)?;
        Ok(())
    }

    // ─── Frame phases ─────────────────────────────────────────

    /// Phase 1: submits one step per tracked solver and returns at once.
    pub fn start_simulation(&mut self, dt: f32) -> SimulationStep<'_> {
        let started = Instant::now();
        let mut solvers = 0;
        for (key, record) in self.registry.solver_records_mut() {
            if record.helper_mut().start(&self.scheduler, dt) {
                solvers += 1;
            } else {
                warn!(?key, "solver already stepping, skipped");
            }
        }
        self.record(EventKind::FrameBegin {
            dt,
            solver_count: solvers,
        });
        debug!(frame = self.frame, dt, solvers, "simulation started");

        SimulationStep {
            controller: self,
            dt,
            solvers,
            started,
            finished: false,
        }
    }

    /// Phase 3: copies particle positions into every render mesh.
    ///
    /// Every cloth is attempted and the frame advances even when some fail;
    /// the first failure is then returned.
    pub fn sync_render_meshes(&mut self) -> WeftResult<usize> {
        let report = self
            .registry
            .sync_render_meshes(self.config.recompute_normals);
        self.record(EventKind::RenderSync {
            cloth_count: report.synced,
        });
        self.frame += 1;
        self.flush_telemetry();
        match report.failures.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(report.synced),
        }
    }

    /// Runs start, wait and sync for one frame.
    pub fn update(&mut self, dt: f32) -> WeftResult<StepReport> {
        let report = self.start_simulation(dt).wait();
        self.sync_render_meshes()?;
        Ok(report)
    }

    // ─── Particle access ──────────────────────────────────────

    pub fn particles(&self, cloth: ClothKey) -> WeftResult<&[Vec4]> {
        self.registry
            .sim(cloth)
            .map(|s| s.current_particles())
            .ok_or_else(|| WeftError::UnknownHandle(format!("{cloth:?}")))
    }

    pub fn previous_particles(&self, cloth: ClothKey) -> WeftResult<&[Vec4]> {
        self.registry
            .sim(cloth)
            .map(|s| s.previous_particles())
            .ok_or_else(|| WeftError::UnknownHandle(format!("{cloth:?}")))
    }

    /// Mutable previous positions. Needs `&mut self`, so it can never
    /// overlap a stepping phase.
    pub fn borrow_previous_particles(&mut self, cloth: ClothKey) -> WeftResult<&mut [Vec4]> {
        self.registry
            .sim_mut(cloth)
            .map(|s| s.previous_particles_mut())
            .ok_or_else(|| WeftError::UnknownHandle(format!("{cloth:?}")))
    }

    pub fn render_mesh(&self, cloth: ClothKey) -> WeftResult<&RenderMesh> {
        self.registry
            .cloth(cloth)
            .map(|a| a.render())
            .ok_or_else(|| WeftError::UnknownHandle(format!("{cloth:?}")))
    }

    // ─── Interaction ──────────────────────────────────────────

    pub fn drag_state(&self) -> DragState {
        self.interactor.state()
    }

    /// Feeds one pointer event to the interactor.
    ///
    /// Returns the drag displacement applied on a move, if any.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        camera: &dyn RayCaster,
    ) -> WeftResult<Option<DragUpdate>> {
        match event {
            PointerEvent::Down(screen) => {
                let ray = camera.screen_point_to_ray(screen);
                let candidates = self.registry.pick_candidates();
                if let Some(hit) = self.interactor.begin(&ray, candidates) {
                    debug!(cloth = ?hit.cloth, particle = hit.particle.0, "drag started");
                    self.record(EventKind::DragBegin {
                        particle: hit.particle.0,
                        distance: hit.distance,
                    });
                }
                Ok(None)
            }
            PointerEvent::Move(screen) => {
                let DragState::Dragging { cloth, .. } = self.interactor.state() else {
                    return Ok(None);
                };
                let ray = camera.screen_point_to_ray(screen);
                let transform = self
                    .registry
                    .cloth(cloth)
                    .map(|a| a.entity().world_transform())
                    .ok_or_else(|| WeftError::UnknownHandle(format!("{cloth:?}")))?;
                let sim = self
                    .registry
                    .sim_mut(cloth)
                    .ok_or_else(|| WeftError::UnknownHandle(format!("{cloth:?}")))?;
                let (current, previous) = sim.buffers_mut();
                Ok(self.interactor.drag(&ray, transform, current, previous))
            }
            PointerEvent::Up => {
                if self.interactor.end() {
                    debug!("drag ended");
                    self.record(EventKind::DragEnd);
                }
                Ok(None)
            }
        }
    }

    /// Particle currently being dragged.
    pub fn dragged_particle(&self) -> Option<(ClothKey, ParticleId)> {
        match self.interactor.state() {
            DragState::Dragging { cloth, particle, .. } => Some((cloth, particle)),
            DragState::Idle => None,
        }
    }
}

impl Drop for ClothController {
    fn drop(&mut self) {
        self.registry.clear();
        if let Some(bus) = &mut self.telemetry {
            bus.shutdown();
        }
    }
}

/// An in-flight simulation step. Holds the controller exclusively.
#[must_use = "dropping the step waits immediately; call wait() to get the report"]
pub struct SimulationStep<'a> {
    controller: &'a mut ClothController,
    dt: f32,
    solvers: usize,
    started: Instant,
    finished: bool,
}

impl SimulationStep<'_> {
    /// Phase 2: blocks until every submitted solver has finished.
    pub fn wait(mut self) -> StepReport {
        self.finish()
    }

    fn finish(&mut self) -> StepReport {
        self.finished = true;
        let mut report = StepReport {
            dt: self.dt,
            solvers: self.solvers,
            ..Default::default()
        };
        for (key, record) in self.controller.registry.solver_records_mut() {
            match record.helper_mut().wait() {
                Some(Ok(result)) => report.iterations += u64::from(result.iterations),
                Some(Err(err)) => {
                    error!(?key, %err, "solver step failed");
                    report.failures.push((key, err));
                }
                None => {}
            }
        }
        report.wall_time = self.started.elapsed().as_secs_f64();
        self.controller.record(EventKind::StepComplete {
            wall_time: report.wall_time,
            failed: report.failures.len(),
        });
        debug!(wall_time = report.wall_time, failed = report.failures.len(), "simulation waited");
        report
    }
}

impl Drop for SimulationStep<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish();
        }
    }
}
