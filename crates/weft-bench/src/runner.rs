//! Benchmark runner: drives a controller through a scenario and collects metrics.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec4Swizzles;
use tracing::{debug, info};
use weft_sim::{ClothController, StaticEntity};
use weft_solver::cloth::{kinetic_energy, lowest_point};
use weft_solver::PhysicsBackend;
use weft_types::{WeftError, WeftResult};

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario on `backend`.
    ///
    /// The scenario's description is cooked, spawned into a fresh
    /// controller with one solver, and updated for `scenario.frames`
    /// frames. The first failed solver step aborts the run.
    pub fn run(scenario: &Scenario, backend: &dyn PhysicsBackend) -> WeftResult<BenchmarkMetrics> {
        let desc = &scenario.description;
        let mut controller = ClothController::new(backend, scenario.config.clone())?;
        if let Some(err) = controller.init_error() {
            return Err(WeftError::BackendUnavailable(err.to_string()));
        }

        let solver = controller.create_solver()?;
        let cloth = controller.spawn_cloth(desc, Arc::new(StaticEntity::identity()), solver)?;
        info!(
            scenario = scenario.kind.name(),
            particles = desc.point_count(),
            frames = scenario.frames,
            "benchmark started"
        );

        let mut step_times: Vec<f64> = Vec::with_capacity(scenario.frames as usize);
        let mut total_iterations: u64 = 0;
        let total_start = Instant::now();

        for frame in 0..scenario.frames {
            let mut report = controller.update(scenario.dt)?;
            if let Some((_, err)) = report.failures.pop() {
                return Err(err);
            }
            debug!(frame, wall_time = report.wall_time, "frame done");
            step_times.push(report.wall_time);
            total_iterations += report.iterations;
        }

        let total_wall_time = total_start.elapsed().as_secs_f64();

        let sim = controller
            .registry()
            .sim(cloth)
            .ok_or_else(|| WeftError::UnknownHandle(format!("{cloth:?}")))?;
        let particles = sim.current_particles();

        let mut max_displacement = 0.0f32;
        let mut max_pinned_drift = 0.0f32;
        for (i, (p, rest)) in particles.iter().zip(&desc.points).enumerate() {
            let moved = p.xyz().distance(*rest);
            max_displacement = max_displacement.max(moved);
            if desc.is_pinned(i) {
                max_pinned_drift = max_pinned_drift.max(moved);
            }
        }

        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = step_times.iter().copied().fold(f64::MAX, f64::min);
        let max_step = step_times.iter().copied().fold(0.0, f64::max);
        let avg_iter = if scenario.frames > 0 {
            total_iterations as f32 / scenario.frames as f32
        } else {
            0.0
        };

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            particle_count: desc.point_count(),
            triangle_count: desc.triangle_count(),
            pinned_count: desc.pinned_count(),
            frames: scenario.frames,
            total_wall_time,
            avg_step_time: avg_step,
            min_step_time: if step_times.is_empty() { 0.0 } else { min_step },
            max_step_time: max_step,
            avg_iterations: avg_iter,
            final_kinetic_energy: kinetic_energy(sim, scenario.dt),
            max_displacement,
            max_pinned_drift,
            lowest_point: lowest_point(sim),
        })
    }

    /// Run every scenario and return metrics for each.
    pub fn run_all(backend: &dyn PhysicsBackend) -> WeftResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run(&Scenario::from_kind(kind), backend))
            .collect()
    }
}
