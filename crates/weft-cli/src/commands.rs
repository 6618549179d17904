//! CLI command implementations.

use std::path::Path;

use glam::{Mat4, Vec3};
use tracing::info;
use weft_bench::metrics::BenchmarkMetrics;
use weft_bench::runner::BenchmarkRunner;
use weft_bench::scenarios::{Scenario, ScenarioKind};
use weft_mesh::io::load_from_files;
use weft_sim::ControllerConfig;
use weft_solver::{cook_fabric, CpuBackend, PhaseKind};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Run one scenario with an optional controller config.
pub fn simulate(config_path: Option<&Path>, scenario_name: &str, frames: u32) -> CommandResult {
    println!("Weft Simulation");
    println!("───────────────");

    let config = match config_path {
        Some(path) => {
            println!("Config:    {}", path.display());
            ControllerConfig::from_toml_file(path)?
        }
        None => ControllerConfig::default(),
    };
    config.validate()?;

    let kind: ScenarioKind = scenario_name.parse()?;
    let scenario = Scenario::from_kind(kind)
        .with_config(config)
        .with_frames(frames);

    println!("Scenario:  {}", kind.name());
    println!(
        "Mesh:      {} particles, {} tris, {} pinned",
        scenario.description.point_count(),
        scenario.description.triangle_count(),
        scenario.description.pinned_count(),
    );
    println!("Frames:    {frames} (dt = {:.4}s)", scenario.dt);
    println!();

    let metrics = BenchmarkRunner::run(&scenario, &CpuBackend)?;

    println!("  Wall time:     {:.3}s", metrics.total_wall_time);
    println!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
    println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
    println!("  Lowest point:  {:.4}m", metrics.lowest_point);
    println!("  Pinned drift:  {:.6}m", metrics.max_pinned_drift);
    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(scenario_name: &str, output_path: Option<&Path>) -> CommandResult {
    println!("Weft Benchmark Suite");
    println!("════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![scenario_name.parse()?]
    };

    let mut all_metrics = Vec::new();

    for &kind in &scenarios {
        let scenario = Scenario::from_kind(kind);

        println!(
            "Running: {} ({} particles, {} tris, {} frames)",
            kind.name(),
            scenario.description.point_count(),
            scenario.description.triangle_count(),
            scenario.frames,
        );

        let metrics = BenchmarkRunner::run(&scenario, &CpuBackend)
            .map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
        println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        println!("  Max displace:  {:.4}m", metrics.max_displacement);
        println!();

        all_metrics.push(metrics);
    }

    let csv = BenchmarkMetrics::to_csv(&all_metrics);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        info!(path = %path.display(), rows = all_metrics.len(), "benchmark CSV written");
        println!("Results written to: {}", path.display());
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }

    Ok(())
}

/// Load a flat-file mesh, cook it, and print what the solver would see.
pub fn inspect_mesh(positions: &Path, indices: &Path) -> CommandResult {
    println!("Weft Mesh Inspector");
    println!("───────────────────");
    println!();

    let desc = load_from_files(positions, indices, Mat4::IDENTITY)?;

    println!("Points:       {}", desc.point_count());
    println!("Triangles:    {}", desc.triangle_count());

    let (min, max) = desc
        .points
        .iter()
        .fold((Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)), |(lo, hi), &p| {
            (lo.min(p), hi.max(p))
        });
    println!("Bounds:       [{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}]", min.x, min.y, min.z, max.x, max.y, max.z);
    let com = desc.center_of_mass();
    println!("Centroid:     [{:.4}, {:.4}, {:.4}]", com.x, com.y, com.z);

    let gravity = ControllerConfig::default().solver.gravity_vec();
    let fabric = cook_fabric(&desc, gravity)?;
    println!();
    println!("Fabric ({} constraints):", fabric.total_constraints());
    for kind in [
        PhaseKind::Horizontal,
        PhaseKind::Vertical,
        PhaseKind::Shearing,
        PhaseKind::Bending,
    ] {
        println!(
            "  {:<11} {:>6} in {} phase(s)",
            format!("{kind:?}"),
            fabric.constraint_count(kind),
            fabric.phase_count(kind),
        );
    }

    Ok(())
}

/// Validate a controller config.
pub fn validate(path: &Path) -> CommandResult {
    println!("Weft Validator");
    println!("──────────────");
    println!();

    println!("Validating config: {}", path.display());
    let config = ControllerConfig::from_toml_file(path)?;
    match config.validate() {
        Ok(()) => println!(
            "✅ Config is valid ({} iterations, {} workers).",
            config.solver.iterations,
            if config.worker_threads == 0 {
                "auto".to_string()
            } else {
                config.worker_threads.to_string()
            },
        ),
        Err(e) => {
            println!("❌ Config validation failed: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}
