//! Integration tests for weft-bench.

use weft_bench::metrics::BenchmarkMetrics;
use weft_bench::runner::BenchmarkRunner;
use weft_bench::scenarios::{Scenario, ScenarioKind};
use weft_solver::{ClothFactory, CpuBackend, PhysicsBackend};
use weft_types::{WeftError, WeftResult};

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn hanging_sheet_setup() {
    let s = Scenario::hanging_sheet();
    assert_eq!(s.kind, ScenarioKind::HangingSheet);
    assert_eq!(s.description.point_count(), 441); // 21×21
    assert_eq!(s.description.triangle_count(), 800); // 20×20×2
    assert_eq!(s.description.quad_count(), 400);
    assert_eq!(s.description.pinned_count(), 21);
    assert!(s.description.points.iter().all(|p| (p.y - 1.0).abs() < 1e-6));
}

#[test]
fn flag_is_vertical_with_two_pins() {
    let s = Scenario::flag();
    assert_eq!(s.description.pinned_count(), 2);
    assert!(s.description.points.iter().all(|p| p.z.abs() < 1e-5));
    let top = s.description.points[0];
    let bottom = s.description.points[16 * 25];
    assert!((top.x - bottom.x).abs() < 1e-5);
    assert!((top.y - bottom.y - 1.0).abs() < 1e-5);
}

#[test]
fn tube_hangs_from_top_ring() {
    let s = Scenario::tube();
    assert_eq!(s.description.point_count(), 24 * 13);
    assert_eq!(s.description.pinned_count(), 24);
    assert!(s.description.validate().is_ok());
}

#[test]
fn merged_sheets_pin_both_tops() {
    let s = Scenario::merged_sheets();
    assert_eq!(s.description.point_count(), 2 * 121);
    assert_eq!(s.description.triangle_count(), 2 * 200);
    assert_eq!(s.description.pinned_count(), 22);
    assert!(s.description.triangles[200..]
        .iter()
        .flatten()
        .all(|&i| i >= 121));
}

#[test]
fn scenario_names_parse() {
    assert_eq!(ScenarioKind::all().len(), 4);
    for &kind in ScenarioKind::all() {
        assert_eq!(kind.name().parse::<ScenarioKind>().unwrap(), kind);
    }
    assert!(matches!(
        "sphere_drape".parse::<ScenarioKind>(),
        Err(WeftError::InvalidConfig(_))
    ));
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_hanging_sheet() {
    let scenario = Scenario::hanging_sheet().with_frames(5);
    let metrics = BenchmarkRunner::run(&scenario, &CpuBackend).unwrap();

    assert_eq!(metrics.scenario, "hanging_sheet");
    assert_eq!(metrics.frames, 5);
    assert_eq!(metrics.particle_count, 441);
    assert!(metrics.total_wall_time > 0.0);
    assert!(metrics.max_displacement > 0.0); // Gravity should cause displacement
    assert_eq!(metrics.max_pinned_drift, 0.0);
    assert!(metrics.lowest_point < 1.0);
    assert!(metrics.final_kinetic_energy > 0.0);
    assert!((metrics.avg_iterations - 8.0).abs() < 1e-6);
}

#[test]
fn run_all_scenarios() {
    for &kind in ScenarioKind::all() {
        let scenario = Scenario::from_kind(kind).with_frames(3);
        let metrics = BenchmarkRunner::run(&scenario, &CpuBackend).unwrap();
        assert_eq!(metrics.scenario, kind.name());
        assert!(metrics.total_wall_time >= 0.0);
        assert_eq!(metrics.max_pinned_drift, 0.0, "{} pins drifted", kind.name());
    }
}

#[test]
fn zero_frames_still_reports() {
    let scenario = Scenario::flag().with_frames(0);
    let metrics = BenchmarkRunner::run(&scenario, &CpuBackend).unwrap();
    assert_eq!(metrics.frames, 0);
    assert_eq!(metrics.avg_step_time, 0.0);
    assert_eq!(metrics.min_step_time, 0.0);
    assert_eq!(metrics.max_displacement, 0.0);
}

struct NoBackend;

impl PhysicsBackend for NoBackend {
    fn create_factory(&self) -> WeftResult<Box<dyn ClothFactory>> {
        Err(WeftError::BackendUnavailable("offline".into()))
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[test]
fn missing_backend_fails_the_run() {
    let scenario = Scenario::hanging_sheet().with_frames(1);
    assert!(matches!(
        BenchmarkRunner::run(&scenario, &NoBackend),
        Err(WeftError::BackendUnavailable(_))
    ));
}

// ─── Metrics Tests ────────────────────────────────────────────

fn sample_metrics(name: &str) -> BenchmarkMetrics {
    BenchmarkMetrics {
        scenario: name.into(),
        particle_count: 441,
        triangle_count: 800,
        pinned_count: 21,
        frames: 100,
        total_wall_time: 1.5,
        avg_step_time: 0.015,
        min_step_time: 0.01,
        max_step_time: 0.02,
        avg_iterations: 8.0,
        final_kinetic_energy: 1e-5,
        max_displacement: 0.5,
        max_pinned_drift: 0.0,
        lowest_point: 0.25,
    }
}

#[test]
fn metrics_csv_output() {
    let csv_row = sample_metrics("test").to_csv_row();
    assert!(csv_row.starts_with("test,441,800,21,100,"));
    let columns = BenchmarkMetrics::to_csv_header().split(',').count();
    assert_eq!(csv_row.split(',').count(), columns);
}

#[test]
fn metrics_csv_multi() {
    let csv = BenchmarkMetrics::to_csv(&[sample_metrics("a"), sample_metrics("b")]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3); // Header + 2 data rows
    assert!(lines[0].starts_with("scenario,"));
    assert!(lines[2].starts_with("b,"));
}

#[test]
fn metrics_json_round_trip() {
    let metrics = sample_metrics("test");
    let json = serde_json::to_string(&metrics).unwrap();
    let recovered: BenchmarkMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, metrics);
}
