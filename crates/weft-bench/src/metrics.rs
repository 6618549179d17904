//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Particle count.
    pub particle_count: usize,
    /// Triangle count.
    pub triangle_count: usize,
    /// Pinned particle count.
    pub pinned_count: usize,
    /// Number of frames executed.
    pub frames: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average start/wait time per frame (seconds).
    pub avg_step_time: f64,
    /// Minimum step time.
    pub min_step_time: f64,
    /// Maximum step time.
    pub max_step_time: f64,
    /// Average constraint iterations per frame.
    pub avg_iterations: f32,
    /// Final kinetic energy (should settle for a stable drape).
    pub final_kinetic_energy: f64,
    /// Maximum particle displacement from its initial position.
    pub max_displacement: f32,
    /// Maximum distance any pinned particle moved (should be 0).
    pub max_pinned_drift: f32,
    /// Lowest particle height at the end of the run.
    pub lowest_point: f32,
}

impl BenchmarkMetrics {
    /// CSV header matching [`to_csv_row`](Self::to_csv_row).
    pub fn to_csv_header() -> String {
        "scenario,particle_count,triangle_count,pinned_count,frames,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,avg_iterations,final_ke,max_displacement,max_pinned_drift,lowest_point".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.1},{:.6e},{:.6},{:.6},{:.6}",
            self.scenario,
            self.particle_count,
            self.triangle_count,
            self.pinned_count,
            self.frames,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.avg_iterations,
            self.final_kinetic_energy,
            self.max_displacement,
            self.max_pinned_drift,
            self.lowest_point,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
