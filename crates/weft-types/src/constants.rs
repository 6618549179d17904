//! Simulation constants and defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Default simulation timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default number of constraint iterations per timestep.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 8;

/// Inverse masses at or below this value count as pinned.
pub const INV_MASS_EPSILON: f32 = 1.0e-6;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-7;

/// Radius difference below which a tangent cone degenerates to a cylinder.
pub const CONE_RADIUS_EPSILON: f32 = 1.0e-5;

/// Squared length below which an accumulated normal is considered degenerate.
pub const DEGENERATE_NORMAL_THRESHOLD: f32 = 1.0e-12;
