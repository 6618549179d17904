//! Error types for the Weft engine.
//!
//! All crates return `WeftResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the Weft engine.
#[derive(Debug, Error)]
pub enum WeftError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A flat mesh file contained a token that is not a number.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The physics backend could not create a simulation factory.
    #[error("Physics backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The controller failed to initialize and cannot create simulation objects.
    #[error("Cloth controller is inert: the physics factory was never created")]
    ControllerInert,

    /// A solver step panicked; the solver was recovered.
    #[error("Solver step panicked: {0}")]
    StepPanicked(String),

    /// A handle does not refer to a tracked object.
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),

    /// A registry invariant was violated (e.g., a cloth added to two solvers).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for `Result<T, WeftError>`.
pub type WeftResult<T> = Result<T, WeftError>;
