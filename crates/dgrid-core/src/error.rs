//! Error type shared by every danger-grid operation.
//!
//! Out-of-bounds deposits are not errors; they go through
//! [`SpatialLayer::safely_add_danger_at`](crate::layer::SpatialLayer::safely_add_danger_at)
//! and are dropped silently. Everything else that the caller can get wrong
//! surfaces here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("time offset {seconds}s outside [{min}, {max}]")]
    TimeOutOfRange { seconds: i32, min: i32, max: i32 },

    #[error("cell ({x}, {y}) outside {width}x{height} grid")]
    CellOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("degenerate field: width {width}, height {height}, resolution {resolution}")]
    DegenerateDimensions {
        width: f64,
        height: f64,
        resolution: f64,
    },

    #[error("danger must be finite and non-negative, got {0}")]
    InvalidDanger(f64),

    #[error("invalid grid configuration: {0}")]
    InvalidConfig(String),

    #[error("distance costs have not been calculated for this grid")]
    DistanceCostsUnavailable,

    #[error("distance costs were already fused into this grid")]
    DistanceCostsAlreadyApplied,

    #[error("course file line {line}: {message}")]
    CourseParse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Shorthand result type for the crate.
pub type GridResult<T> = Result<T, GridError>;
