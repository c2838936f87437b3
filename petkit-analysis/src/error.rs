//! Error types for petkit-analysis.

use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from curve fitting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Not enough points to determine the model parameters.
    #[error("insufficient data: need at least {required} points, got {provided}")]
    InsufficientData { required: usize, provided: usize },

    /// The x and y samples differ in length.
    #[error("length mismatch: {x} x values, {y} y values")]
    LengthMismatch { x: usize, y: usize },

    /// The iteration budget ran out before the fit converged.
    #[error("fit did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },

    /// The residuals are not finite at the starting point.
    #[error("non-finite residuals at the initial estimate")]
    NonFinite,
}

/// Analysis error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error (missing or malformed columns).
    #[error("core error: {0}")]
    Core(#[from] petkit_core::Error),

    /// Curve fitting error.
    #[error("fit error: {0}")]
    Fit(#[from] FitError),
}
