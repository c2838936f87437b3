//! Plotting error types.

use thiserror::Error;

/// Result type for plotting operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Plotting error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error (missing columns).
    #[error("core error: {0}")]
    Core(#[from] petkit_core::Error),

    /// Analysis error (classification, fits).
    #[error("analysis error: {0}")]
    Analysis(#[from] petkit_analysis::Error),

    /// Drawing backend error.
    #[error("render error: {0}")]
    Render(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        Self::Render(err.to_string())
    }
}
