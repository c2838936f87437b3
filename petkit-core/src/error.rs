//! Error types for petkit-core.

use thiserror::Error;

/// Result type alias for petkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error reported by a simulation host while resolving volumes or
/// registering actors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No volume with this name exists in the host geometry.
    #[error("unknown volume: {0}")]
    UnknownVolume(String),

    /// An actor with this name is already registered.
    #[error("actor already registered: {0}")]
    DuplicateActor(String),

    /// Any other host-side failure.
    #[error("{0}")]
    Other(String),
}

/// Core error types for petkit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required column is absent from the event table.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A column does not have the same number of rows as the table.
    #[error("column {name} has {actual} rows, table has {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// The digitizer chain does not form a single linear sequence.
    #[error("invalid digitizer chain: {0}")]
    InvalidChain(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A metric was found in a report but its value is not a number.
    #[error("metric {name} has non-numeric value {value:?}")]
    InvalidMetric { name: String, value: String },

    /// Error propagated from the simulation host.
    #[error("simulation host error: {0}")]
    Host(#[from] HostError),
}
