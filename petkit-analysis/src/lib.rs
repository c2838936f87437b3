//! petkit-analysis: Coincidence analytics for PET simulations.
//!
//! This crate provides pure functions over coincidence tables:
//! - **Classification** - true, scatter and random coincidences
//! - **Decays** - decay times per source and half-life fits
//! - **Histograms** - equal-width and automatically binned
//! - **Transaxial** - time-sliced detection positions and lines of response
//!
#![warn(missing_docs)]

mod classify;
mod decay;
mod error;
pub mod fit;
pub mod histogram;
mod transaxial;

pub use classify::{
    axial_detection_positions, axial_midpoints, axial_scatter_fraction, classify_coincidences,
    AxialProfile, CoincidenceCounts,
};
pub use decay::{extract_decay_times, fit_half_life, fit_half_life_with, DecayTimes, HalfLifeFit};
pub use error::{Error, FitError, Result};
pub use fit::{fit_exponential, fit_exponential_with, ExponentialFit, FitConfig};
pub use histogram::Histogram;
pub use transaxial::{
    detection_points, lines_of_response, partition_transaxial, partition_transaxial_capped,
    LineOfResponse, TransaxialPartition, TRANSAXIAL_EVENT_CAP,
};
