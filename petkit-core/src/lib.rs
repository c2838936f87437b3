//! petkit-core: Core types for PET digitizer configuration and
//! coincidence analysis.
//!
//! This crate provides the unit system, the detector description, the
//! digitizer chain builder and its host seam, the columnar event table and
//! statistics report parsing.
//!

pub mod detector;
pub mod digitizer;
pub mod error;
pub mod host;
pub mod report;
pub mod table;
pub mod units;

pub use detector::PetDetector;
pub use digitizer::{
    build_digitizer_chain, BlurAttribute, BlurMethod, DigitizerChain, DigitizerConfig,
    DigitizerStage, EnergyChannel, ReadoutPolicy, StageInput, StageParams,
};
pub use error::{Error, HostError, Result};
pub use host::{ActorRegistry, SimulationHost, Volume};
pub use report::{extract_metric, find_metric, StatReport, MISSING_METRIC};
pub use table::{Column, EventTable};
pub use units::Units;
