//! Decay times per source and half-life estimation.

use petkit_core::{Column, EventTable};

use crate::error::Result;
use crate::fit::{fit_exponential_with, ExponentialFit, FitConfig};
use crate::histogram::Histogram;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coincidence times split by emitting source.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecayTimes {
    /// `time1` of coincidences where both legs come from source 0.
    pub source0: Vec<f64>,
    /// `time1` of coincidences where both legs come from source 1.
    pub source1: Vec<f64>,
}

/// Splits `time1` by source identifier. Rows whose legs disagree, or
/// come from any other source, are dropped.
///
/// # Errors
/// Returns an error if `time1`, `sourceID1` or `sourceID2` is missing.
pub fn extract_decay_times(table: &EventTable) -> Result<DecayTimes> {
    let time = table.get(Column::Time1)?;
    let source1 = table.get(Column::SourceId1)?;
    let source2 = table.get(Column::SourceId2)?;

    let mut decays = DecayTimes::default();
    for ((&t, &s1), &s2) in time.iter().zip(source1).zip(source2) {
        if s1 == 0.0 && s2 == 0.0 {
            decays.source0.push(t);
        } else if s1 == 1.0 && s2 == 1.0 {
            decays.source1.push(t);
        }
    }
    Ok(decays)
}

/// Exponential fit of a decay-time density.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HalfLifeFit {
    /// Automatically binned histogram of the decay times.
    pub histogram: Histogram,
    /// Fitted model of the histogram density.
    pub fit: ExponentialFit,
}

impl HalfLifeFit {
    /// Fitted half-life, in the unit of the decay times.
    #[must_use]
    pub fn half_life(&self) -> f64 {
        self.fit.half_life()
    }
}

/// Fits `a * exp(-b * t)` to the density histogram of `decays` (bin
/// count chosen automatically) and derives the half-life.
///
/// # Errors
/// Returns a fit error if the histogram has fewer than two bins or the
/// fit does not converge.
pub fn fit_half_life(decays: &[f64]) -> Result<HalfLifeFit> {
    fit_half_life_with(decays, &FitConfig::default())
}

/// [`fit_half_life`] with explicit fit settings.
///
/// # Errors
/// Returns a fit error if the histogram has fewer than two bins or the
/// fit does not converge.
pub fn fit_half_life_with(decays: &[f64], config: &FitConfig) -> Result<HalfLifeFit> {
    let histogram = Histogram::auto(decays);
    let fit = fit_exponential_with(&histogram.centers(), &histogram.density(), config)?;
    log::debug!(
        "half-life {:.3} from {} decays in {} bins",
        fit.half_life(),
        decays.len(),
        histogram.bins()
    );
    Ok(HalfLifeFit { histogram, fit })
}
