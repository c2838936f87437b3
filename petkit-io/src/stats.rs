//! Statistics report files.

use crate::Result;
use petkit_core::{StatReport, MISSING_METRIC};
use std::path::Path;

/// Loads a statistics report.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_stat_report<P: AsRef<Path>>(path: P) -> Result<StatReport> {
    let text = std::fs::read_to_string(path)?;
    Ok(StatReport::parse(&text))
}

/// Reads one metric from a statistics report file, [`MISSING_METRIC`]
/// (-1) when it is absent.
///
/// # Errors
/// Returns an error if the file cannot be read or the metric value is not
/// a number.
pub fn read_metric<P: AsRef<Path>>(path: P, name: &str) -> Result<f64> {
    let report = read_stat_report(&path)?;
    let value = report.metric(name)?;
    if value.is_none() {
        log::warn!("metric {name} not found in {}", path.as_ref().display());
    }
    Ok(value.unwrap_or(MISSING_METRIC))
}
