//! True, scatter and random coincidence classification and axial
//! profiles.
//!
//! A coincidence is *true* when neither leg scattered in the phantom
//! (all Compton and Rayleigh counters are zero) and *scatter* otherwise.
//! It is *random* when the two legs carry different event identifiers.
//! The random predicate is independent of the true/scatter split, so a
//! row can be counted twice in the prompt total.

use petkit_core::{Column, EventTable};

use crate::error::Result;
use crate::histogram::{data_range, Histogram};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classified coincidences of one table.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoincidenceCounts {
    /// Axial mid-point `(z1 + z2) / 2` of true coincidences.
    pub trues: Vec<f64>,
    /// Axial mid-point of scatter coincidences.
    pub scatters: Vec<f64>,
    /// `time1` of random coincidences.
    pub randoms: Vec<f64>,
    /// `trues + scatters + randoms`, the prompt count as conventionally
    /// reported.
    pub total_prompts: usize,
    /// Rows in the classified table.
    pub rows: usize,
}

impl CoincidenceCounts {
    /// Rows counted in both the true/scatter split and the randoms.
    #[must_use]
    pub fn double_counted(&self) -> usize {
        self.total_prompts.saturating_sub(self.rows)
    }

    /// Scatter fraction `scatters / (trues + scatters)`, 0 for an empty
    /// table.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scatter_fraction(&self) -> f64 {
        let classified = self.trues.len() + self.scatters.len();
        if classified == 0 {
            0.0
        } else {
            self.scatters.len() as f64 / classified as f64
        }
    }
}

/// Axial mid-point of each coincidence.
///
/// # Errors
/// Returns an error if a position column is missing.
pub fn axial_midpoints(table: &EventTable) -> Result<Vec<f64>> {
    let z1 = table.get(Column::GlobalPosZ1)?;
    let z2 = table.get(Column::GlobalPosZ2)?;
    Ok(z1.iter().zip(z2).map(|(a, b)| (a + b) / 2.0).collect())
}

/// Axial detection positions of both legs: every `globalPosZ1` followed
/// by every `globalPosZ2`.
///
/// # Errors
/// Returns an error if a position column is missing.
pub fn axial_detection_positions(table: &EventTable) -> Result<Vec<f64>> {
    let z1 = table.get(Column::GlobalPosZ1)?;
    let z2 = table.get(Column::GlobalPosZ2)?;
    let mut positions = Vec::with_capacity(z1.len() + z2.len());
    positions.extend_from_slice(z1);
    positions.extend_from_slice(z2);
    Ok(positions)
}

/// Splits a table into true, scatter and random coincidences.
///
/// # Errors
/// Returns an error if one of the classification columns is missing.
pub fn classify_coincidences(table: &EventTable) -> Result<CoincidenceCounts> {
    let z = axial_midpoints(table)?;
    let compton1 = table.get(Column::ComptonPhantom1)?;
    let compton2 = table.get(Column::ComptonPhantom2)?;
    let rayleigh1 = table.get(Column::RayleighPhantom1)?;
    let rayleigh2 = table.get(Column::RayleighPhantom2)?;
    let event1 = table.get(Column::EventId1)?;
    let event2 = table.get(Column::EventId2)?;
    let time = table.get(Column::Time1)?;

    let mut counts = CoincidenceCounts {
        rows: table.len(),
        ..CoincidenceCounts::default()
    };
    for (row, &mid) in z.iter().enumerate() {
        let unscattered = compton1[row] == 0.0
            && compton2[row] == 0.0
            && rayleigh1[row] == 0.0
            && rayleigh2[row] == 0.0;
        if unscattered {
            counts.trues.push(mid);
        } else {
            counts.scatters.push(mid);
        }
        if event1[row] != event2[row] {
            counts.randoms.push(time[row]);
        }
    }
    counts.total_prompts = counts.trues.len() + counts.scatters.len() + counts.randoms.len();

    if counts.double_counted() > 0 {
        log::debug!(
            "{} of {} coincidences are counted as random and as true or scatter",
            counts.double_counted(),
            counts.rows
        );
    }
    Ok(counts)
}

/// Scatter fraction per axial bin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxialProfile {
    /// Bin edges along z.
    pub edges: Vec<f64>,
    /// Value per bin.
    pub values: Vec<f64>,
}

impl AxialProfile {
    /// Lower edge of each bin.
    #[must_use]
    pub fn lower_edges(&self) -> &[f64] {
        &self.edges[..self.edges.len().saturating_sub(1)]
    }
}

/// Ratio of scatter coincidences to all coincidences in each of `bins`
/// axial bins. Both histograms share the range of all mid-points; bins
/// without coincidences give 0.
///
/// # Errors
/// Returns an error if a position column is missing.
#[allow(clippy::cast_precision_loss)]
pub fn axial_scatter_fraction(
    table: &EventTable,
    scatters: &[f64],
    bins: usize,
) -> Result<AxialProfile> {
    let z = axial_midpoints(table)?;
    let range = data_range(&z);
    let all = Histogram::with_range(&z, bins, range);
    let scattered = Histogram::with_range(scatters, bins, range);
    let values = scattered
        .counts()
        .iter()
        .zip(all.counts())
        .map(|(&s, &a)| if a == 0 { 0.0 } else { s as f64 / a as f64 })
        .collect();
    Ok(AxialProfile {
        edges: all.edges().to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn table(rows: &[[f64; 8]]) -> EventTable {
        // z1, z2, compton1, compton2, rayleigh1, rayleigh2, event1, event2
        let column = |i: usize| rows.iter().map(|r| r[i]).collect::<Vec<f64>>();
        EventTable::new()
            .with_column("globalPosZ1", column(0))
            .and_then(|t| t.with_column("globalPosZ2", column(1)))
            .and_then(|t| t.with_column("comptonPhantom1", column(2)))
            .and_then(|t| t.with_column("comptonPhantom2", column(3)))
            .and_then(|t| t.with_column("RayleighPhantom1", column(4)))
            .and_then(|t| t.with_column("RayleighPhantom2", column(5)))
            .and_then(|t| t.with_column("eventID1", column(6)))
            .and_then(|t| t.with_column("eventID2", column(7)))
            .and_then(|t| {
                t.with_column("time1", (0..rows.len()).map(|i| i as f64 * 0.1).collect())
            })
            .unwrap()
    }

    #[test]
    fn test_unscattered_table_is_all_trues() {
        let t = table(&[
            [10.0, 20.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
            [-5.0, 5.0, 0.0, 0.0, 0.0, 0.0, 2.0, 2.0],
            [0.0, 4.0, 0.0, 0.0, 0.0, 0.0, 3.0, 3.0],
        ]);
        let counts = classify_coincidences(&t).unwrap();
        assert!(counts.scatters.is_empty());
        assert!(counts.randoms.is_empty());
        assert_eq!(counts.trues, axial_midpoints(&t).unwrap());
        assert_eq!(counts.trues, vec![15.0, 0.0, 2.0]);
        assert_eq!(counts.total_prompts, 3);
        assert_eq!(counts.double_counted(), 0);
    }

    #[test]
    fn test_scatter_and_random_overlap_is_double_counted() {
        let t = table(&[[0.0, 2.0, 1.0, 0.0, 0.0, 1.0, 7.0, 8.0]]);
        let counts = classify_coincidences(&t).unwrap();
        assert_eq!(counts.scatters, vec![1.0]);
        assert_eq!(counts.randoms, vec![0.0]);
        assert!(counts.trues.is_empty());
        assert_eq!(counts.total_prompts, 2);
        assert_eq!(counts.rows, 1);
        assert_eq!(counts.double_counted(), 1);
    }

    #[test]
    fn test_rayleigh_alone_marks_scatter() {
        let t = table(&[
            [0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 1.0, 1.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
        ]);
        let counts = classify_coincidences(&t).unwrap();
        assert_eq!(counts.scatters.len(), 1);
        assert_eq!(counts.trues.len(), 1);
        assert!((counts.scatter_fraction() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_column_is_error() {
        let t = EventTable::new()
            .with_column("globalPosZ1", vec![1.0])
            .unwrap();
        assert!(classify_coincidences(&t).is_err());
    }

    #[test]
    fn test_axial_detection_positions_concatenate_legs() {
        let t = table(&[
            [1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
            [3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
        ]);
        assert_eq!(
            axial_detection_positions(&t).unwrap(),
            vec![1.0, 3.0, 2.0, 4.0]
        );
    }

    #[test]
    fn test_axial_scatter_fraction() {
        // mid-points 0, 0, 10, 10; one scatter at each end
        let t = table(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
            [10.0, 10.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
            [10.0, 10.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0],
        ]);
        let counts = classify_coincidences(&t).unwrap();
        let profile = axial_scatter_fraction(&t, &counts.scatters, 5).unwrap();
        assert_eq!(profile.edges.len(), 6);
        assert_eq!(profile.values, vec![0.5, 0.0, 0.0, 0.0, 0.5]);
        assert_eq!(profile.lower_edges(), &[0.0, 2.0, 4.0, 6.0, 8.0]);
    }
}
