//! Transaxial detection positions and lines of response.

use petkit_core::{Column, EventTable};

use crate::error::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events kept per partition by [`partition_transaxial`]. A rendering
/// limit, not a physical one.
pub const TRANSAXIAL_EVENT_CAP: usize = 1000;

/// Transaxial positions of the two legs of one coincidence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineOfResponse {
    /// First leg x (mm).
    pub x1: f64,
    /// First leg y (mm).
    pub y1: f64,
    /// Second leg x (mm).
    pub x2: f64,
    /// Second leg y (mm).
    pub y2: f64,
}

impl LineOfResponse {
    /// Both detection positions.
    #[must_use]
    pub fn endpoints(&self) -> [(f64, f64); 2] {
        [(self.x1, self.y1), (self.x2, self.y2)]
    }

    /// Distance of the line from the scanner axis (x = y = 0).
    #[must_use]
    pub fn radial_offset(&self) -> f64 {
        let dx = self.x2 - self.x1;
        let dy = self.y2 - self.y1;
        let length = dx.hypot(dy);
        if length == 0.0 {
            self.x1.hypot(self.y1)
        } else {
            (self.x1 * dy - self.y1 * dx).abs() / length
        }
    }
}

/// Coincidences split at a time threshold.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransaxialPartition {
    /// Coincidences with `time1 < slice_time`, in table order.
    pub before: Vec<LineOfResponse>,
    /// Coincidences with `time1 >= slice_time`, in table order.
    pub after: Vec<LineOfResponse>,
}

/// Flattens coincidences into their detection positions, both legs of
/// each.
#[must_use]
pub fn detection_points(lines: &[LineOfResponse]) -> Vec<(f64, f64)> {
    lines.iter().flat_map(LineOfResponse::endpoints).collect()
}

fn transaxial_columns(table: &EventTable) -> Result<[&[f64]; 4]> {
    Ok([
        table.get(Column::GlobalPosX1)?,
        table.get(Column::GlobalPosY1)?,
        table.get(Column::GlobalPosX2)?,
        table.get(Column::GlobalPosY2)?,
    ])
}

fn line_at(columns: &[&[f64]; 4], row: usize) -> LineOfResponse {
    LineOfResponse {
        x1: columns[0][row],
        y1: columns[1][row],
        x2: columns[2][row],
        y2: columns[3][row],
    }
}

/// Splits transaxial positions at `slice_time`, keeping at most
/// [`TRANSAXIAL_EVENT_CAP`] coincidences on each side.
///
/// # Errors
/// Returns an error if `time1` or a transaxial position column is missing.
pub fn partition_transaxial(table: &EventTable, slice_time: f64) -> Result<TransaxialPartition> {
    partition_transaxial_capped(table, slice_time, TRANSAXIAL_EVENT_CAP)
}

/// [`partition_transaxial`] with an explicit per-partition cap.
///
/// # Errors
/// Returns an error if `time1` or a transaxial position column is missing.
pub fn partition_transaxial_capped(
    table: &EventTable,
    slice_time: f64,
    cap: usize,
) -> Result<TransaxialPartition> {
    let time = table.get(Column::Time1)?;
    let columns = transaxial_columns(table)?;

    let mut partition = TransaxialPartition::default();
    for (row, &t) in time.iter().enumerate() {
        if partition.before.len() >= cap && partition.after.len() >= cap {
            break;
        }
        let side = if t < slice_time {
            &mut partition.before
        } else {
            &mut partition.after
        };
        if side.len() < cap {
            side.push(line_at(&columns, row));
        }
    }
    Ok(partition)
}

/// The first `nb` coincidences as lines of response.
///
/// # Errors
/// Returns an error if a transaxial position column is missing.
pub fn lines_of_response(table: &EventTable, nb: usize) -> Result<Vec<LineOfResponse>> {
    let columns = transaxial_columns(table)?;
    Ok((0..nb.min(table.len()))
        .map(|row| line_at(&columns, row))
        .collect())
}
