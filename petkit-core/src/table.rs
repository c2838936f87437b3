//! Columnar coincidence tables.
//!
//! An `EventTable` stores one `Vec<f64>` per named column (`SoA` layout).
//! Each row is one detected coincidence; rows have no identity beyond
//! their position.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Columns of a coincidence table read by the analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Column {
    Time1,
    RunId,
    GlobalPosX1,
    GlobalPosY1,
    GlobalPosZ1,
    GlobalPosX2,
    GlobalPosY2,
    GlobalPosZ2,
    ComptonPhantom1,
    ComptonPhantom2,
    RayleighPhantom1,
    RayleighPhantom2,
    EventId1,
    EventId2,
    SourceId1,
    SourceId2,
}

impl Column {
    /// Every known column.
    pub const ALL: [Column; 16] = [
        Column::Time1,
        Column::RunId,
        Column::GlobalPosX1,
        Column::GlobalPosY1,
        Column::GlobalPosZ1,
        Column::GlobalPosX2,
        Column::GlobalPosY2,
        Column::GlobalPosZ2,
        Column::ComptonPhantom1,
        Column::ComptonPhantom2,
        Column::RayleighPhantom1,
        Column::RayleighPhantom2,
        Column::EventId1,
        Column::EventId2,
        Column::SourceId1,
        Column::SourceId2,
    ];

    /// Column name as written by the simulation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time1 => "time1",
            Self::RunId => "runID",
            Self::GlobalPosX1 => "globalPosX1",
            Self::GlobalPosY1 => "globalPosY1",
            Self::GlobalPosZ1 => "globalPosZ1",
            Self::GlobalPosX2 => "globalPosX2",
            Self::GlobalPosY2 => "globalPosY2",
            Self::GlobalPosZ2 => "globalPosZ2",
            Self::ComptonPhantom1 => "comptonPhantom1",
            Self::ComptonPhantom2 => "comptonPhantom2",
            Self::RayleighPhantom1 => "RayleighPhantom1",
            Self::RayleighPhantom2 => "RayleighPhantom2",
            Self::EventId1 => "eventID1",
            Self::EventId2 => "eventID2",
            Self::SourceId1 => "sourceID1",
            Self::SourceId2 => "sourceID2",
        }
    }

    /// Looks up a column by its simulation name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|column| column.as_str() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table of coincidence events stored column by column.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventTable {
    columns: BTreeMap<String, Vec<f64>>,
    rows: usize,
}

impl EventTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, consuming and returning the table.
    ///
    /// # Errors
    /// Returns [`Error::ColumnLength`] if the column length differs from
    /// the columns already present.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.insert(name, values)?;
        Ok(self)
    }

    /// Adds or replaces a column.
    ///
    /// # Errors
    /// Returns [`Error::ColumnLength`] if the column length differs from
    /// the other columns.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !replacing_only && values.len() != self.rows {
            return Err(Error::ColumnLength {
                name,
                expected: self.rows,
                actual: values.len(),
            });
        }
        self.rows = values.len();
        self.columns.insert(name, values);
        Ok(())
    }

    /// Returns the values of a column.
    ///
    /// # Errors
    /// Returns [`Error::MissingColumn`] if the table has no such column.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Returns the values of a known column.
    ///
    /// # Errors
    /// Returns [`Error::MissingColumn`] if the table has no such column.
    pub fn get(&self, column: Column) -> Result<&[f64]> {
        self.column(column.as_str())
    }

    /// Returns true if the table has a column with this name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Appends the rows of another table with the same columns.
    ///
    /// # Errors
    /// Returns [`Error::MissingColumn`] if `other` lacks one of this
    /// table's columns.
    pub fn append(&mut self, other: &EventTable) -> Result<()> {
        if self.columns.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        for name in self.columns.keys() {
            if !other.columns.contains_key(name) {
                return Err(Error::MissingColumn(name.clone()));
            }
        }
        for (name, values) in &mut self.columns {
            values.extend_from_slice(&other.columns[name]);
        }
        self.rows += other.rows;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.as_str()), Some(column));
        }
        assert_eq!(Column::from_name("time2"), None);
        assert_eq!(Column::RayleighPhantom1.to_string(), "RayleighPhantom1");
    }

    #[test]
    fn test_event_table_operations() {
        let mut table = EventTable::new()
            .with_column("time1", vec![0.1, 0.2, 0.3])
            .unwrap()
            .with_column("eventID1", vec![1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert_eq!(table.get(Column::Time1).unwrap(), &[0.1, 0.2, 0.3]);
        assert!(table.has_column("eventID1"));

        let err = table.insert("eventID2", vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnLength {
                expected: 3,
                actual: 1,
                ..
            }
        ));

        let other = table.clone();
        table.append(&other).unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table.column("eventID1").unwrap()[3], 1.0);
    }

    #[test]
    fn test_missing_column() {
        let table = EventTable::new();
        let err = table.get(Column::GlobalPosZ1).unwrap_err();
        assert_eq!(err.to_string(), "missing column: globalPosZ1");
    }

    #[test]
    fn test_replace_single_column() {
        let mut table = EventTable::new().with_column("time1", vec![1.0]).unwrap();
        table.insert("time1", vec![1.0, 2.0]).unwrap();
        assert_eq!(table.len(), 2);
    }
}
