//! Event table writer.

use crate::Result;
use petkit_core::EventTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for event tables.
///
/// Columns are written in the table's sorted column order; values use the
/// shortest representation that reads back to the same `f64`.
pub struct TableWriter<W: Write> {
    writer: BufWriter<W>,
}

impl TableWriter<File> {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> TableWriter<W> {
    /// Wraps any writer.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    /// Writes a table as CSV with a header row.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_csv(&mut self, table: &EventTable) -> Result<()> {
        let names: Vec<&str> = table.column_names().collect();
        let columns = names
            .iter()
            .map(|name| table.column(name))
            .collect::<petkit_core::Result<Vec<_>>>()?;

        writeln!(self.writer, "{}", names.join(","))?;
        for row in 0..table.len() {
            for (index, column) in columns.iter().enumerate() {
                if index > 0 {
                    self.writer.write_all(b",")?;
                }
                write!(self.writer, "{}", column[row])?;
            }
            self.writer.write_all(b"\n")?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes a table to a CSV file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_table_csv<P: AsRef<Path>>(path: P, table: &EventTable) -> Result<()> {
    let mut writer = TableWriter::create(&path)?;
    writer.write_csv(table)?;
    log::debug!(
        "wrote {} rows to {}",
        table.len(),
        path.as_ref().display()
    );
    Ok(())
}
