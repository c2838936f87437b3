//! Memory-mapped event table reader.
//!

use crate::{Error, Result};
use memmap2::Mmap;
use petkit_core::EventTable;
use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without loading the entire file
/// into memory.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file contents as text.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the file is not UTF-8.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(self.as_bytes()).map_err(|err| {
            Error::InvalidFormat(format!("{} is not UTF-8: {err}", self.path.display()))
        })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Path the reader was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads a CSV event table.
///
/// # Errors
/// Returns an error if the file cannot be mapped or is not a valid table.
pub fn read_table_csv<P: AsRef<Path>>(path: P) -> Result<EventTable> {
    let reader = MappedFileReader::open(&path)?;
    let table = parse_table_csv(reader.as_str()?).map_err(|err| match err {
        Error::InvalidFormat(message) => {
            Error::InvalidFormat(format!("{}: {message}", reader.path().display()))
        }
        other => other,
    })?;
    log::debug!(
        "read {} rows from {}",
        table.len(),
        reader.path().display()
    );
    Ok(table)
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

/// Parses CSV text into an event table.
///
/// The first non-blank line names the columns. A column with an empty
/// name, as written for a row index, is skipped. Empty values read as NaN.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] for a missing header, duplicate
/// column names, rows with the wrong number of fields or non-numeric
/// values.
pub fn parse_table_csv(text: &str) -> Result<EventTable> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        return Err(Error::InvalidFormat("missing header row".to_string()));
    };

    let names: Vec<&str> = header.split(',').map(unquote).collect();
    let kept: Vec<usize> = (0..names.len()).filter(|&i| !names[i].is_empty()).collect();
    for (position, &i) in kept.iter().enumerate() {
        if kept[..position].iter().any(|&j| names[j] == names[i]) {
            return Err(Error::InvalidFormat(format!(
                "duplicate column {}",
                names[i]
            )));
        }
    }

    let body: Vec<(usize, &str)> = lines.collect();
    let rows: Vec<Vec<f64>> = body
        .par_iter()
        .map(|&(index, line)| -> Result<Vec<f64>> {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != names.len() {
                return Err(Error::InvalidFormat(format!(
                    "line {}: expected {} fields, found {}",
                    index + 1,
                    names.len(),
                    fields.len()
                )));
            }
            kept.iter()
                .map(|&i| {
                    let field = unquote(fields[i]);
                    if field.is_empty() {
                        return Ok(f64::NAN);
                    }
                    field.parse::<f64>().map_err(|_| {
                        Error::InvalidFormat(format!(
                            "line {}: column {} has non-numeric value {field:?}",
                            index + 1,
                            names[i]
                        ))
                    })
                })
                .collect()
        })
        .collect::<Result<_>>()?;

    let mut table = EventTable::new();
    for (position, &i) in kept.iter().enumerate() {
        let values = rows.iter().map(|row| row[position]).collect();
        table.insert(names[i], values)?;
    }
    Ok(table)
}
