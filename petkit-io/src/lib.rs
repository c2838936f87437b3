//! petkit-io: file I/O for petkit.
//!
//! Event tables are CSV files with a header row of column names, read
//! through a memory map. Digitizer chains and configurations are stored
//! as JSON. Statistics reports are loaded into a
//! [`petkit_core::StatReport`].

mod chain;
mod error;
mod reader;
mod stats;
mod writer;

pub use chain::{
    chain_to_json, read_chain_json, read_digitizer_config, write_chain_json,
    write_digitizer_config,
};
pub use error::{Error, Result};
pub use reader::{parse_table_csv, read_table_csv, MappedFileReader};
pub use stats::{read_metric, read_stat_report};
pub use writer::{write_table_csv, TableWriter};
