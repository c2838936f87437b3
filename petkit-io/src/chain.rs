//! JSON storage of digitizer chains and configurations.

use crate::Result;
use petkit_core::{DigitizerChain, DigitizerConfig};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Serializes a chain as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn chain_to_json(chain: &DigitizerChain) -> Result<String> {
    Ok(serde_json::to_string_pretty(chain)?)
}

/// Writes a chain as JSON.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_chain_json<P: AsRef<Path>>(path: P, chain: &DigitizerChain) -> Result<()> {
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, chain)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    log::debug!(
        "wrote {} stage chain to {}",
        chain.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Reads a chain from JSON and checks that it is a single linear
/// sequence.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded, or
/// [`petkit_core::Error::InvalidChain`] if the stages do not form a chain.
pub fn read_chain_json<P: AsRef<Path>>(path: P) -> Result<DigitizerChain> {
    let reader = BufReader::new(File::open(path)?);
    let chain: DigitizerChain = serde_json::from_reader(reader)?;
    chain.validate()?;
    Ok(chain)
}

/// Writes digitizer parameters as JSON.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_digitizer_config<P: AsRef<Path>>(path: P, config: &DigitizerConfig) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, config)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads digitizer parameters from JSON and validates them.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded, or
/// [`petkit_core::Error::ConfigError`] for out-of-range parameters.
pub fn read_digitizer_config<P: AsRef<Path>>(path: P) -> Result<DigitizerConfig> {
    let reader = BufReader::new(File::open(path)?);
    let config: DigitizerConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}
