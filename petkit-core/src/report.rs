//! Values from simulation statistics reports.
//!
//! Reports written by the statistics actor are `key = value` lines, usually
//! prefixed with `#`. [`StatReport`] parses that layout. [`extract_metric`]
//! keeps the older scraping contract for free-form text: the metric name
//! immediately followed by its value.

use regex::Regex;

use crate::error::{Error, Result};

/// Value returned by [`extract_metric`] when the metric is absent.
pub const MISSING_METRIC: f64 = -1.0;

/// Finds the first occurrence of `name` immediately followed by one or
/// more word characters and parses those characters as a number.
///
/// Returns `Ok(None)` if there is no such occurrence.
///
/// # Errors
/// Returns [`Error::InvalidMetric`] if the characters following the name
/// are not a number.
pub fn find_metric(report: &str, name: &str) -> Result<Option<f64>> {
    let pattern = Regex::new(&format!(r"{}\w+", regex::escape(name)))
        .map_err(|err| Error::ConfigError(err.to_string()))?;
    let Some(found) = pattern.find(report) else {
        return Ok(None);
    };
    let value = &found.as_str()[name.len()..];
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| Error::InvalidMetric {
            name: name.to_string(),
            value: value.to_string(),
        })
}

/// Like [`find_metric`] but returns [`MISSING_METRIC`] (-1) when the
/// metric is absent. Callers must check for the sentinel.
///
/// # Errors
/// Returns [`Error::InvalidMetric`] if the characters following the name
/// are not a number.
pub fn extract_metric(report: &str, name: &str) -> Result<f64> {
    Ok(find_metric(report, name)?.unwrap_or(MISSING_METRIC))
}

/// A statistics report parsed into ordered `key = value` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatReport {
    entries: Vec<(String, String)>,
    text: String,
}

impl StatReport {
    /// Parses a report. Lines that are not `key = value` or `key: value`
    /// are kept only for the free-text fallback.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let line = line.trim().trim_start_matches('#').trim();
                let (key, value) = line.split_once('=').or_else(|| line.split_once(':'))?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self {
            entries,
            text: text.to_string(),
        }
    }

    /// Raw value of the first entry with this key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Numeric value of the first entry with this key. The first
    /// whitespace-separated token of the value is parsed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.get_str(key)?
            .split_whitespace()
            .next()?
            .parse()
            .ok()
    }

    /// Entries in report order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Looks the metric up as a key first, then falls back to
    /// [`find_metric`] over the raw text.
    ///
    /// # Errors
    /// Returns [`Error::InvalidMetric`] if the fallback match is not a
    /// number.
    pub fn metric(&self, name: &str) -> Result<Option<f64>> {
        if let Some(value) = self.get(name) {
            return Ok(Some(value));
        }
        find_metric(&self.text, name)
    }
}
