//! One-dimensional histograms with equal-width bins.
//!
//! Binning follows the usual numerical convention: `n` bins span
//! `[min, max]`, every bin is half-open except the last, which also
//! includes `max`. A degenerate range is widened by 0.5 on each side.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counts of samples in equal-width bins.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram {
    /// Bin edges, one more than the number of bins.
    edges: Vec<f64>,
    /// Samples per bin.
    counts: Vec<u64>,
}

impl Histogram {
    /// Creates an empty histogram with `bins` bins over `range`.
    #[must_use]
    pub fn new(bins: usize, range: (f64, f64)) -> Self {
        let bins = bins.max(1);
        let (mut lo, mut hi) = range;
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let step = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + step * i as f64).collect();
        edges[bins] = hi;
        Self {
            edges,
            counts: vec![0; bins],
        }
    }

    /// Histogram of `data` with `bins` bins over the data range.
    #[must_use]
    pub fn with_bins(data: &[f64], bins: usize) -> Self {
        Self::with_range(data, bins, data_range(data))
    }

    /// Histogram of `data` with `bins` bins over `range`; samples outside
    /// the range are ignored.
    #[must_use]
    pub fn with_range(data: &[f64], bins: usize, range: (f64, f64)) -> Self {
        let mut histogram = Self::new(bins, range);
        for &value in data {
            histogram.fill(value);
        }
        histogram
    }

    /// Histogram of `data` with the bin count chosen automatically: the
    /// smaller of the Freedman-Diaconis and Sturges bin widths, Sturges
    /// alone when the interquartile range is zero.
    #[must_use]
    pub fn auto(data: &[f64]) -> Self {
        let bins = auto_bin_count(data);
        Self::with_bins(data, bins)
    }

    /// Adds one sample. Returns false if it falls outside the range.
    pub fn fill(&mut self, value: f64) -> bool {
        match self.bin_index(value) {
            Some(bin) => {
                self.counts[bin] += 1;
                true
            }
            None => false,
        }
    }

    /// Bin containing `value`, if any.
    #[must_use]
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        let lo = self.edges[0];
        let hi = self.edges[self.edges.len() - 1];
        if value.is_nan() || value < lo || value > hi {
            return None;
        }
        let n = self.counts.len();
        let mut bin = (((value - lo) / (hi - lo) * n as f64) as usize).min(n - 1);
        // The scaled index can disagree with the stored edges by one ulp.
        if value < self.edges[bin] {
            bin -= 1;
        } else if bin + 1 < n && value >= self.edges[bin + 1] {
            bin += 1;
        }
        Some(bin)
    }

    /// Bin edges.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Counts per bin.
    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Number of samples inside the range.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Range covered by the bins.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    /// Bin widths.
    #[must_use]
    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Bin centers.
    #[must_use]
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Probability density per bin: the integral over the range is 1.
    /// All zeros for an empty histogram.
    #[must_use]
    pub fn density(&self) -> Vec<f64> {
        let total = self.total() as f64;
        if total == 0.0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .zip(self.widths())
            .map(|(&count, width)| count as f64 / (total * width))
            .collect()
    }

    /// Counts as floating point values.
    #[must_use]
    pub fn counts_f64(&self) -> Vec<f64> {
        self.counts.iter().map(|&c| c as f64).collect()
    }
}

/// Minimum and maximum of the finite samples, `(0, 1)` when there are
/// none.
#[must_use]
pub fn data_range(data: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &value in data.iter().filter(|v| v.is_finite()) {
        lo = lo.min(value);
        hi = hi.max(value);
    }
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    }
}

/// Bin count for [`Histogram::auto`].
#[must_use]
pub fn auto_bin_count(data: &[f64]) -> usize {
    let finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 1;
    }
    let (lo, hi) = data_range(&finite);
    let span = hi - lo;
    if span == 0.0 {
        return 1;
    }
    let n = finite.len() as f64;
    let sturges = span / (n.log2() + 1.0);
    let iqr = percentile(&finite, 75.0) - percentile(&finite, 25.0);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };
    if width > 0.0 {
        ((span / width).ceil() as usize).max(1)
    } else {
        1
    }
}

/// Percentile `q` (0 to 100) with linear interpolation between order
/// statistics.
#[must_use]
pub fn percentile(data: &[f64], q: f64) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    let frac = rank - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}
