//! The diagnostic plots of a coincidence table.
//!
//! Each function derives its data with `petkit-analysis` and adds it to a
//! caller-owned [`Axes`].

use petkit_analysis::{
    axial_detection_positions, axial_scatter_fraction, detection_points, fit_half_life,
    lines_of_response, partition_transaxial, DecayTimes, HalfLifeFit, Histogram,
    TRANSAXIAL_EVENT_CAP,
};
use petkit_core::{Column, EventTable};

use crate::axes::{Axes, BarStyle, Layer, Series};
use crate::error::Result;

/// Bins of the fixed-binning histograms.
pub const HISTOGRAM_BINS: usize = 100;

/// A radioactive isotope shown in [`plot_rad_decay`].
#[derive(Debug, Clone, PartialEq)]
pub struct Isotope {
    /// Display name.
    pub name: String,
    /// Reference half-life in seconds.
    pub half_life: f64,
}

impl Isotope {
    /// Isotope with a reference half-life in seconds.
    #[must_use]
    pub fn new(name: impl Into<String>, half_life: f64) -> Self {
        Self {
            name: name.into(),
            half_life,
        }
    }

    /// Oxygen-15.
    #[must_use]
    pub fn o15() -> Self {
        Self::new("O15", 122.24)
    }

    /// Fluorine-18.
    #[must_use]
    pub fn f18() -> Self {
        Self::new("F18", 6586.2)
    }

    fn reference_label(&self) -> String {
        format!("{} HL = {} sec", self.name, self.half_life)
    }
}

/// Isotopes emitted by sources 0 and 1.
#[derive(Debug, Clone, PartialEq)]
pub struct DecaySources {
    /// Isotope of source 0.
    pub source0: Isotope,
    /// Isotope of source 1, the one fitted.
    pub source1: Isotope,
}

impl Default for DecaySources {
    fn default() -> Self {
        Self {
            source0: Isotope::f18(),
            source1: Isotope::o15(),
        }
    }
}

fn set_labels(axes: &mut dyn Axes, xlabel: &str, ylabel: &str, title: &str) {
    axes.set_xlabel(xlabel);
    axes.set_ylabel(ylabel);
    axes.set_title(title);
}

fn histogram_layer(data: &[f64], bins: usize, style: BarStyle, alpha: f64) -> Layer {
    let histogram = Histogram::with_bins(data, bins);
    Layer::new(Series::bars(
        histogram.edges(),
        &histogram.counts_f64(),
        style,
        alpha,
    ))
}

/// Scatter of transaxial detection positions before and after
/// `slice_time`, first 1000 coincidences of each.
///
/// # Errors
/// Returns an error if `time1` or a transaxial position column is missing.
pub fn plot_transaxial_position(
    axes: &mut dyn Axes,
    table: &EventTable,
    slice_time: f64,
) -> Result<()> {
    let partition = partition_transaxial(table, slice_time)?;
    for (lines, when) in [(&partition.before, "before"), (&partition.after, "after")] {
        axes.add_layer(
            Layer::new(Series::Scatter {
                points: detection_points(lines),
                size: 1,
            })
            .with_label(format!("{when} {slice_time} s")),
        );
    }
    axes.set_equal_aspect();
    axes.show_legend();
    set_labels(
        axes,
        "mm",
        "mm",
        &format!("Transaxial detection position ({TRANSAXIAL_EVENT_CAP} first events only)"),
    );
    Ok(())
}

/// Step histogram of the axial detection position of both legs.
///
/// # Errors
/// Returns an error if a position column is missing.
pub fn plot_axial_detection(axes: &mut dyn Axes, table: &EventTable) -> Result<()> {
    let positions = axial_detection_positions(table)?;
    axes.add_layer(histogram_layer(
        &positions,
        HISTOGRAM_BINS,
        BarStyle::Step,
        1.0,
    ));
    set_labels(axes, "mm", "counts", "Axial coincidences detection position");
    Ok(())
}

/// Histogram of the axial mid-points of true coincidences.
pub fn plot_axial_sensitivity(axes: &mut dyn Axes, trues: &[f64]) {
    axes.add_layer(histogram_layer(trues, HISTOGRAM_BINS, BarStyle::Filled, 1.0));
    set_labels(axes, "mm", "counts", "Axial Sensitivity Detection");
}

/// Scatter fraction per axial bin, in percent.
///
/// # Errors
/// Returns an error if a position column is missing.
pub fn plot_axial_scatter_fraction(
    axes: &mut dyn Axes,
    table: &EventTable,
    scatters: &[f64],
) -> Result<()> {
    let profile = axial_scatter_fraction(table, scatters, HISTOGRAM_BINS)?;
    let percent: Vec<f64> = profile.values.iter().map(|v| v * 100.0).collect();
    axes.add_layer(Layer::new(Series::bars(
        &profile.edges,
        &percent,
        BarStyle::Filled,
        1.0,
    )));
    set_labels(axes, "mm", "%", "Axial Scatter fraction");
    Ok(())
}

/// Decay-time densities of both sources with the exponential fit of
/// source 1, sampled once per second up to `end_time` truncated to whole
/// seconds.
///
/// # Errors
/// Returns a fit error if the source 1 decays cannot be fitted.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn plot_rad_decay(
    axes: &mut dyn Axes,
    decays: &DecayTimes,
    sources: &DecaySources,
    end_time: f64,
) -> Result<HalfLifeFit> {
    let result = fit_half_life(&decays.source1)?;
    let samples = end_time.max(0.0) as usize;
    let curve = result.fit.curve(0.0, samples as f64, samples);

    for (times, isotope) in [
        (&decays.source1, &sources.source1),
        (&decays.source0, &sources.source0),
    ] {
        let histogram = Histogram::with_bins(times, HISTOGRAM_BINS);
        axes.add_layer(
            Layer::new(Series::bars(
                histogram.edges(),
                &histogram.density(),
                BarStyle::Filled,
                0.5,
            ))
            .with_label(isotope.reference_label()),
        );
    }
    axes.add_layer(
        Layer::new(Series::Line { points: curve }).with_label(format!(
            "{} fit HL = {:.2} sec",
            sources.source1.name,
            result.half_life()
        )),
    );
    axes.show_legend();
    set_labels(axes, "time (s)", "decay", "Rad decays");
    Ok(result)
}

/// Times of real randoms against the delayed-window estimate.
///
/// # Errors
/// Returns an error if the delayed table has no `time1` column.
pub fn plot_randoms_delays(
    axes: &mut dyn Axes,
    randoms: &[f64],
    delays: &EventTable,
) -> Result<()> {
    let delayed = delays.get(Column::Time1)?;
    axes.add_layer(
        histogram_layer(randoms, HISTOGRAM_BINS, BarStyle::Filled, 0.6)
            .with_label(format!("Real randoms = {}", randoms.len())),
    );
    axes.add_layer(
        histogram_layer(delayed, HISTOGRAM_BINS, BarStyle::Step, 1.0)
            .with_label(format!("Delays (estimated randoms) = {}", delayed.len())),
    );
    axes.show_legend();
    set_labels(axes, "time (s)", "events", "Randoms");
    Ok(())
}

/// The first `nb` lines of response as segments.
///
/// # Errors
/// Returns an error if a transaxial position column is missing.
pub fn plot_lor(axes: &mut dyn Axes, table: &EventTable, nb: usize) -> Result<()> {
    let segments = lines_of_response(table, nb)?
        .iter()
        .map(petkit_analysis::LineOfResponse::endpoints)
        .collect();
    axes.add_layer(Layer::new(Series::Segments { segments }));
    axes.set_equal_aspect();
    set_labels(
        axes,
        "Position in mm",
        "Position in mm",
        "Lines of response (LOR)",
    );
    Ok(())
}
