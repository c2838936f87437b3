//! petkit-plot: diagnostic plots for PET coincidence data.
//!
//! Plots are drawn onto any [`Axes`]; [`Figure`] records them in memory
//! and renders SVG through `plotters`.
//!
//! ```no_run
//! use petkit_plot::{plot_lor, Figure, DEFAULT_SIZE};
//! # fn run(table: &petkit_core::EventTable) -> petkit_plot::Result<()> {
//! let mut figure = Figure::new();
//! plot_lor(&mut figure, table, 100)?;
//! figure.render_svg(std::path::Path::new("lor.svg"), DEFAULT_SIZE)?;
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

mod axes;
mod diagnostics;
mod error;
mod svg;

pub use axes::{Axes, BarStyle, Figure, Layer, Series};
pub use diagnostics::{
    plot_axial_detection, plot_axial_scatter_fraction, plot_axial_sensitivity, plot_lor,
    plot_rad_decay, plot_randoms_delays, plot_transaxial_position, DecaySources, Isotope,
    HISTOGRAM_BINS,
};
pub use error::{Error, Result};
pub use svg::DEFAULT_SIZE;
