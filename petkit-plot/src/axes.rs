//! Drawing surface abstraction.
//!
//! Plot functions only add content to an [`Axes`]; creating, sizing and
//! saving the figure stays with the caller. [`Figure`] is the in-memory
//! implementation, rendered to SVG by [`Figure::render_svg`].

/// How histogram bars are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarStyle {
    /// Outline only.
    #[default]
    Step,
    /// Filled bars.
    Filled,
}

/// One series of plotted data.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    /// Unconnected markers.
    Scatter {
        /// Marker positions.
        points: Vec<(f64, f64)>,
        /// Marker radius in pixels.
        size: u32,
    },
    /// Histogram bars: `heights[i]` spans `edges[i]..edges[i + 1]`.
    Bars {
        /// Bin edges, one more than `heights`.
        edges: Vec<f64>,
        /// Bar heights.
        heights: Vec<f64>,
        /// Outline or filled.
        style: BarStyle,
        /// Opacity in `[0, 1]`.
        alpha: f64,
    },
    /// Connected polyline.
    Line {
        /// Vertices in drawing order.
        points: Vec<(f64, f64)>,
    },
    /// Independent straight segments.
    Segments {
        /// Segment end points.
        segments: Vec<[(f64, f64); 2]>,
    },
}

impl Series {
    /// Histogram bars from a bin-edge/height pair.
    #[must_use]
    pub fn bars(edges: &[f64], heights: &[f64], style: BarStyle, alpha: f64) -> Self {
        Self::Bars {
            edges: edges.to_vec(),
            heights: heights.to_vec(),
            style,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Every data-space point the series touches; bars include the
    /// baseline.
    pub(crate) fn extent_points(&self) -> Vec<(f64, f64)> {
        match self {
            Self::Scatter { points, .. } | Self::Line { points } => points.clone(),
            Self::Bars { edges, heights, .. } => {
                let mut points = Vec::with_capacity(edges.len() * 2);
                for (window, &h) in edges.windows(2).zip(heights) {
                    points.push((window[0], 0.0));
                    points.push((window[1], h));
                }
                points
            }
            Self::Segments { segments } => segments.iter().flatten().copied().collect(),
        }
    }
}

/// A series with its optional legend label.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Plotted data.
    pub series: Series,
    /// Legend entry.
    pub label: Option<String>,
}

impl Layer {
    /// Unlabelled layer.
    #[must_use]
    pub fn new(series: Series) -> Self {
        Self {
            series,
            label: None,
        }
    }

    /// Set legend label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A caller-owned plotting surface.
pub trait Axes {
    /// Adds one layer on top of the existing ones.
    fn add_layer(&mut self, layer: Layer);

    /// Sets the axes title.
    fn set_title(&mut self, title: &str);

    /// Sets the x axis label.
    fn set_xlabel(&mut self, label: &str);

    /// Sets the y axis label.
    fn set_ylabel(&mut self, label: &str);

    /// Makes one unit the same length on both axes.
    fn set_equal_aspect(&mut self);

    /// Shows a legend of the labelled layers.
    fn show_legend(&mut self);
}

/// In-memory figure with a single set of axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    pub(crate) layers: Vec<Layer>,
    pub(crate) title: Option<String>,
    pub(crate) xlabel: Option<String>,
    pub(crate) ylabel: Option<String>,
    pub(crate) equal_aspect: bool,
    pub(crate) legend: bool,
}

impl Figure {
    /// Empty figure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers in drawing order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Title, if set.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// X axis label, if set.
    #[must_use]
    pub fn xlabel(&self) -> Option<&str> {
        self.xlabel.as_deref()
    }

    /// Y axis label, if set.
    #[must_use]
    pub fn ylabel(&self) -> Option<&str> {
        self.ylabel.as_deref()
    }

    /// Whether both axes share a scale.
    #[must_use]
    pub fn equal_aspect(&self) -> bool {
        self.equal_aspect
    }

    /// Whether a legend is drawn.
    #[must_use]
    pub fn has_legend(&self) -> bool {
        self.legend
    }

    /// Legend labels in layer order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter_map(|layer| layer.label.as_deref())
            .collect()
    }

    /// Data bounds over all layers, `None` when nothing finite is plotted.
    #[must_use]
    pub fn data_bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for (px, py) in self
            .layers
            .iter()
            .flat_map(|layer| layer.series.extent_points())
            .filter(|(px, py)| px.is_finite() && py.is_finite())
        {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        (x.0 <= x.1).then_some((x, y))
    }
}

impl Axes for Figure {
    fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn set_xlabel(&mut self, label: &str) {
        self.xlabel = Some(label.to_string());
    }

    fn set_ylabel(&mut self, label: &str) {
        self.ylabel = Some(label.to_string());
    }

    fn set_equal_aspect(&mut self) {
        self.equal_aspect = true;
    }

    fn show_legend(&mut self) {
        self.legend = true;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_figure_records_calls() {
        let mut figure = Figure::new();
        figure.set_title("t");
        figure.set_xlabel("x");
        figure.add_layer(Layer::new(Series::Line {
            points: vec![(0.0, 1.0), (2.0, 3.0)],
        }));
        figure.add_layer(
            Layer::new(Series::Scatter {
                points: vec![(5.0, -1.0)],
                size: 1,
            })
            .with_label("dots"),
        );
        assert_eq!(figure.title(), Some("t"));
        assert_eq!(figure.xlabel(), Some("x"));
        assert_eq!(figure.ylabel(), None);
        assert_eq!(figure.layers().len(), 2);
        assert_eq!(figure.labels(), vec!["dots"]);
        assert!(!figure.has_legend());
        assert_eq!(figure.data_bounds(), Some(((0.0, 5.0), (-1.0, 3.0))));
    }

    #[test]
    fn test_bars_include_baseline() {
        let series = Series::bars(&[1.0, 2.0, 3.0], &[4.0, 5.0], BarStyle::Filled, 2.0);
        let mut figure = Figure::new();
        figure.add_layer(Layer::new(series.clone()));
        assert_eq!(figure.data_bounds(), Some(((1.0, 3.0), (0.0, 5.0))));
        assert!(matches!(series, Series::Bars { alpha, .. } if alpha == 1.0));
    }

    #[test]
    fn test_empty_figure_has_no_bounds() {
        let mut figure = Figure::new();
        assert_eq!(figure.data_bounds(), None);
        figure.add_layer(Layer::new(Series::Line {
            points: vec![(f64::NAN, 1.0)],
        }));
        assert_eq!(figure.data_bounds(), None);
    }
}
