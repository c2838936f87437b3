//! SVG rendering of a [`Figure`] with `plotters`.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::axes::{BarStyle, Figure, Series};
use crate::error::{Error, Result};

/// Default output size in pixels.
pub const DEFAULT_SIZE: (u32, u32) = (800, 600);

const MARGIN: u32 = 10;
const X_LABEL_AREA: u32 = 40;
const Y_LABEL_AREA: u32 = 60;
const CAPTION_AREA: u32 = 30;
const PADDING: f64 = 0.05;

// Series colours, cycled in layer order.
const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

type Range2d = ((f64, f64), (f64, f64));

impl Figure {
    /// Renders the figure to an SVG file.
    ///
    /// # Errors
    /// Returns an error if drawing fails or the file cannot be written.
    pub fn render_svg(&self, path: &Path, size: (u32, u32)) -> Result<()> {
        let svg = self.to_svg(size)?;
        std::fs::write(path, svg)?;
        log::info!("wrote {} ({} layers)", path.display(), self.layers.len());
        Ok(())
    }

    /// Renders the figure to an SVG document.
    ///
    /// # Errors
    /// Returns an error if drawing fails.
    pub fn to_svg(&self, size: (u32, u32)) -> Result<String> {
        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
            self.draw(&root, size)?;
        }
        Ok(buffer)
    }

    fn draw(&self, root: &DrawingArea<SVGBackend<'_>, Shift>, size: (u32, u32)) -> Result<()> {
        root.fill(&WHITE).map_err(Error::render)?;
        let ((x0, x1), (y0, y1)) = self.view_range(size);

        let mut builder = ChartBuilder::on(root);
        builder
            .margin(MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA);
        if let Some(title) = &self.title {
            builder.caption(title, ("sans-serif", 20));
        }
        let mut chart = builder
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(Error::render)?;

        {
            let mut mesh = chart.configure_mesh();
            if let Some(label) = &self.xlabel {
                mesh.x_desc(label.as_str());
            }
            if let Some(label) = &self.ylabel {
                mesh.y_desc(label.as_str());
            }
            mesh.draw().map_err(Error::render)?;
        }

        for (index, layer) in self.layers.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            let annotation = match &layer.series {
                Series::Scatter { points, size } => chart.draw_series(
                    points
                        .iter()
                        .map(|&point| Circle::new(point, *size, color.filled())),
                ),
                Series::Bars {
                    edges,
                    heights,
                    style: BarStyle::Filled,
                    alpha,
                } => chart.draw_series(edges.windows(2).zip(heights).map(|(bin, &height)| {
                    Rectangle::new([(bin[0], 0.0), (bin[1], height)], color.mix(*alpha).filled())
                })),
                Series::Bars {
                    edges,
                    heights,
                    style: BarStyle::Step,
                    alpha,
                } => chart.draw_series(LineSeries::new(
                    step_outline(edges, heights),
                    color.mix(*alpha),
                )),
                Series::Line { points } => {
                    chart.draw_series(LineSeries::new(points.iter().copied(), color))
                }
                Series::Segments { segments } => chart.draw_series(
                    segments
                        .iter()
                        .map(|segment| PathElement::new(segment.to_vec(), color)),
                ),
            }
            .map_err(Error::render)?;

            if let Some(label) = &layer.label {
                annotation
                    .label(label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }

        if self.legend && self.layers.iter().any(|layer| layer.label.is_some()) {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(Error::render)?;
        }

        root.present().map_err(Error::render)?;
        Ok(())
    }

    /// Padded data range, stretched on one axis when the aspect is equal.
    fn view_range(&self, size: (u32, u32)) -> Range2d {
        let ((mut x0, mut x1), (mut y0, mut y1)) =
            self.data_bounds().unwrap_or(((0.0, 1.0), (0.0, 1.0)));
        if x0 == x1 {
            x0 -= 0.5;
            x1 += 0.5;
        }
        if y0 == y1 {
            y0 -= 0.5;
            y1 += 0.5;
        }
        let pad_x = (x1 - x0) * PADDING;
        let pad_y = (y1 - y0) * PADDING;
        let (x0, x1, y0, y1) = (x0 - pad_x, x1 + pad_x, y0 - pad_y, y1 + pad_y);

        if !self.equal_aspect {
            return ((x0, x1), (y0, y1));
        }

        let caption = if self.title.is_some() { CAPTION_AREA } else { 0 };
        let width = f64::from(size.0.saturating_sub(2 * MARGIN + Y_LABEL_AREA).max(1));
        let height = f64::from(size.1.saturating_sub(2 * MARGIN + X_LABEL_AREA + caption).max(1));
        let scale = ((x1 - x0) / width).max((y1 - y0) / height);
        let (cx, cy) = (0.5 * (x0 + x1), 0.5 * (y0 + y1));
        let (half_x, half_y) = (0.5 * scale * width, 0.5 * scale * height);
        ((cx - half_x, cx + half_x), (cy - half_y, cy + half_y))
    }
}

/// Outline of a step histogram, from the baseline at the first edge to the
/// baseline at the last.
fn step_outline(edges: &[f64], heights: &[f64]) -> Vec<(f64, f64)> {
    let mut outline = Vec::with_capacity(2 * heights.len() + 2);
    if let Some(&first) = edges.first() {
        outline.push((first, 0.0));
    }
    for (bin, &height) in edges.windows(2).zip(heights) {
        outline.push((bin[0], height));
        outline.push((bin[1], height));
    }
    if let Some(&last) = edges.get(heights.len()) {
        outline.push((last, 0.0));
    }
    outline
}
