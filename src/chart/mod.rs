//! Rendering of rating results.
//!
//! The engine produces plain data; renderers turn a [`RatingPlot`] into a
//! document. [`SvgChart`] writes a static image, [`HtmlChart`] an interactive
//! page with per-point tooltips. Both honour the same [`ChartConfig`].

mod html;
mod svg;

pub use html::HtmlChart;
pub use svg::SvgChart;

use std::path::Path;

use crate::error::{Error, Result};
use crate::measurement::TransmissionLoss;
use crate::rating::Rating;

/// Everything a renderer needs: measured curve, winning contour, index and deficiency.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingPlot {
    /// Band frequencies in plotting order.
    pub frequencies: Vec<u32>,
    /// Measured STL per frequency.
    pub measured: Vec<f64>,
    /// Winning reference contour per frequency.
    pub contour: Vec<f64>,
    /// Winning contour index.
    pub index: usize,
    /// Rounded deficiency.
    pub deficiency: f64,
}

impl RatingPlot {
    /// Pair a rating with the measurement it was computed from.
    pub fn new(rating: &Rating, measured: &TransmissionLoss) -> Result<Self> {
        let frequencies: Vec<u32> = rating.contour().keys().copied().collect();
        let measured = frequencies
            .iter()
            .map(|&f| {
                measured.get(f).ok_or_else(|| {
                    Error::invalid_input(format!("measurement has no value at {} Hz", f))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self {
            frequencies,
            measured,
            contour: rating.contour().values().copied().collect(),
            index: rating.index(),
            deficiency: rating.deficiency(),
        })
    }

    /// Shortfall below the contour at each frequency.
    #[must_use]
    pub fn deviations(&self) -> Vec<f64> {
        self.contour
            .iter()
            .zip(&self.measured)
            .map(|(c, m)| (c - m).max(0.0))
            .collect()
    }
}

/// Chart configuration.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Chart title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Sound Transmission Class (STC)".to_string(),
            x_label: "1/3 Octave Frequency [Hz]".to_string(),
            y_label: "(R) Sound Transmission loss [dB]".to_string(),
            width: 900,
            height: 400,
        }
    }
}

impl ChartConfig {
    /// Creates a new chart configuration with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the X-axis label.
    #[must_use]
    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    /// Sets the Y-axis label.
    #[must_use]
    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    /// Sets the chart dimensions, clamped to a drawable minimum.
    ///
    /// A warning is logged when the requested size is raised.
    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(MIN_WIDTH);
        self.height = height.max(MIN_HEIGHT);
        if (self.width, self.height) != (width, height) {
            log::warn!(
                "chart size {}x{} is below the {}x{} minimum, using {}x{}",
                width,
                height,
                MIN_WIDTH,
                MIN_HEIGHT,
                self.width,
                self.height
            );
        }
        self
    }
}

pub(crate) const MIN_WIDTH: u32 = 320;
pub(crate) const MIN_HEIGHT: u32 = 200;

/// A visualization strategy for rating results.
pub trait Render {
    /// Render the plot to a complete document.
    fn render(&self, plot: &RatingPlot) -> String;

    /// File extension of the rendered document, without the dot.
    fn extension(&self) -> &'static str;
}

/// Render `plot` with `renderer` and write it to `path`.
pub fn export(renderer: &dyn Render, plot: &RatingPlot, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let document = renderer.render(plot);
    if document.is_empty() {
        return Err(Error::Report(format!(
            "nothing to render for {}",
            path.display()
        )));
    }
    std::fs::write(path, document)?;
    log::info!(
        "Exported STC {} {} chart to {}",
        plot.index,
        renderer.extension(),
        path.display()
    );
    Ok(())
}

/// Escape text for XML and HTML content.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standard colors for the two series.
pub mod colors {
    /// Red, for the reference contour.
    pub const CONTOUR: &str = "#e74c3c";
    /// Blue, for the measured curve.
    pub const MEASURED: &str = "#3498db";
}
