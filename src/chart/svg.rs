//! Static SVG chart of a rating.
//!
//! Frequencies are drawn as evenly spaced categories. The reference contour is
//! a dashed red line labelled with its STC value, the measured curve a solid
//! blue line with markers. Light and dark mode are handled via CSS media
//! queries.

use std::fmt::Write as _;

use super::{ChartConfig, RatingPlot, Render, colors, escape};

/// Renders a rating as a standalone SVG image.
#[derive(Debug, Clone, Default)]
pub struct SvgChart {
    config: ChartConfig,
}

impl SvgChart {
    /// Create a renderer with the given chart settings.
    #[must_use]
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Chart settings used for rendering.
    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }
}

impl Render for SvgChart {
    fn render(&self, plot: &RatingPlot) -> String {
        draw(plot, &self.config, false)
    }

    fn extension(&self) -> &'static str {
        "svg"
    }
}

const MARGIN_TOP: u32 = 50;
const MARGIN_RIGHT: u32 = 150;
const MARGIN_BOTTOM: u32 = 70;
const MARGIN_LEFT: u32 = 80;

/// Draw the chart. With `tooltips`, each marker carries a hover `<title>`.
pub(crate) fn draw(plot: &RatingPlot, config: &ChartConfig, tooltips: bool) -> String {
    let n = plot.frequencies.len();
    if n == 0 || plot.measured.len() != n || plot.contour.len() != n {
        return String::new();
    }

    let mut svg = String::with_capacity(8192);

    let all_y: Vec<f64> = plot.measured.iter().chain(&plot.contour).copied().collect();
    let (min_y, max_y) = bounds_with_padding(&all_y, 0.08);

    let width = config.width.max(super::MIN_WIDTH);
    let height = config.height.max(super::MIN_HEIGHT);
    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;

    let scale_x = |i: usize| -> f64 {
        if n == 1 {
            f64::from(MARGIN_LEFT) + f64::from(plot_width) / 2.0
        } else {
            f64::from(MARGIN_LEFT) + i as f64 / (n - 1) as f64 * f64::from(plot_width)
        }
    };
    let scale_y = |v: f64| -> f64 {
        f64::from(MARGIN_TOP) + (1.0 - (v - min_y) / (max_y - min_y)) * f64::from(plot_height)
    };

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, height, width, height
    );

    svg.push_str(
        r#"<style>
  :root {
    --bg-color: #ffffff;
    --text-color: #1a1a1a;
    --grid-color: #e0e0e0;
    --axis-color: #333333;
    --legend-bg: #ffffff;
    --legend-border: #cccccc;
  }
  @media (prefers-color-scheme: dark) {
    :root {
      --bg-color: #1a1a1a;
      --text-color: #e0e0e0;
      --grid-color: #404040;
      --axis-color: #b0b0b0;
      --legend-bg: #2a2a2a;
      --legend-border: #505050;
    }
  }
  .background { fill: var(--bg-color); }
  .title { font: bold 18px system-ui, sans-serif; fill: var(--text-color); }
  .axis-label { font: 13px system-ui, sans-serif; fill: var(--text-color); }
  .tick-label { font: 11px system-ui, sans-serif; fill: var(--text-color); }
  .legend { font: 13px system-ui, sans-serif; fill: var(--text-color); }
  .note { font: 12px system-ui, sans-serif; fill: var(--text-color); }
  .grid { stroke: var(--grid-color); stroke-width: 1; }
  .axis { stroke: var(--axis-color); stroke-width: 1.5; }
  .legend-bg { fill: var(--legend-bg); stroke: var(--legend-border); }
  .point:hover { r: 7; }
</style>
"#,
    );

    let _ = writeln!(
        svg,
        r#"<rect class="background" width="{}" height="{}"/>"#,
        width, height
    );

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" class="title">{}</text>"#,
        f64::from(width) / 2.0,
        escape(&config.title)
    );

    // Vertical grid and frequency ticks
    for (i, frequency) in plot.frequencies.iter().enumerate() {
        let x = scale_x(i);
        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{}" x2="{:.2}" y2="{}" class="grid"/>"#,
            x,
            MARGIN_TOP,
            x,
            height - MARGIN_BOTTOM
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{}" text-anchor="middle" class="tick-label">{}</text>"#,
            x,
            height - MARGIN_BOTTOM + 20,
            frequency
        );
    }

    // Horizontal grid and level ticks
    for i in 0..=5 {
        let value = min_y + f64::from(i) / 5.0 * (max_y - min_y);
        let y = scale_y(value);
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{:.2}" x2="{}" y2="{:.2}" class="grid"/>"#,
            MARGIN_LEFT,
            y,
            width - MARGIN_RIGHT,
            y
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.2}" text-anchor="end" class="tick-label">{:.1}</text>"#,
            MARGIN_LEFT - 10,
            y + 4.0,
            value
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>"#,
        MARGIN_LEFT,
        height - MARGIN_BOTTOM,
        width - MARGIN_RIGHT,
        height - MARGIN_BOTTOM
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>"#,
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        height - MARGIN_BOTTOM
    );

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" class="axis-label">{}</text>"#,
        f64::from(MARGIN_LEFT + plot_width / 2),
        height - 20,
        escape(&config.x_label)
    );
    let _ = writeln!(
        svg,
        r#"<text x="25" y="{}" text-anchor="middle" class="axis-label" transform="rotate(-90 25 {})">{}</text>"#,
        f64::from(height) / 2.0,
        f64::from(height) / 2.0,
        escape(&config.y_label)
    );

    let contour_label = format!("STC {}", plot.index);
    let deviations = plot.deviations();

    // Reference contour, dashed
    let _ = writeln!(
        svg,
        r#"<path d="{}" stroke="{}" stroke-width="2.5" stroke-dasharray="8 5" fill="none"/>"#,
        polyline(&plot.contour, &scale_x, &scale_y),
        colors::CONTOUR
    );

    // Measured curve with markers
    let _ = writeln!(
        svg,
        r#"<path d="{}" stroke="{}" stroke-width="2.5" fill="none"/>"#,
        polyline(&plot.measured, &scale_x, &scale_y),
        colors::MEASURED
    );
    for (i, &value) in plot.measured.iter().enumerate() {
        if tooltips {
            let _ = writeln!(
                svg,
                r#"<circle class="point" cx="{:.2}" cy="{:.2}" r="4" fill="{}"><title>{} Hz: STL {:.2} dB, contour {:.0} dB, deviation {:.2} dB</title></circle>"#,
                scale_x(i),
                scale_y(value),
                colors::MEASURED,
                plot.frequencies[i],
                value,
                plot.contour[i],
                deviations[i]
            );
        } else {
            let _ = writeln!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="4" fill="{}"/>"#,
                scale_x(i),
                scale_y(value),
                colors::MEASURED
            );
        }
    }

    // Legend
    let legend_x = width - MARGIN_RIGHT + 15;
    let legend_y = MARGIN_TOP + 20;
    let _ = writeln!(
        svg,
        r#"<rect x="{}" y="{}" width="125" height="95" rx="4" class="legend-bg"/>"#,
        legend_x,
        legend_y - 15
    );
    let entries = [
        (contour_label.as_str(), colors::CONTOUR, true),
        ("STL", colors::MEASURED, false),
    ];
    for (i, (name, color, dashed)) in entries.iter().enumerate() {
        let y_offset = legend_y + i as u32 * 25;
        let dash = if *dashed { r#" stroke-dasharray="6 4""# } else { "" };
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="2.5"{}/>"#,
            legend_x + 8,
            y_offset + 5,
            legend_x + 30,
            y_offset + 5,
            color,
            dash
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" class="legend">{}</text>"#,
            legend_x + 38,
            y_offset + 9,
            name
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" class="note">Deficiency {} dB</text>"#,
        legend_x + 8,
        legend_y + 59,
        plot.deficiency
    );

    svg.push_str("</svg>\n");
    svg
}

fn polyline(
    values: &[f64],
    scale_x: &impl Fn(usize) -> f64,
    scale_y: &impl Fn(f64) -> f64,
) -> String {
    let mut path = String::new();
    for (i, &v) in values.iter().enumerate() {
        let prefix = if i == 0 { "M" } else { " L" };
        let _ = write!(path, "{} {:.2},{:.2}", prefix, scale_x(i), scale_y(v));
    }
    path
}

/// Calculates min/max bounds with padding, widening a zero range.
fn bounds_with_padding(values: &[f64], padding: f64) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    (min - range * padding, max + range * padding)
}
