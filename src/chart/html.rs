//! Interactive HTML view of a rating.

use std::fmt::Write as _;

use super::{ChartConfig, RatingPlot, Render, escape, svg};

/// Renders a self-contained HTML page: the chart with hover tooltips on every
/// measured point, followed by a per-band table.
#[derive(Debug, Clone, Default)]
pub struct HtmlChart {
    config: ChartConfig,
}

impl HtmlChart {
    /// Create a renderer with the given chart settings.
    #[must_use]
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }
}

impl Render for HtmlChart {
    fn render(&self, plot: &RatingPlot) -> String {
        let chart = svg::draw(plot, &self.config, true);
        if chart.is_empty() {
            return String::new();
        }

        let title = escape(&self.config.title);
        let mut html = String::with_capacity(chart.len() + 4096);
        let _ = writeln!(html, "<!DOCTYPE html>");
        let _ = writeln!(html, r#"<html lang="en">"#);
        let _ = writeln!(html, "<head>");
        let _ = writeln!(html, r#"<meta charset="utf-8">"#);
        let _ = writeln!(html, "<title>{} - STC {}</title>", title, plot.index);
        html.push_str(
            r#"<style>
  body { font-family: system-ui, sans-serif; margin: 2em; }
  table { border-collapse: collapse; margin-top: 1.5em; }
  th, td { padding: 0.25em 0.75em; text-align: right; border-bottom: 1px solid #ccc; }
  tr.deficient td { color: #e74c3c; }
  @media (prefers-color-scheme: dark) {
    body { background: #1a1a1a; color: #e0e0e0; }
    th, td { border-bottom-color: #404040; }
  }
</style>
"#,
        );
        let _ = writeln!(html, "</head>");
        let _ = writeln!(html, "<body>");
        let _ = writeln!(
            html,
            "<h1>STC {} <small>(deficiency {} dB)</small></h1>",
            plot.index, plot.deficiency
        );
        html.push_str(&chart);

        let _ = writeln!(html, "<table>");
        let _ = writeln!(
            html,
            "<thead><tr><th>Frequency [Hz]</th><th>STL [dB]</th>\
             <th>STC {} [dB]</th><th>Deviation [dB]</th></tr></thead>",
            plot.index
        );
        let _ = writeln!(html, "<tbody>");
        for (i, deviation) in plot.deviations().into_iter().enumerate() {
            let class = if deviation > 0.0 { r#" class="deficient""# } else { "" };
            let _ = writeln!(
                html,
                "<tr{}><td>{}</td><td>{:.3}</td><td>{:.0}</td><td>{:.3}</td></tr>",
                class, plot.frequencies[i], plot.measured[i], plot.contour[i], deviation
            );
        }
        let _ = writeln!(html, "</tbody>");
        let _ = writeln!(html, "</table>");
        let _ = writeln!(html, "</body>");
        let _ = writeln!(html, "</html>");
        html
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}
