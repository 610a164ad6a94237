//! Embeddable SVG line chart and placeholder images.

use downloads_core::{MergedTable, Result};
use tracing::debug;

use crate::{
    format::{escape_xml, format_axis_date, format_number},
    palette::Palette,
    scale::{ChartScales, PlotArea},
    synth::synthesize_with,
};

const LEGEND_ITEM_HEIGHT: f64 = 18.0;
const BASE_HEIGHT: f64 = 400.0;
const MAX_X_LABELS: usize = 8;

/// Width and height of placeholder images.
pub const PLACEHOLDER_SIZE: (u32, u32) = (800, 400);

/// Text color of a placeholder image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderTone {
    /// Neutral grey, for missing input or empty data.
    Info,
    /// Red, for failures.
    Error,
}

/// Renders a blank image with a centered message.
#[must_use]
pub fn placeholder_svg(width: u32, height: u32, message: &str, tone: PlaceholderTone) -> String {
    let fill = match tone {
        PlaceholderTone::Info => "#666",
        PlaceholderTone::Error => "#ff0000",
    };
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
  <rect width="{w}" height="{h}" fill="#ffffff"/>
  <text x="{cx}" y="{cy}" text-anchor="middle" font-family="Arial" font-size="16" fill="{fill}">{msg}</text>
</svg>
"##,
        w = width,
        h = height,
        cx = f64::from(width) / 2.0,
        cy = f64::from(height) / 2.0,
        fill = fill,
        msg = escape_xml(message),
    )
}

/// Embeddable line chart with axes, grid and a vertical legend below the plot.
///
/// The image is 800 pixels wide; its height grows with the number of packages so the
/// legend never overlaps the plot.
#[derive(Clone, Debug)]
pub struct SvgChart {
    width: f64,
    brand: String,
}

impl Default for SvgChart {
    fn default() -> Self {
        Self {
            width: 800.0,
            brand: "npm.bet".to_string(),
        }
    }
}

impl SvgChart {
    /// Creates a chart renderer with default dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the brand label drawn above the plot.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    fn legend_height(package_count: usize) -> f64 {
        (package_count as f64 * LEGEND_ITEM_HEIGHT).max(20.0)
    }

    /// Renders `table` for `packages` (legend and colors follow their order).
    ///
    /// A table without rows renders a "No data available" image.
    ///
    /// # Errors
    /// Propagates geometry errors.
    pub fn render(&self, table: &MergedTable, packages: &[String]) -> Result<String> {
        let width = self.width;
        let legend_height = Self::legend_height(packages.len());
        let height = BASE_HEIGHT + legend_height;
        let (pad_top, pad_right, pad_left) = (40.0, 40.0, 60.0);
        let pad_bottom = 60.0 + legend_height;
        let plot_bottom = height - pad_bottom;

        if table.is_empty() {
            return Ok(placeholder_svg(
                width as u32,
                height as u32,
                "No data available",
                PlaceholderTone::Info,
            ));
        }

        debug!(rows = table.len(), packages = packages.len(), "Rendering SVG chart");
        let area = PlotArea::new(pad_left, pad_top, width - pad_left - pad_right, BASE_HEIGHT - 100.0);
        let scales = ChartScales::for_table(table, area);
        let geometry = synthesize_with(table, packages, &scales)?;

        let mut y_labels = String::new();
        for tick in scales.y_ticks() {
            let y = scales.y.map(tick);
            y_labels.push_str(&format!(
                r##"  <text x="{}" y="{}" text-anchor="end" font-family="Arial" font-size="12" fill="#666" alignment-baseline="middle">{}</text>
  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#e5e5e5" stroke-width="1"/>
"##,
                pad_left - 10.0,
                y,
                format_number(tick),
                pad_left,
                y,
                width - pad_right,
                y
            ));
        }

        let mut lines = String::new();
        for series in &geometry {
            lines.push_str(&format!(
                r##"  <path fill="none" stroke="{}" stroke-width="2" d="{}" stroke-linecap="round" stroke-linejoin="round"/>
"##,
                Palette::CHART.color(series.index),
                series.path_data()
            ));
        }

        let rows = table.rows();
        let step = rows.len().div_ceil(MAX_X_LABELS).max(1);
        let mut x_labels = String::new();
        for (i, row) in rows.iter().enumerate() {
            if i % step != 0 && i != rows.len() - 1 {
                continue;
            }
            x_labels.push_str(&format!(
                r##"  <text x="{}" y="{}" text-anchor="middle" font-family="Arial" font-size="12" fill="#666">{}</text>
"##,
                scales.x.map(i as f64),
                plot_bottom + 20.0,
                format_axis_date(row.period_key)
            ));
        }

        let legend_start = plot_bottom + 48.0;
        let mut legend = String::new();
        for (i, package) in packages.iter().enumerate() {
            legend.push_str(&format!(
                r##"  <g transform="translate({}, {})">
    <line x1="0" y1="0" x2="20" y2="0" stroke="{}" stroke-width="2"/>
    <text x="25" y="0" font-family="Arial" font-size="12" fill="#333" alignment-baseline="middle">{}</text>
  </g>
"##,
                pad_left,
                legend_start + i as f64 * LEGEND_ITEM_HEIGHT,
                Palette::CHART.color(i),
                escape_xml(package)
            ));
        }

        Ok(format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
  <rect width="{w}" height="{h}" fill="#ffffff"/>
  <text x="{cx}" y="20" text-anchor="middle" font-family="Arial" font-size="12" fill="#000" alignment-baseline="middle">{brand}</text>
{y_labels}{lines}{x_labels}  <line x1="{left}" y1="{top}" x2="{left}" y2="{bottom}" stroke="#333" stroke-width="1"/>
  <line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="#333" stroke-width="1"/>
{legend}</svg>
"##,
            w = width,
            h = height,
            cx = width / 2.0,
            brand = escape_xml(&self.brand),
            y_labels = y_labels,
            lines = lines,
            x_labels = x_labels,
            left = pad_left,
            top = pad_top,
            bottom = plot_bottom,
            right = width - pad_right,
            legend = legend,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use downloads_core::{BucketedPoint, Grouping, PackageSeries, TrimPolicy, merge_at};

    fn weekly_table(packages: &[(&str, &[u64])]) -> MergedTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let series: Vec<_> = packages
            .iter()
            .map(|(name, values)| {
                PackageSeries::new(
                    *name,
                    values
                        .iter()
                        .enumerate()
                        .map(|(i, &v)| BucketedPoint::new(start + Days::new(7 * i as u64), v))
                        .collect(),
                )
            })
            .collect();
        merge_at(
            &series,
            Grouping::Week,
            TrimPolicy::KeepAll,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_render_chart() {
        let table = weekly_table(&[("react", &[100, 400, 250]), ("vue", &[50, 80, 120])]);
        let names = vec!["react".to_string(), "vue".to_string()];

        let svg = SvgChart::new().render(&table, &names).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"height="436""#));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("#3b82f6"));
        assert!(svg.contains("#10b981"));
        assert!(svg.contains(">react</text>"));
        assert!(svg.contains(">Jan 7</text>"));
        assert!(svg.contains(">400</text>"));
        assert!(svg.contains(">npm.bet</text>"));
    }

    #[test]
    fn test_render_empty_table() {
        let table = weekly_table(&[]);
        let svg = SvgChart::new().render(&table, &["react".to_string()]).unwrap();
        assert!(svg.contains("No data available"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_x_labels_are_thinned() {
        let values: Vec<u64> = (1..=20).collect();
        let table = weekly_table(&[("a", &values)]);
        let svg = SvgChart::new().render(&table, &["a".to_string()]).unwrap();

        // step = ceil(20 / 8) = 3 -> indices 0,3,...,18 plus the last
        let labels = svg
            .matches(r##"text-anchor="middle" font-family="Arial" font-size="12" fill="#666""##)
            .count();
        assert_eq!(labels, 8);
    }

    #[test]
    fn test_package_names_are_escaped() {
        let table = weekly_table(&[("<evil>", &[1, 2])]);
        let svg = SvgChart::new().render(&table, &["<evil>".to_string()]).unwrap();
        assert!(svg.contains("&lt;evil&gt;"));
        assert!(!svg.contains("<evil>"));
    }

    #[test]
    fn test_placeholder() {
        let svg = placeholder_svg(800, 400, "Error generating chart", PlaceholderTone::Error);
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains(r#"x="400""#));
        assert!(svg.contains("Error generating chart"));
    }
}
