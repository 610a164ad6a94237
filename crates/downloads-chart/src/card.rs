//! Social preview card comparing up to a handful of packages.

use downloads_core::{MergedTable, Result};
use tracing::debug;

use crate::{
    format::{escape_xml, format_number},
    palette::Palette,
    scale::{ChartScales, PlotArea},
    svg::{PlaceholderTone, placeholder_svg},
    synth::synthesize_with,
};

/// Card width in pixels.
pub const CARD_WIDTH: u32 = 1200;
/// Card height in pixels.
pub const CARD_HEIGHT: u32 = 628;

const CHART_WIDTH: f64 = 1100.0;
const CHART_HEIGHT: f64 = 440.0;
const CHART_PADDING: f64 = 40.0;
const CHART_OFFSET: (f64, f64) = (50.0, 80.0);
const LEGEND_Y: f64 = 570.0;

/// 1200×628 preview image with a brand header, the chart and a legend of totals.
#[derive(Clone, Debug)]
pub struct PreviewCard {
    brand: String,
}

impl Default for PreviewCard {
    fn default() -> Self {
        Self {
            brand: "npm.bet".to_string(),
        }
    }
}

impl PreviewCard {
    /// Creates a card renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the brand label drawn in the header.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Card shown when no packages were requested.
    #[must_use]
    pub fn brand_only(&self) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
  <rect width="{w}" height="{h}" fill="#f5f5f5"/>
  <text x="{cx}" y="{cy}" text-anchor="middle" font-family="Arial" font-size="48" font-weight="600" fill="#000">{brand}</text>
</svg>
"##,
            w = CARD_WIDTH,
            h = CARD_HEIGHT,
            cx = f64::from(CARD_WIDTH) / 2.0,
            cy = f64::from(CARD_HEIGHT) / 2.0,
            brand = escape_xml(&self.brand),
        )
    }

    /// Card shown when the chart could not be produced: the package names and the brand.
    #[must_use]
    pub fn fallback(&self, packages: &[String]) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
  <rect width="{w}" height="{h}" fill="#ffffff"/>
  <text x="{cx}" y="{title_y}" text-anchor="middle" font-family="Arial" font-size="48" font-weight="600" fill="#1f2937">{title}</text>
  <text x="{cx}" y="{brand_y}" text-anchor="middle" font-family="Arial" font-size="24" fill="#6b7280">{brand}</text>
</svg>
"##,
            w = CARD_WIDTH,
            h = CARD_HEIGHT,
            cx = f64::from(CARD_WIDTH) / 2.0,
            title_y = f64::from(CARD_HEIGHT) / 2.0,
            brand_y = f64::from(CARD_HEIGHT) / 2.0 + 44.0,
            title = escape_xml(&packages.join(" vs ")),
            brand = escape_xml(&self.brand),
        )
    }

    /// Renders the card. `totals[i]` is the total download count shown next to `packages[i]`.
    ///
    /// # Errors
    /// Propagates geometry errors.
    pub fn render(&self, table: &MergedTable, packages: &[String], totals: &[u64]) -> Result<String> {
        if table.is_empty() {
            return Ok(placeholder_svg(
                CARD_WIDTH,
                CARD_HEIGHT,
                "No data available",
                PlaceholderTone::Info,
            ));
        }

        debug!(rows = table.len(), packages = packages.len(), "Rendering preview card");
        let area = PlotArea::new(
            CHART_PADDING,
            CHART_PADDING,
            CHART_WIDTH - CHART_PADDING * 2.0,
            CHART_HEIGHT - CHART_PADDING * 2.0,
        );
        let scales = ChartScales::for_table(table, area);
        let geometry = synthesize_with(table, packages, &scales)?;

        let mut guides = String::new();
        for ratio in [0.25, 0.5, 0.75] {
            let y = area.y + area.height * (1.0 - ratio);
            guides.push_str(&format!(
                r##"    <line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="#e5e7eb" stroke-width="1" stroke-dasharray="4 4" opacity="0.5"/>
"##,
                area.x,
                area.right(),
            ));
        }

        let mut lines = String::new();
        for series in &geometry {
            lines.push_str(&format!(
                r##"    <path d="{}" fill="none" stroke="{}" stroke-width="3"/>
"##,
                series.path_data(),
                Palette::CARD.color(series.index)
            ));
        }

        // Legend slots share the card width evenly.
        let slot = CHART_WIDTH / packages.len().max(1) as f64;
        let mut legend = String::new();
        for (i, package) in packages.iter().enumerate() {
            let x = CHART_OFFSET.0 + slot * i as f64 + slot / 2.0;
            let total = totals.get(i).copied().unwrap_or_default();
            legend.push_str(&format!(
                r##"  <g transform="translate({x}, {LEGEND_Y})">
    <circle cx="-8" cy="0" r="8" fill="{}"/>
    <text x="8" y="0" font-family="Arial" font-size="18" font-weight="600" alignment-baseline="middle"><tspan fill="#1f2937">{}</tspan> <tspan fill="#737373">{}</tspan></text>
  </g>
"##,
                Palette::CARD.color(i),
                escape_xml(package),
                format_number(total as f64)
            ));
        }

        Ok(format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
  <rect width="{w}" height="{h}" fill="#f5f5f5"/>
  <text x="{cx}" y="48" text-anchor="middle" font-family="Arial" font-size="28" font-weight="600" fill="#000">{brand}</text>
  <g transform="translate({ox}, {oy})" role="img" aria-label="npm package download comparison chart">
    <line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="#e5e7eb" stroke-width="1"/>
{guides}{lines}  </g>
{legend}</svg>
"##,
            w = CARD_WIDTH,
            h = CARD_HEIGHT,
            cx = f64::from(CARD_WIDTH) / 2.0,
            brand = escape_xml(&self.brand),
            ox = CHART_OFFSET.0,
            oy = CHART_OFFSET.1,
            left = area.x,
            right = area.right(),
            bottom = area.bottom(),
            guides = guides,
            lines = lines,
            legend = legend,
        ))
    }
}
