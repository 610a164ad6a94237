#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/npmbet/downloads/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Chart geometry and static renderers.
//!
//! - [`synthesize`](synth::synthesize) - Per-package points and smooth paths
//! - [`SvgChart`](svg::SvgChart) - Embeddable 800px line chart
//! - [`PreviewCard`](card::PreviewCard) - 1200×628 social preview card

/// Social preview card.
pub mod card;
/// Cardinal-spline path construction.
pub mod curve;
/// Number, date and XML text formatting.
pub mod format;
/// Legend colors.
pub mod palette;
/// Pixel scales and axis ticks.
pub mod scale;
/// Embeddable SVG chart and placeholders.
pub mod svg;
/// Geometry synthesis.
pub mod synth;

pub use card::{CARD_HEIGHT, CARD_WIDTH, PreviewCard};
pub use curve::smooth_path;
pub use format::{escape_xml, format_axis_date, format_number};
pub use palette::Palette;
pub use scale::{ChartScales, LinearScale, PlotArea};
pub use svg::{PLACEHOLDER_SIZE, PlaceholderTone, SvgChart, placeholder_svg};
pub use synth::{SeriesGeometry, synthesize, synthesize_with};
