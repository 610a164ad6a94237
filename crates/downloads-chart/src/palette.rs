//! Deterministic legend colors.

/// Line colors for embeddable charts: blue, green, amber, red, purple.
pub const CHART_COLORS: [&str; 5] = ["#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];

/// Line colors for social preview cards.
pub const CARD_COLORS: [&str; 5] = ["#f54a00", "#009689", "#104e64", "#ffba00", "#fd9a00"];

/// A cycling color palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette(&'static [&'static str]);

impl Palette {
    /// Palette used by [`SvgChart`](crate::svg::SvgChart).
    pub const CHART: Self = Self(&CHART_COLORS);
    /// Palette used by [`PreviewCard`](crate::card::PreviewCard).
    pub const CARD: Self = Self(&CARD_COLORS);

    /// Color for the package at `index`, cycling when there are more packages than colors.
    #[must_use]
    pub fn color(&self, index: usize) -> &'static str {
        self.0[index % self.0.len()]
    }
}
