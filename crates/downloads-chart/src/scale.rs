//! Linear pixel scales derived from merged tables.

use downloads_core::MergedTable;

/// Number of y-axis ticks, including zero and the ceiling.
pub const Y_TICK_COUNT: usize = 5;

/// Rectangle that scales map into, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width of the plotted region.
    pub width: f64,
    /// Height of the plotted region.
    pub height: f64,
}

impl PlotArea {
    /// Creates an area anchored at `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an area anchored at the origin.
    #[must_use]
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Maps a numeric domain linearly onto a pixel range.
///
/// A zero-width domain maps every value to the start of the range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Creates a scale from `domain` onto `range`.
    #[must_use]
    pub const fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a domain value to pixels.
    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Upper bound of the domain.
    #[must_use]
    pub const fn domain_max(&self) -> f64 {
        self.domain.1
    }
}

/// The x (row index) and y (value) scales for one chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartScales {
    /// Row index to horizontal pixels.
    pub x: LinearScale,
    /// Value to vertical pixels, inverted so larger values sit higher.
    pub y: LinearScale,
}

impl ChartScales {
    /// Builds scales for `table` inside `area`.
    ///
    /// The y ceiling is the largest value of any package in any row, shared by all
    /// series. A single row pins x to the left edge; an all-zero table yields a flat
    /// scale on the bottom edge.
    #[must_use]
    pub fn for_table(table: &MergedTable, area: PlotArea) -> Self {
        let last_index = table.len().saturating_sub(1) as f64;
        Self {
            x: LinearScale::new((0.0, last_index), (area.x, area.right())),
            y: LinearScale::new((0.0, table.max_value()), (area.bottom(), area.y)),
        }
    }

    /// Tick values for the y axis: `round(max / 4 × i)` for `i` in `0..5`.
    #[must_use]
    pub fn y_ticks(&self) -> Vec<f64> {
        let max = self.y.domain_max();
        let step = max / (Y_TICK_COUNT - 1) as f64;
        (0..Y_TICK_COUNT).map(|i| (step * i as f64).round()).collect()
    }
}
