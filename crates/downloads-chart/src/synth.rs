//! Per-package point sequences and paths for a merged table.

use downloads_core::{DownloadsError, MergedTable, Result};
use kurbo::{BezPath, Point};

use crate::{
    curve::smooth_path,
    scale::{ChartScales, PlotArea},
};

/// Geometry for one package's line.
#[derive(Clone, Debug)]
pub struct SeriesGeometry {
    /// Package name.
    pub package: String,
    /// Position of the package in the request, used for palette lookup.
    pub index: usize,
    /// Scaled points, one per row where the package has a value.
    pub points: Vec<Point>,
    /// Smooth path through `points`.
    pub path: BezPath,
}

impl SeriesGeometry {
    /// The path as an SVG `d` attribute.
    #[must_use]
    pub fn path_data(&self) -> String {
        self.path.to_svg()
    }
}

/// Synthesizes geometry for every package inside a `width × height` box at the origin.
///
/// # Errors
/// Returns [`DownloadsError::EmptyInput`] if the table has no rows.
pub fn synthesize(
    table: &MergedTable,
    packages: &[String],
    width: f64,
    height: f64,
) -> Result<Vec<SeriesGeometry>> {
    let scales = ChartScales::for_table(table, PlotArea::sized(width, height));
    synthesize_with(table, packages, &scales)
}

/// Synthesizes geometry using pre-built scales.
///
/// Results are ordered like `packages`. Rows where a package has no value contribute no
/// point, so the path joins the neighbouring points across them instead of dropping to zero.
///
/// # Errors
/// Returns [`DownloadsError::EmptyInput`] if the table has no rows.
pub fn synthesize_with(
    table: &MergedTable,
    packages: &[String],
    scales: &ChartScales,
) -> Result<Vec<SeriesGeometry>> {
    if table.is_empty() {
        return Err(DownloadsError::EmptyInput);
    }

    Ok(packages
        .iter()
        .enumerate()
        .map(|(index, package)| {
            let points: Vec<Point> = table
                .rows()
                .iter()
                .enumerate()
                .filter_map(|(i, row)| {
                    row.value(package)
                        .map(|v| Point::new(scales.x.map(i as f64), scales.y.map(v)))
                })
                .collect();
            let path = smooth_path(&points);

            SeriesGeometry {
                package: package.clone(),
                index,
                points,
                path,
            }
        })
        .collect())
}
