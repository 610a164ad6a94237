//! Smooth path synthesis through a sequence of points.
//!
//! Paths are cubic-Bezier approximations of a Cardinal spline: each segment's control
//! points come from its neighbours, clamped to the first/last point at the ends.

use kurbo::{BezPath, Point};

/// Cardinal spline tension applied to the neighbour tangents.
pub const TENSION: f64 = 0.5;

/// Builds a smooth path through `points`.
///
/// - 0 points: an empty path.
/// - 1 point: a single move-to, nothing is stroked.
/// - 2 points: a straight line.
/// - 3 or more: one cubic segment per consecutive pair.
#[must_use]
pub fn smooth_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = points.first() else {
        return path;
    };
    path.move_to(first);

    match points.len() {
        1 => {}
        2 => path.line_to(points[1]),
        n => {
            for i in 0..n - 1 {
                let p0 = points[i.saturating_sub(1)];
                let p1 = points[i];
                let p2 = points[i + 1];
                let p3 = points[(i + 2).min(n - 1)];

                let c1 = Point::new(
                    p1.x + (p2.x - p0.x) / 6.0 * TENSION,
                    p1.y + (p2.y - p0.y) / 6.0 * TENSION,
                );
                let c2 = Point::new(
                    p2.x - (p3.x - p1.x) / 6.0 * TENSION,
                    p2.y - (p3.y - p1.y) / 6.0 * TENSION,
                );
                path.curve_to(c1, c2, p2);
            }
        }
    }

    path
}
