use crate::foundation::core::{BezPath, Point};

const DEGENERATE_EPS: f64 = 1e-12;

/// Fit plane points into a `width` x `height` pixel box with uniform scale.
///
/// The path is centred inside the padded box and the Y axis is flipped (source origin
/// bottom-left, output origin top-left). Empty input yields an empty output, and non-finite
/// points are dropped.
pub fn normalize(points: &[Point], width: f64, height: f64, padding: f64) -> Vec<Point> {
    let finite: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    if finite.is_empty() {
        return Vec::new();
    }

    let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
    let padding = if padding.is_finite() { padding.max(0.0) } else { 0.0 };

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in &finite {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let avail_w = (width - 2.0 * padding).max(0.0);
    let avail_h = (height - 2.0 * padding).max(0.0);
    let bw = max_x - min_x;
    let bh = max_y - min_y;

    let sx = if bw > DEGENERATE_EPS { avail_w / bw } else { f64::INFINITY };
    let sy = if bh > DEGENERATE_EPS { avail_h / bh } else { f64::INFINITY };
    let mut scale = sx.min(sy);
    if !scale.is_finite() {
        // Every input point coincides.
        scale = 0.0;
    }

    let off_x = (width - bw * scale) * 0.5;
    let off_y = (height - bh * scale) * 0.5;

    finite
        .iter()
        .map(|p| {
            let x = off_x + (p.x - min_x) * scale;
            let y = off_y + (max_y - p.y) * scale;
            Point::new(x.clamp(0.0, width), y.clamp(0.0, height))
        })
        .collect()
}

/// Polyline through projected points. Fewer than two points produce an empty path.
pub fn route_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if points.len() < 2 {
        return path;
    }
    path.move_to(points[0]);
    for p in &points[1..] {
        path.line_to(*p);
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/projection.rs"]
mod tests;
