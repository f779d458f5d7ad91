//! Default placements in logical canvas coordinates.
//!
//! Stats placement is a dispatch table keyed by [`LayoutKind`]; each entry owns its default
//! origin function, so adding a layout kind forces a placement decision at compile time.

use crate::foundation::core::{Point, Rect, Size};
use crate::layout::template::{LayoutKind, Template};

/// Top-left origin of the stats block for `(template, block_width, logical_canvas)`.
pub type PlacementFn = fn(&Template, f64, Size) -> Point;

impl LayoutKind {
    pub fn placement(self) -> PlacementFn {
        match self {
            LayoutKind::Row => centred,
            LayoutKind::Grid => centred,
            LayoutKind::Inline => centred,
            LayoutKind::Stack => anchored_left,
            LayoutKind::Right => anchored_right,
        }
    }
}

fn centred(t: &Template, block_w: f64, canvas: Size) -> Point {
    Point::new(((canvas.width - block_w) * 0.5).max(0.0), t.y)
}

fn anchored_left(t: &Template, _block_w: f64, _canvas: Size) -> Point {
    Point::new(t.x, t.y)
}

fn anchored_right(t: &Template, block_w: f64, _canvas: Size) -> Point {
    // The template's right edge stays fixed while the block grows leftwards.
    Point::new((t.x + t.width - block_w).max(0.0), t.y)
}

pub fn stats_origin(t: &Template, block_w: f64, canvas: Size) -> Point {
    (t.layout.placement())(t, block_w, canvas)
}

pub const HEADER_ORIGIN: Point = Point::new(20.0, 28.0);

/// Hero metric: centred horizontally in the upper third.
pub fn primary_origin(block_w: f64, canvas: Size) -> Point {
    Point::new(((canvas.width - block_w) * 0.5).max(0.0), canvas.height * 0.3)
}

/// Square route frame centred horizontally below the header.
pub fn route_frame(canvas: Size) -> Rect {
    let side = (canvas.width * 2.0 / 3.0).round();
    let x = (canvas.width - side) * 0.5;
    let y = canvas.height * 0.1875;
    Rect::new(x, y, x + side, y + side)
}

pub fn centred_origin(content: Size, canvas: Size) -> Point {
    Point::new(
        (canvas.width - content.width) * 0.5,
        (canvas.height - content.height) * 0.5,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/layout/placement.rs"]
mod tests;
