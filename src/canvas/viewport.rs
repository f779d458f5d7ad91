use crate::foundation::core::{Canvas, Point, Rect, Size};

/// Display canvas derived from the viewport, with the logical-to-display scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasGeometry {
    pub logical: Size,
    pub display: Size,
    pub scale: f64,
}

impl CanvasGeometry {
    /// Fit `logical` into `viewport` minus `chrome`, then shrink by `margin_factor`.
    pub fn fit(viewport: Size, chrome: Size, logical: Size, margin_factor: f64) -> Self {
        let avail_w = (viewport.width - chrome.width).max(0.0);
        let avail_h = (viewport.height - chrome.height).max(0.0);
        if logical.width <= 0.0 || logical.height <= 0.0 {
            return Self {
                logical,
                display: Size::ZERO,
                scale: 0.0,
            };
        }
        let fit = (avail_w / logical.width).min(avail_h / logical.height);
        let scale = fit * margin_factor.clamp(0.0, 1.0);
        Self {
            logical,
            display: Size::new(logical.width * scale, logical.height * scale),
            scale,
        }
    }

    /// Exact geometry for an export target; no margin is applied.
    pub fn for_export(target: Canvas, logical: Size) -> Self {
        let size = target.size();
        let scale = if logical.width > 0.0 {
            size.width / logical.width
        } else {
            0.0
        };
        Self {
            logical,
            display: size,
            scale,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.display.width > 0.0 && self.display.height > 0.0
    }

    pub fn to_display(&self, p: Point) -> Point {
        Point::new(p.x * self.scale, p.y * self.scale)
    }

    pub fn size_to_display(&self, s: Size) -> Size {
        Size::new(s.width * self.scale, s.height * self.scale)
    }

    pub fn rect_to_display(&self, r: Rect) -> Rect {
        Rect::new(
            r.x0 * self.scale,
            r.y0 * self.scale,
            r.x1 * self.scale,
            r.y1 * self.scale,
        )
    }

    /// Factor converting transforms stored for `self` into `other`'s display space.
    pub fn rescale_factor(&self, other: &CanvasGeometry) -> f64 {
        if self.scale > 0.0 {
            other.scale / self.scale
        } else {
            1.0
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/viewport.rs"]
mod tests;
