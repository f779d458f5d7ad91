use crate::foundation::core::Affine;
use crate::foundation::error::{StoryError, StoryResult};

const MAX_DIM: u32 = 8_192;

/// Raster size for drawing `tree` under `transform`, and the draw transform to use with it.
///
/// Rasterizing at the drawn scale keeps vector art sharp on 1080x1920 exports.
pub fn svg_raster_params(tree: &usvg::Tree, transform: Affine) -> StoryResult<(u32, u32, Affine)> {
    fn to_px(v: f32) -> StoryResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(StoryError::validation("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let base_w = to_px(size.width())?;
    let base_h = to_px(size.height())?;

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = (f64::from(base_w) * sx).ceil().max(1.0) as u32;
    let h = (f64::from(base_h) * sy).ceil().max(1.0) as u32;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(StoryError::validation(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let transform_adjust = transform * Affine::scale_non_uniform(1.0 / sx, 1.0 / sy);
    Ok((w, h, transform_adjust))
}

pub fn rasterize_svg_to_premul_rgba8(tree: &usvg::Tree, width: u32, height: u32) -> StoryResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StoryError::validation("failed to allocate svg pixmap"))?;

    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
