//! Pixel conversions between the rasterizer's premultiplied output and encoder inputs.

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::math::mul_div255_u16;

/// Straight-alpha RGBA8 for alpha-capable encoders (PNG).
pub fn unpremultiply_rgba8(src: &[u8]) -> Vec<u8> {
    let mut out = src.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        match a {
            0 => px[..3].fill(0),
            255 => {}
            _ => {
                for c in &mut px[..3] {
                    *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
    }
    out
}

/// Composite `src` over an opaque `bg_rgba` so every output pixel has alpha 255.
pub fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> StoryResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StoryError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for i in 0..3 {
            let c = u16::from(s[i]);
            let fg = if src_is_premul { c } else { mul_div255_u16(c, a) };
            d[i] = (fg + mul_div255_u16(bg[i], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Frame converted for an encoder: straight alpha, or flattened over `bg` when `opaque`.
pub fn encoder_pixels(frame: &FrameRGBA, opaque: bool, bg: [u8; 4]) -> StoryResult<Vec<u8>> {
    if opaque {
        let mut out = vec![0u8; frame.data.len()];
        flatten_to_opaque_rgba8(&mut out, &frame.data, frame.premultiplied, bg)?;
        Ok(out)
    } else if frame.premultiplied {
        Ok(unpremultiply_rgba8(&frame.data))
    } else {
        Ok(frame.data.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
