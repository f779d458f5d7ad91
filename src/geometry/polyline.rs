//! Encoded-path codec (delta + zigzag, 5-bit groups, 1e-5 precision).
//!
//! Decoded points use plane orientation: `x` is the longitude stream and `y` the latitude
//! stream, so north is up (`+y`).

use crate::foundation::core::Point;

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ASCII_OFFSET: i64 = 63;

/// Decode an encoded path into plane points.
///
/// Malformed or truncated input never fails: decoding stops at the last complete coordinate
/// pair.
pub fn decode_path(encoded: &str) -> Vec<Point> {
    let bytes = encoded.trim().as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut idx = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while idx < bytes.len() {
        let Some(dlat) = next_value(bytes, &mut idx) else {
            break;
        };
        let Some(dlng) = next_value(bytes, &mut idx) else {
            break;
        };
        lat += dlat;
        lng += dlng;
        points.push(Point::new(lng as f64 / PRECISION, lat as f64 / PRECISION));
    }
    points
}

fn next_value(bytes: &[u8], idx: &mut usize) -> Option<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;
    loop {
        let b = i64::from(*bytes.get(*idx)?) - ASCII_OFFSET;
        *idx += 1;
        if !(0..64).contains(&b) {
            return None;
        }
        result |= (b & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        if b < CONTINUATION {
            break;
        }
        if shift > 60 {
            return None;
        }
    }
    Some(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Encode plane points (`x` = longitude, `y` = latitude) into the compact path format.
pub fn encode_path(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;
    for p in points {
        let lat = crate::foundation::math::round_i64(p.y * PRECISION);
        let lng = crate::foundation::math::round_i64(p.x * PRECISION);
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }
    out
}

fn push_value(out: &mut String, delta: i64) {
    let mut v = if delta < 0 {
        !(delta << 1)
    } else {
        delta << 1
    };
    while v >= CONTINUATION {
        out.push(char::from(((CONTINUATION | (v & CHUNK_MASK)) + ASCII_OFFSET) as u8));
        v >>= CHUNK_BITS;
    }
    out.push(char::from((v + ASCII_OFFSET) as u8));
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/polyline.rs"]
mod tests;
