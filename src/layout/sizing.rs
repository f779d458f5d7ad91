//! Stats-block width policy.
//!
//! Dense layouts (row, grid) use a discrete table keyed by how full the block is. Single-line
//! and column layouts scale linearly with the field count. Export geometry depends on these
//! exact values.

use crate::layout::template::LayoutKind;

struct Linear {
    base: f64,
    per_field: f64,
    floor: f64,
}

const INLINE: Linear = Linear {
    base: 0.28,
    per_field: 0.18,
    floor: 150.0,
};
const RIGHT: Linear = Linear {
    base: 0.40,
    per_field: 0.15,
    floor: 140.0,
};
const STACK: Linear = Linear {
    base: 0.55,
    per_field: 0.1125,
    floor: 120.0,
};

/// Width of the stats block in logical pixels for `visible_count` fields (clamped to `1..=4`).
pub fn stats_block_width(layout: LayoutKind, template_width: f64, visible_count: usize) -> f64 {
    let w = if template_width.is_finite() {
        template_width.max(0.0)
    } else {
        0.0
    };
    let n = visible_count.clamp(1, 4);
    match layout {
        LayoutKind::Row => match n {
            4 => w,
            3 => (w - 24.0).max(220.0),
            2 => (w - 78.0).max(170.0),
            _ => 140.0,
        },
        LayoutKind::Grid => match n {
            4 => w,
            3 => (w - 28.0).max(200.0),
            2 => (w - 110.0).max(160.0),
            _ => 130.0,
        },
        LayoutKind::Inline => linear(&INLINE, w, n),
        LayoutKind::Right => linear(&RIGHT, w, n),
        LayoutKind::Stack => linear(&STACK, w, n),
    }
}

fn linear(policy: &Linear, w: f64, n: usize) -> f64 {
    (w * (policy.base + n as f64 * policy.per_field))
        .round()
        .max(policy.floor)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/sizing.rs"]
mod tests;
