//! Declarative stats-block templates.
//!
//! Coordinates are in the logical story canvas (360 x 640 by default) and are scaled into
//! display pixels by the compositor.

use crate::foundation::core::Rgba8;

/// Arrangement policy for the stats block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Hero distance on top, remaining fields in a bottom row.
    Row,
    /// Vertical list of label/value pairs.
    Stack,
    /// Compact single line.
    Inline,
    /// Right-anchored column.
    #[serde(alias = "columns")]
    Right,
    /// 2 x 2 grid.
    Grid,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 5] = [
        LayoutKind::Row,
        LayoutKind::Stack,
        LayoutKind::Inline,
        LayoutKind::Right,
        LayoutKind::Grid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Row => "row",
            LayoutKind::Stack => "stack",
            LayoutKind::Inline => "inline",
            LayoutKind::Right => "right",
            LayoutKind::Grid => "grid",
        }
    }
}

/// Immutable stats-block template.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Template {
    pub id: &'static str,
    pub layout: LayoutKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub background_color: Rgba8,
    pub border_color: Rgba8,
    pub border_width: f64,
    pub radius: f64,
    pub text_color: Rgba8,
    pub premium: bool,
}

impl Template {
    pub fn has_box(&self) -> bool {
        !self.background_color.is_transparent()
            || (self.border_width > 0.0 && !self.border_color.is_transparent())
    }
}

const fn plain(id: &'static str, layout: LayoutKind, x: f64, y: f64, width: f64) -> Template {
    Template {
        id,
        layout,
        x,
        y,
        width,
        background_color: Rgba8::TRANSPARENT,
        border_color: Rgba8::TRANSPARENT,
        border_width: 0.0,
        radius: 0.0,
        text_color: Rgba8::WHITE,
        premium: false,
    }
}

pub static TEMPLATES: [Template; 8] = [
    plain("classic", LayoutKind::Row, 20.0, 468.0, 320.0),
    plain("stack", LayoutKind::Stack, 24.0, 404.0, 180.0),
    plain("inline", LayoutKind::Inline, 20.0, 580.0, 320.0),
    plain("columns", LayoutKind::Right, 180.0, 380.0, 156.0),
    Template {
        premium: true,
        ..plain("grid", LayoutKind::Grid, 30.0, 440.0, 300.0)
    },
    Template {
        background_color: Rgba8::new(0, 0, 0, 96),
        radius: 18.0,
        premium: true,
        ..plain("glass", LayoutKind::Row, 20.0, 452.0, 320.0)
    },
    Template {
        border_color: Rgba8::WHITE,
        border_width: 2.0,
        radius: 12.0,
        premium: true,
        ..plain("outline", LayoutKind::Stack, 24.0, 380.0, 190.0)
    },
    Template {
        background_color: Rgba8::new(255, 255, 255, 230),
        radius: 22.0,
        text_color: Rgba8::new(17, 17, 17, 255),
        premium: true,
        ..plain("pill", LayoutKind::Inline, 24.0, 572.0, 312.0)
    },
];

pub fn all_templates() -> &'static [Template] {
    &TEMPLATES
}

pub fn default_template() -> &'static Template {
    &TEMPLATES[0]
}

pub fn template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Template after `current` in registry order, skipping locked ones. Unknown ids restart at the
/// default template.
pub fn next_template(current: &str, premium_unlocked: bool) -> &'static Template {
    let Some(pos) = TEMPLATES.iter().position(|t| t.id == current) else {
        return default_template();
    };
    (1..=TEMPLATES.len())
        .map(|step| &TEMPLATES[(pos + step) % TEMPLATES.len()])
        .find(|t| premium_unlocked || !t.premium)
        .unwrap_or_else(default_template)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/template.rs"]
mod tests;
