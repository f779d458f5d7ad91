//! Pure text layout for the header, stats block and primary metric.
//!
//! Everything here is in logical canvas units. Glyph advances come from a [`TextMeasure`], so
//! layout stays deterministic in tests while the raster backend can supply shaped widths.

use crate::activity::model::Activity;
use crate::activity::stats::FormattedStat;
use crate::foundation::core::{Point, Rgba8, Size};
use crate::layout::fonts::FontPreset;
use crate::layout::template::{LayoutKind, Template};

pub const LINE_HEIGHT: f64 = 1.2;

pub trait TextMeasure {
    /// Horizontal advance of `text` set at `font_size` in `preset`'s family.
    fn advance(&self, text: &str, font_size: f64, weight: u16, preset: &FontPreset) -> f64;
}

/// Width estimate from per-family average glyph widths.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn advance(&self, text: &str, font_size: f64, weight: u16, preset: &FontPreset) -> f64 {
        let em = match preset.id {
            "mono" => 0.6,
            "condensed" => 0.46,
            _ => 0.55,
        };
        let bold = if weight >= 600 { 1.04 } else { 1.0 };
        text.chars().count() as f64 * font_size * em * bold
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Start,
    Centre,
    End,
}

/// One single-line run. `origin` is the top-left of its line box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub font_size: f64,
    pub weight: u16,
    pub color: Rgba8,
}

/// Rounded box drawn behind a stats block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxStyle {
    pub fill: Rgba8,
    pub stroke: Rgba8,
    pub stroke_width: f64,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub size: Size,
    pub family: &'static str,
    pub backdrop: Option<BoxStyle>,
    pub runs: Vec<TextRun>,
}

struct Lines<'a> {
    measure: &'a dyn TextMeasure,
    preset: &'a FontPreset,
    color: Rgba8,
    runs: Vec<TextRun>,
}

impl Lines<'_> {
    /// Push one line into the column `[left, left + width)` and return its height.
    #[allow(clippy::too_many_arguments)]
    fn line(&mut self, text: &str, size: f64, weight: u16, align: Align, left: f64, width: f64, top: f64) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let adv = self.measure.advance(text, size, weight, self.preset);
        let x = match align {
            Align::Start => left,
            Align::Centre => left + (width - adv) * 0.5,
            Align::End => left + width - adv,
        };
        self.runs.push(TextRun {
            text: text.to_string(),
            origin: Point::new(x, top),
            font_size: size,
            weight,
            color: self.color,
        });
        size * LINE_HEIGHT
    }

    fn label_value(&mut self, stat: &FormattedStat, value_size: f64, align: Align, left: f64, width: f64, top: f64) -> f64 {
        let label = 11.0 * self.preset.label_scale;
        let value = value_size * self.preset.value_scale;
        let h = self.line(&stat.label.to_uppercase(), label, 500, align, left, width, top);
        h + self.line(&stat.inline_text(), value, self.preset.weight, align, left, width, top + h)
    }
}

/// Name and date header.
pub fn layout_header(activity: &Activity, preset: &FontPreset, measure: &dyn TextMeasure) -> TextBlock {
    let title = if activity.name.trim().is_empty() {
        activity.kind.clone()
    } else {
        activity.name.trim().to_string()
    };
    let date = activity.display_date().unwrap_or_default();
    let title_size = 18.0 * preset.label_scale;
    let date_size = 12.0 * preset.label_scale;
    let width = measure
        .advance(&title, title_size, preset.weight, preset)
        .max(measure.advance(&date, date_size, 400, preset));

    let mut lines = Lines {
        measure,
        preset,
        color: Rgba8::WHITE,
        runs: Vec::new(),
    };
    let mut y = lines.line(&title, title_size, preset.weight, Align::Start, 0.0, width, 0.0);
    y += lines.line(&date, date_size, 400, Align::Start, 0.0, width, y);
    TextBlock {
        size: Size::new(width, y),
        family: preset.family,
        backdrop: None,
        runs: lines.runs,
    }
}

/// The hero metric shown on its own.
pub fn layout_primary(stat: &FormattedStat, preset: &FontPreset, measure: &dyn TextMeasure) -> TextBlock {
    let value_size = 64.0 * preset.value_scale;
    let label_size = 14.0 * preset.label_scale;
    let value = stat.inline_text();
    let label = stat.label.to_uppercase();
    let width = measure
        .advance(&value, value_size, preset.weight, preset)
        .max(measure.advance(&label, label_size, 500, preset));

    let mut lines = Lines {
        measure,
        preset,
        color: Rgba8::WHITE,
        runs: Vec::new(),
    };
    let mut y = lines.line(&value, value_size, preset.weight, Align::Centre, 0.0, width, 0.0);
    y += lines.line(&label, label_size, 500, Align::Centre, 0.0, width, y);
    TextBlock {
        size: Size::new(width, y),
        family: preset.family,
        backdrop: None,
        runs: lines.runs,
    }
}

/// Arrange `stats` inside a block `block_width` wide following `template.layout`.
pub fn layout_stats(
    stats: &[FormattedStat],
    template: &Template,
    preset: &FontPreset,
    block_width: f64,
    measure: &dyn TextMeasure,
) -> TextBlock {
    let pad = if template.has_box() { 12.0 } else { 0.0 };
    let inner = (block_width - 2.0 * pad).max(0.0);
    let mut lines = Lines {
        measure,
        preset,
        color: template.text_color,
        runs: Vec::new(),
    };

    let content_h = match template.layout {
        LayoutKind::Row => row(&mut lines, stats, pad, inner),
        LayoutKind::Grid => grid(&mut lines, stats, pad, inner),
        LayoutKind::Stack => column(&mut lines, stats, pad, inner, Align::Start),
        LayoutKind::Right => column(&mut lines, stats, pad, inner, Align::End),
        LayoutKind::Inline => inline(&mut lines, stats, pad, inner),
    };

    TextBlock {
        size: Size::new(block_width, content_h + 2.0 * pad),
        family: preset.family,
        backdrop: template.has_box().then_some(BoxStyle {
            fill: template.background_color,
            stroke: template.border_color,
            stroke_width: template.border_width,
            radius: template.radius,
        }),
        runs: lines.runs,
    }
}

fn row(lines: &mut Lines<'_>, stats: &[FormattedStat], pad: f64, inner: f64) -> f64 {
    let (hero, rest) = match stats.split_first() {
        Some((first, rest)) => (first, rest),
        None => return 0.0,
    };
    let mut y = pad;
    y += lines.label_value(hero, 44.0, Align::Centre, pad, inner, y);
    if rest.is_empty() {
        return y - pad;
    }
    y += 8.0;
    let col_w = inner / rest.len() as f64;
    let mut tallest: f64 = 0.0;
    for (i, stat) in rest.iter().enumerate() {
        let h = lines.label_value(stat, 20.0, Align::Centre, pad + col_w * i as f64, col_w, y);
        tallest = tallest.max(h);
    }
    y + tallest - pad
}

fn grid(lines: &mut Lines<'_>, stats: &[FormattedStat], pad: f64, inner: f64) -> f64 {
    let cell_w = inner / 2.0;
    let mut y = pad;
    for pair in stats.chunks(2) {
        let mut tallest: f64 = 0.0;
        for (i, stat) in pair.iter().enumerate() {
            let h = lines.label_value(stat, 22.0, Align::Start, pad + cell_w * i as f64, cell_w, y);
            tallest = tallest.max(h);
        }
        y += tallest + 8.0;
    }
    (y - pad - 8.0).max(0.0)
}

fn column(lines: &mut Lines<'_>, stats: &[FormattedStat], pad: f64, inner: f64, align: Align) -> f64 {
    let mut y = pad;
    for stat in stats {
        y += lines.label_value(stat, 26.0, align, pad, inner, y) + 8.0;
    }
    (y - pad - 8.0).max(0.0)
}

fn inline(lines: &mut Lines<'_>, stats: &[FormattedStat], pad: f64, inner: f64) -> f64 {
    let text = stats
        .iter()
        .map(FormattedStat::inline_text)
        .collect::<Vec<_>>()
        .join("  \u{b7}  ");
    let weight = lines.preset.weight;
    let mut size = 16.0 * lines.preset.value_scale;
    let adv = lines.measure.advance(&text, size, weight, lines.preset);
    if adv > inner && adv > 0.0 {
        size = (size * inner / adv).max(10.0);
    }
    lines.line(&text, size, weight, Align::Centre, pad, inner, pad)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
