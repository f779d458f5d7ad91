//! Font loading and shaping with parley.

use std::cell::RefCell;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{StoryError, StoryResult};
use crate::layout::fonts::FontPreset;
use crate::render::text::{ApproxMeasure, TextMeasure};

/// RGBA8 brush carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Parley contexts reused across layouts.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register font bytes and return the family name they provide.
    pub fn register(&mut self, font_bytes: &[u8]) -> StoryResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryError::validation("no font families registered from font bytes")
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryError::validation("registered font family has no name"))?
            .to_string();
        Ok(name)
    }

    /// Shape a single unwrapped line in a registered family.
    pub fn layout_line(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StoryResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StoryError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

pub struct LoadedFont {
    pub family: String,
    pub data: vello_cpu::peniko::FontData,
}

/// Fonts available to the rasterizer, looked up by family name.
///
/// Families requested by a preset but not loaded fall back to the first loaded font. With no
/// fonts at all, text is measured approximately and not drawn.
#[derive(Default)]
pub struct FontBook {
    fonts: Vec<LoadedFont>,
    engine: RefCell<TextLayoutEngine>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.ttf`/`.otf`/`.ttc` file directly inside `dir`. Unreadable files are skipped.
    pub fn from_dir(dir: &Path) -> Self {
        let mut book = Self::new();
        book.load_dir(dir);
        book
    }

    pub fn load_dir(&mut self, dir: &Path) {
        let Ok(rd) = std::fs::read_dir(dir) else {
            tracing::debug!(dir = %dir.display(), "font directory not readable");
            return;
        };

        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext != "ttf" && ext != "otf" && ext != "ttc" {
                continue;
            }
            let loaded = std::fs::read(&path)
                .map_err(anyhow::Error::from)
                .map_err(StoryError::from)
                .and_then(|bytes| self.add_font_bytes(bytes));
            if let Err(err) = loaded {
                tracing::warn!(path = %path.display(), error = %err, "skipping font");
            }
        }
    }

    pub fn add_font_bytes(&mut self, bytes: Vec<u8>) -> StoryResult<String> {
        let family = self.engine.get_mut().register(&bytes)?;
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        self.fonts.push(LoadedFont {
            family: family.clone(),
            data,
        });
        Ok(family)
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|f| f.family.as_str())
    }

    pub fn font_for(&self, family: &str) -> Option<&LoadedFont> {
        self.fonts
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(family))
            .or_else(|| self.fonts.first())
    }

    pub fn layout_line(
        &self,
        text: &str,
        family: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StoryResult<(parley::Layout<TextBrushRgba8>, &LoadedFont)> {
        let font = self
            .font_for(family)
            .ok_or_else(|| StoryError::capability("no fonts loaded"))?;
        let layout = self
            .engine
            .borrow_mut()
            .layout_line(text, &font.family, size_px, brush)?;
        Ok((layout, font))
    }
}

impl TextMeasure for FontBook {
    fn advance(&self, text: &str, font_size: f64, weight: u16, preset: &FontPreset) -> f64 {
        match self.layout_line(text, preset.family, font_size as f32, TextBrushRgba8::default()) {
            Ok((layout, _)) => f64::from(layout.width()),
            Err(_) => ApproxMeasure.advance(text, font_size, weight, preset),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
