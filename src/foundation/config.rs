use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Size};
use crate::foundation::error::{StoryError, StoryResult};

/// Tunables for the editor, the gesture engine, and the export pipeline.
///
/// Every field has a default, so a partial JSON file (or none at all) is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Logical story canvas that templates are authored against.
    pub logical_width: f64,
    pub logical_height: f64,
    /// Uniform shrink applied after fitting the canvas into the viewport.
    pub margin_factor: f64,
    /// Distance from the canvas centre that pulls a dragged layer onto it.
    pub snap_px: f64,
    /// Distance from upright (degrees) that snaps rotation to exactly 0.
    pub rotation_snap_deg: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub tap_max_ms: u64,
    pub tap_max_travel_px: f64,
    pub export_width: u32,
    pub export_height: u32,
    /// Delay before a snapshot so just-applied capture flags can paint.
    pub settle_ms: u64,
    pub jpeg_quality: u8,
    pub watermark: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            logical_width: 360.0,
            logical_height: 640.0,
            margin_factor: 0.94,
            snap_px: 8.0,
            rotation_snap_deg: 2.0,
            min_scale: 0.7,
            max_scale: 2.8,
            tap_max_ms: 180,
            tap_max_travel_px: 6.0,
            export_width: Canvas::STORY.width,
            export_height: Canvas::STORY.height,
            settle_ms: 50,
            jpeg_quality: 92,
            watermark: true,
        }
    }
}

impl EditorConfig {
    /// Defaults overlaid with `STORYCARD_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a JSON config file, then apply environment overrides.
    pub fn from_path(path: &Path) -> StoryResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)?;
        let cfg = cfg.with_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<f64>("STORYCARD_SNAP_PX").filter(|v| *v >= 0.0) {
            self.snap_px = v;
        }
        if let Some(v) = env_parse::<f64>("STORYCARD_ROTATION_SNAP_DEG").filter(|v| *v >= 0.0) {
            self.rotation_snap_deg = v;
        }
        if let Some(v) = env_parse::<u64>("STORYCARD_SETTLE_MS") {
            self.settle_ms = v;
        }
        if let Some(v) = env_parse::<u32>("STORYCARD_EXPORT_WIDTH").filter(|&n| n > 0) {
            self.export_width = v;
        }
        if let Some(v) = env_parse::<u32>("STORYCARD_EXPORT_HEIGHT").filter(|&n| n > 0) {
            self.export_height = v;
        }
        if let Some(v) = env_parse::<u8>("STORYCARD_JPEG_QUALITY").filter(|&n| n > 0) {
            self.jpeg_quality = v.min(100);
        }
        if let Some(v) = env_parse::<bool>("STORYCARD_WATERMARK") {
            self.watermark = v;
        }
        self
    }

    pub fn validate(&self) -> StoryResult<()> {
        for (name, value) in [
            ("logical_width", self.logical_width),
            ("logical_height", self.logical_height),
            ("margin_factor", self.margin_factor),
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(StoryError::validation(format!(
                    "config {name} must be finite and > 0"
                )));
            }
        }
        if self.min_scale > self.max_scale {
            return Err(StoryError::validation(
                "config min_scale must be <= max_scale",
            ));
        }
        if !self.snap_px.is_finite() || self.snap_px < 0.0 {
            return Err(StoryError::validation("config snap_px must be >= 0"));
        }
        if !self.rotation_snap_deg.is_finite() || self.rotation_snap_deg < 0.0 {
            return Err(StoryError::validation(
                "config rotation_snap_deg must be >= 0",
            ));
        }
        if self.export_width == 0 || self.export_height == 0 {
            return Err(StoryError::validation(
                "config export width/height must be > 0",
            ));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(StoryError::validation(
                "config jpeg_quality must be in 1..=100",
            ));
        }
        Ok(())
    }

    pub fn logical_size(&self) -> Size {
        Size::new(self.logical_width, self.logical_height)
    }

    pub fn export_canvas(&self) -> Canvas {
        Canvas {
            width: self.export_width,
            height: self.export_height,
        }
    }

    pub fn gesture_limits(&self) -> crate::gesture::engine::GestureLimits {
        crate::gesture::engine::GestureLimits {
            snap_px: self.snap_px,
            rotation_snap_deg: self.rotation_snap_deg,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            tap_max_ms: self.tap_max_ms,
            tap_max_travel_px: self.tap_max_travel_px,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
