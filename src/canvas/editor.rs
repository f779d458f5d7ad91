//! Editor state and the reducer-style operations the UI drives it with.
//!
//! `EditorState` is owned by exactly one context (see `session`). Gesture engines never touch it;
//! they send committed transforms through the command queue.

use std::collections::BTreeMap;

use crate::activity::model::Activity;
use crate::activity::stats::{StatField, StatsVisibility};
use crate::canvas::layer::{BackgroundFilter, BackgroundMedia, ImageOverlay, LayerId, MediaKind, RouteMode};
use crate::canvas::viewport::CanvasGeometry;
use crate::foundation::core::{LayerTransform, Size};
use crate::foundation::error::{StoryError, StoryResult};
use crate::layout::fonts::{self, FontPreset};
use crate::layout::placement;
use crate::layout::sizing::stats_block_width;
use crate::layout::template::{self, Template};

pub const Z_BACKGROUND: i32 = 0;
pub const Z_TINT: i32 = 1;
pub const Z_BEHIND_SUBJECT: i32 = 2;
pub const Z_SUBJECT: i32 = 5;
pub const Z_CHROME: i32 = 1_000;
pub const Z_WATERMARK: i32 = 10_000;

/// Result of an editor operation.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Changed,
    Unchanged,
    /// A locked premium item was requested; nothing was mutated.
    Upsell,
}

impl EditOutcome {
    pub fn changed(self) -> bool {
        self == EditOutcome::Changed
    }

    fn from_bool(changed: bool) -> Self {
        if changed {
            EditOutcome::Changed
        } else {
            EditOutcome::Unchanged
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStep {
    Forward,
    Backward,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditorState {
    pub media: Option<BackgroundMedia>,
    /// Background-removed copy of the image background; never persisted.
    pub subject_cutout: Option<String>,
    pub overlays: Vec<ImageOverlay>,
    pub selected: Option<LayerId>,
    pub template_id: String,
    pub font_preset_id: String,
    pub route_mode: RouteMode,
    pub primary_field: StatField,
    /// Back-to-front. May hold ids of overlays that no longer exist.
    pub layer_order: Vec<LayerId>,
    pub visible: BTreeMap<LayerId, bool>,
    pub behind_subject: BTreeMap<LayerId, bool>,
    pub transforms: BTreeMap<LayerId, LayerTransform>,
    pub stats_visibility: StatsVisibility,
    pub background_filter: BackgroundFilter,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            media: None,
            subject_cutout: None,
            overlays: Vec::new(),
            selected: Some(LayerId::Stats),
            template_id: template::default_template().id.to_string(),
            font_preset_id: fonts::default_font_preset().id.to_string(),
            route_mode: RouteMode::Trace,
            primary_field: StatField::Distance,
            layer_order: default_layer_order(),
            visible: default_visibility(),
            behind_subject: BTreeMap::new(),
            transforms: BTreeMap::new(),
            stats_visibility: StatsVisibility::default(),
            background_filter: BackgroundFilter::None,
        }
    }
}

pub fn default_layer_order() -> Vec<LayerId> {
    vec![LayerId::Route, LayerId::Primary, LayerId::Stats, LayerId::Meta]
}

pub fn default_visibility() -> BTreeMap<LayerId, bool> {
    BTreeMap::from([
        (LayerId::Meta, true),
        (LayerId::Stats, true),
        (LayerId::Primary, false),
        (LayerId::Route, true),
    ])
}

impl EditorState {
    pub fn template(&self) -> &'static Template {
        template::template(&self.template_id).unwrap_or_else(template::default_template)
    }

    pub fn font_preset(&self) -> &'static FontPreset {
        fonts::font_preset(&self.font_preset_id).unwrap_or_else(fonts::default_font_preset)
    }

    pub fn overlay(&self, image_id: &str) -> Option<&ImageOverlay> {
        self.overlays.iter().find(|o| o.id == image_id)
    }

    /// Whether `id` names a layer that currently exists.
    pub fn has_layer(&self, id: &LayerId) -> bool {
        match id {
            LayerId::Image(image_id) => self.overlay(image_id).is_some(),
            _ => true,
        }
    }

    pub fn is_visible(&self, id: &LayerId) -> bool {
        match id {
            LayerId::Route => self.visible_flag(id) && self.route_mode != RouteMode::Off,
            LayerId::Image(_) => self.has_layer(id) && self.visible.get(id).copied().unwrap_or(true),
            _ => self.visible_flag(id),
        }
    }

    fn visible_flag(&self, id: &LayerId) -> bool {
        self.visible
            .get(id)
            .copied()
            .unwrap_or_else(|| default_visibility().get(id).copied().unwrap_or(false))
    }

    /// Route is drawn only when enabled, visible and the activity has a usable path.
    pub fn route_effectively_visible(&self, activity: &Activity) -> bool {
        self.is_visible(&LayerId::Route) && activity.has_route()
    }

    pub fn is_behind_subject(&self, id: &LayerId) -> bool {
        self.behind_subject.get(id).copied().unwrap_or(false)
    }

    pub fn has_image_background(&self) -> bool {
        matches!(&self.media, Some(m) if m.kind == MediaKind::Image)
    }

    pub fn video_background(&self) -> Option<&str> {
        match &self.media {
            Some(m) if m.kind == MediaKind::Video => Some(&m.uri),
            _ => None,
        }
    }

    /// Derived z value for every entry in the order list, including stale ones.
    pub fn z_order(&self) -> Vec<(LayerId, i32)> {
        self.layer_order
            .iter()
            .enumerate()
            .map(|(pos, id)| {
                let z = if self.is_behind_subject(id) {
                    Z_BEHIND_SUBJECT
                } else {
                    10 * (pos as i32 + 1) + 10
                };
                (id.clone(), z)
            })
            .collect()
    }

    pub fn z_of(&self, id: &LayerId) -> Option<i32> {
        self.z_order()
            .into_iter()
            .find_map(|(other, z)| (&other == id).then_some(z))
    }

    pub fn select(&mut self, id: LayerId) -> EditOutcome {
        if !self.has_layer(&id) || self.selected.as_ref() == Some(&id) {
            return EditOutcome::Unchanged;
        }
        self.selected = Some(id);
        EditOutcome::Changed
    }

    pub fn clear_selection(&mut self) -> EditOutcome {
        EditOutcome::from_bool(self.selected.take().is_some())
    }

    /// Second-tap action for a layer.
    ///
    /// Stats cycles templates, route cycles `map`/`trace`, primary cycles the hero field, and
    /// the header cycles font presets. Image overlays have no activate action.
    pub fn activate(&mut self, id: &LayerId, activity: &Activity, premium: bool) -> EditOutcome {
        match id {
            LayerId::Stats => {
                let next = template::next_template(&self.template_id, premium);
                self.apply_template(next)
            }
            LayerId::Route => {
                if self.route_mode == RouteMode::Off {
                    return EditOutcome::Unchanged;
                }
                self.route_mode = self.route_mode.cycled();
                EditOutcome::Changed
            }
            LayerId::Primary => {
                let fields = primary_fields(activity);
                let pos = fields.iter().position(|f| *f == self.primary_field);
                let next = match pos {
                    Some(p) => fields[(p + 1) % fields.len()],
                    None => fields[0],
                };
                let changed = next != self.primary_field;
                self.primary_field = next;
                EditOutcome::from_bool(changed)
            }
            LayerId::Meta => {
                let next = fonts::next_font_preset(&self.font_preset_id, premium);
                let changed = next.id != self.font_preset_id;
                self.font_preset_id = next.id.to_string();
                EditOutcome::from_bool(changed)
            }
            LayerId::Image(_) => EditOutcome::Unchanged,
        }
    }

    pub fn toggle_layer(&mut self, id: &LayerId) -> EditOutcome {
        if !self.has_layer(id) {
            return EditOutcome::Unchanged;
        }
        if *id == LayerId::Route {
            let mode = if self.is_visible(id) {
                RouteMode::Off
            } else {
                RouteMode::Trace
            };
            return self.set_route_mode(mode);
        }
        let on = !self.is_visible(id);
        self.visible.insert(id.clone(), on);
        if !on {
            self.fall_back_selection(id);
        }
        EditOutcome::Changed
    }

    /// `Off` hides the route; any other mode shows it.
    pub fn set_route_mode(&mut self, mode: RouteMode) -> EditOutcome {
        let on = mode != RouteMode::Off;
        if self.route_mode == mode && self.visible_flag(&LayerId::Route) == on {
            return EditOutcome::Unchanged;
        }
        self.route_mode = mode;
        self.visible.insert(LayerId::Route, on);
        if !on {
            self.fall_back_selection(&LayerId::Route);
        }
        EditOutcome::Changed
    }

    fn fall_back_selection(&mut self, hidden: &LayerId) {
        if self.selected.as_ref() == Some(hidden) {
            self.selected = (*hidden != LayerId::Stats).then_some(LayerId::Stats);
        }
    }

    /// Flip one stored stat toggle. Distance stays on for full-stats activities and at least one
    /// field always remains visible.
    pub fn toggle_stat(&mut self, field: StatField, activity: &Activity) -> EditOutcome {
        let on = !self.stats_visibility.get(field);
        if !on && field == StatField::Distance && activity.supports_full_stats() {
            return EditOutcome::Unchanged;
        }
        let mut next = self.stats_visibility;
        next.set(field, on);
        if next.count() == 0 {
            return EditOutcome::Unchanged;
        }
        self.stats_visibility = next;
        EditOutcome::Changed
    }

    /// Recorded even when no subject cutout exists; the layer then just renders low.
    pub fn toggle_behind(&mut self, id: &LayerId) -> EditOutcome {
        if !self.has_layer(id) {
            return EditOutcome::Unchanged;
        }
        let on = !self.is_behind_subject(id);
        self.behind_subject.insert(id.clone(), on);
        EditOutcome::Changed
    }

    pub fn move_layer(&mut self, id: &LayerId, step: OrderStep) -> EditOutcome {
        let Some(pos) = self.layer_order.iter().position(|l| l == id) else {
            return EditOutcome::Unchanged;
        };
        let target = match step {
            OrderStep::Forward if pos + 1 < self.layer_order.len() => pos + 1,
            OrderStep::Backward if pos > 0 => pos - 1,
            _ => return EditOutcome::Unchanged,
        };
        self.layer_order.swap(pos, target);
        EditOutcome::Changed
    }

    /// Add an image overlay on top of the stack and select it.
    pub fn add_image_overlay(
        &mut self,
        uri: impl Into<String>,
        nominal: Size,
        name: impl Into<String>,
    ) -> StoryResult<LayerId> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(StoryError::validation("image overlay uri must not be empty"));
        }
        if !(nominal.width.is_finite() && nominal.height.is_finite())
            || nominal.width <= 0.0
            || nominal.height <= 0.0
        {
            return Err(StoryError::validation("image overlay size must be > 0"));
        }
        let overlay = ImageOverlay {
            id: uuid::Uuid::new_v4().to_string(),
            uri,
            width: nominal.width,
            height: nominal.height,
            opacity: 1.0,
            name: name.into(),
        };
        let id = overlay.layer_id();
        self.overlays.push(overlay);
        self.layer_order.push(id.clone());
        self.visible.insert(id.clone(), true);
        self.selected = Some(id.clone());
        Ok(id)
    }

    pub fn remove_image_overlay(&mut self, id: &LayerId) -> EditOutcome {
        let Some(image_id) = id.image_id() else {
            return EditOutcome::Unchanged;
        };
        let before = self.overlays.len();
        self.overlays.retain(|o| o.id != image_id);
        if self.overlays.len() == before {
            return EditOutcome::Unchanged;
        }
        self.layer_order.retain(|l| l != id);
        self.visible.remove(id);
        self.behind_subject.remove(id);
        self.transforms.remove(id);
        if self.selected.as_ref() == Some(id) {
            self.selected = Some(LayerId::Stats);
        }
        EditOutcome::Changed
    }

    pub fn set_overlay_opacity(&mut self, id: &LayerId, opacity: f64) -> EditOutcome {
        let Some(image_id) = id.image_id() else {
            return EditOutcome::Unchanged;
        };
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            return EditOutcome::Unchanged;
        };
        match self.overlays.iter_mut().find(|o| o.id == image_id) {
            Some(o) if o.opacity != opacity => {
                o.opacity = opacity;
                EditOutcome::Changed
            }
            _ => EditOutcome::Unchanged,
        }
    }

    /// Switch the stats template. Locked premium templates yield [`EditOutcome::Upsell`].
    pub fn select_template(&mut self, id: &str, premium: bool) -> StoryResult<EditOutcome> {
        let t = template::template(id)
            .ok_or_else(|| StoryError::validation(format!("unknown template '{id}'")))?;
        if t.premium && !premium {
            return Ok(EditOutcome::Upsell);
        }
        Ok(self.apply_template(t))
    }

    fn apply_template(&mut self, t: &'static Template) -> EditOutcome {
        if t.id == self.template_id {
            return EditOutcome::Unchanged;
        }
        self.template_id = t.id.to_string();
        // A new template brings its own default placement.
        self.transforms.remove(&LayerId::Stats);
        EditOutcome::Changed
    }

    pub fn select_font_preset(&mut self, id: &str, premium: bool) -> StoryResult<EditOutcome> {
        let preset = fonts::font_preset(id)
            .ok_or_else(|| StoryError::validation(format!("unknown font preset '{id}'")))?;
        if preset.premium && !premium {
            return Ok(EditOutcome::Upsell);
        }
        let changed = preset.id != self.font_preset_id;
        self.font_preset_id = preset.id.to_string();
        Ok(EditOutcome::from_bool(changed))
    }

    /// Replace the background. Any subject cutout belonged to the old media and is dropped.
    /// Media with a blank uri is ignored.
    pub fn set_background(&mut self, media: Option<BackgroundMedia>) -> EditOutcome {
        if media.as_ref().is_some_and(|m| m.uri.trim().is_empty()) {
            return EditOutcome::Unchanged;
        }
        if self.media == media {
            return EditOutcome::Unchanged;
        }
        self.media = media;
        self.subject_cutout = None;
        EditOutcome::Changed
    }

    pub fn set_background_filter(&mut self, filter: BackgroundFilter) -> EditOutcome {
        let changed = self.background_filter != filter;
        self.background_filter = filter;
        EditOutcome::from_bool(changed)
    }

    pub fn set_subject_cutout(&mut self, cutout: Option<String>) -> EditOutcome {
        let changed = self.subject_cutout != cutout;
        self.subject_cutout = cutout;
        EditOutcome::from_bool(changed)
    }

    /// Store the end-of-gesture transform for `id`. Non-finite or non-positive scales are dropped.
    pub fn commit_transform(&mut self, id: &LayerId, t: LayerTransform) -> EditOutcome {
        if !self.has_layer(id) || !t.is_finite() || t.scale <= 0.0 {
            return EditOutcome::Unchanged;
        }
        let prev = self.transforms.insert(id.clone(), t);
        EditOutcome::from_bool(prev != Some(t))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Stats block width in logical units for the current template and activity.
    pub fn stats_block_width(&self, activity: &Activity) -> f64 {
        let t = self.template();
        let count = self.stats_visibility.effective(activity).count();
        stats_block_width(t.layout, t.width, count)
    }

    /// Persisted transform, or the default placement for a layer of `layer_size` display px.
    pub fn layer_transform(
        &self,
        id: &LayerId,
        activity: &Activity,
        geometry: &CanvasGeometry,
        layer_size: Size,
    ) -> LayerTransform {
        match self.transforms.get(id) {
            Some(t) => *t,
            None => self.default_transform(id, activity, geometry, layer_size),
        }
    }

    pub fn default_transform(
        &self,
        id: &LayerId,
        activity: &Activity,
        geometry: &CanvasGeometry,
        layer_size: Size,
    ) -> LayerTransform {
        let logical = geometry.logical;
        let scale = if geometry.scale > 0.0 { geometry.scale } else { 1.0 };
        let size = Size::new(layer_size.width / scale, layer_size.height / scale);
        let origin = match id {
            LayerId::Meta => placement::HEADER_ORIGIN,
            LayerId::Stats => {
                placement::stats_origin(self.template(), self.stats_block_width(activity), logical)
            }
            LayerId::Primary => placement::primary_origin(size.width, logical),
            LayerId::Route => placement::route_frame(logical).origin(),
            LayerId::Image(_) => placement::centred_origin(size, logical),
        };
        let p = geometry.to_display(origin);
        LayerTransform::at(p.x, p.y)
    }
}

/// Hero-field cycle for `activity`.
fn primary_fields(activity: &Activity) -> Vec<StatField> {
    if activity.supports_full_stats() {
        StatField::ALL.to_vec()
    } else {
        vec![StatField::Time]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/editor.rs"]
mod tests;
