use std::collections::BTreeMap;

use crate::activity::stats::{StatField, StatsVisibility};
use crate::canvas::editor::EditorState;
use crate::canvas::layer::{BackgroundFilter, BackgroundMedia, ImageOverlay, LayerId, RouteMode};
use crate::foundation::core::LayerTransform;

pub const DRAFT_VERSION: u64 = 1;

/// Persisted snapshot of the editor, tagged `v: 1`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub v: u64,
    pub media: Option<BackgroundMedia>,
    pub overlays: Vec<ImageOverlay>,
    pub selected_layer: Option<LayerId>,
    pub template_id: String,
    pub font_preset_id: String,
    pub route_mode: RouteMode,
    pub primary_field: StatField,
    pub layer_order: Vec<LayerId>,
    pub visible_layers: BTreeMap<LayerId, bool>,
    pub behind_subject: BTreeMap<LayerId, bool>,
    pub transforms: BTreeMap<LayerId, LayerTransform>,
    pub stats_visibility: StatsVisibility,
    pub background_filter: BackgroundFilter,
}

impl Draft {
    pub fn from_state(state: &EditorState) -> Self {
        Self {
            v: DRAFT_VERSION,
            media: state.media.clone(),
            overlays: state.overlays.clone(),
            selected_layer: state.selected.clone(),
            template_id: state.template_id.clone(),
            font_preset_id: state.font_preset_id.clone(),
            route_mode: state.route_mode,
            primary_field: state.primary_field,
            layer_order: state.layer_order.clone(),
            visible_layers: state.visible.clone(),
            behind_subject: state.behind_subject.clone(),
            transforms: state.transforms.clone(),
            stats_visibility: state.stats_visibility,
            background_filter: state.background_filter,
        }
    }

    /// Editor state described by this draft. Subject cutouts are not persisted.
    pub fn into_state(self) -> EditorState {
        EditorState {
            media: self.media,
            subject_cutout: None,
            overlays: self.overlays,
            selected: self.selected_layer,
            template_id: self.template_id,
            font_preset_id: self.font_preset_id,
            route_mode: self.route_mode,
            primary_field: self.primary_field,
            layer_order: self.layer_order,
            visible: self.visible_layers,
            behind_subject: self.behind_subject,
            transforms: self.transforms,
            stats_visibility: self.stats_visibility,
            background_filter: self.background_filter,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Every field serializes to plain JSON; map keys are layer-id strings.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draft/model.rs"]
mod tests;
