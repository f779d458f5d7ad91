//! Coercion of an untrusted draft blob back into a [`Draft`].
//!
//! Each field is checked on its own and replaced with its default when malformed, so one bad
//! entry never discards the rest of the draft. Only a missing or wrong `v` tag rejects the
//! whole blob. Running the result back through [`sanitize`] yields the same draft.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::activity::stats::{StatField, StatsVisibility};
use crate::canvas::editor::{default_layer_order, default_visibility};
use crate::canvas::layer::{
    BackgroundFilter, BackgroundMedia, ImageOverlay, LayerId, MediaKind, RouteMode,
};
use crate::draft::model::{DRAFT_VERSION, Draft};
use crate::foundation::core::LayerTransform;
use crate::layout::{fonts, template};

/// `None` when the blob is not a version-1 draft object.
#[tracing::instrument(skip(value))]
pub fn sanitize(value: &Value) -> Option<Draft> {
    let obj = value.as_object()?;
    if !is_current_version(obj.get("v")) {
        tracing::debug!("draft rejected: missing or unsupported version tag");
        return None;
    }

    let overlays = overlays(obj.get("overlays"));
    let overlay_ids: BTreeSet<&str> = overlays.iter().map(|o| o.id.as_str()).collect();

    let selected_layer = match obj.get("selectedLayer") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            layer_id(v)
                .filter(|id| id.image_id().is_none_or(|img| overlay_ids.contains(img)))
                .unwrap_or(LayerId::Stats),
        ),
    };

    let template_id = str_field(obj, "templateId")
        .and_then(template::template)
        .unwrap_or_else(template::default_template)
        .id
        .to_string();
    let font_preset_id = str_field(obj, "fontPresetId")
        .and_then(fonts::font_preset)
        .unwrap_or_else(fonts::default_font_preset)
        .id
        .to_string();

    let route_mode = str_field(obj, "routeMode")
        .and_then(RouteMode::parse)
        .unwrap_or_default();
    let primary_field = str_field(obj, "primaryField")
        .and_then(StatField::parse)
        .unwrap_or(StatField::Distance);
    let background_filter = str_field(obj, "backgroundFilter")
        .and_then(BackgroundFilter::parse)
        .unwrap_or_default();

    let layer_order = layer_order(obj.get("layerOrder"), &overlays);

    let mut visible_layers = default_visibility();
    visible_layers.extend(bool_map(obj.get("visibleLayers")));

    Some(Draft {
        v: DRAFT_VERSION,
        media: media(obj.get("media")),
        overlays,
        selected_layer,
        template_id,
        font_preset_id,
        route_mode,
        primary_field,
        layer_order,
        visible_layers,
        behind_subject: bool_map(obj.get("behindSubject")),
        transforms: transforms(obj.get("transforms")),
        stats_visibility: stats_visibility(obj.get("statsVisibility")),
        background_filter,
    })
}

fn is_current_version(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Number(n)) => {
            n.as_u64() == Some(DRAFT_VERSION) || n.as_f64() == Some(DRAFT_VERSION as f64)
        }
        _ => false,
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn finite(v: Option<&Value>) -> Option<f64> {
    v.and_then(Value::as_f64).filter(|n| n.is_finite())
}

fn layer_id(v: &Value) -> Option<LayerId> {
    v.as_str().and_then(|s| s.parse().ok())
}

fn media(v: Option<&Value>) -> Option<BackgroundMedia> {
    let obj = v?.as_object()?;
    let uri = str_field(obj, "uri").filter(|u| !u.trim().is_empty())?;
    let kind = match str_field(obj, "kind")? {
        "image" => MediaKind::Image,
        "video" => MediaKind::Video,
        _ => return None,
    };
    Some(BackgroundMedia {
        kind,
        uri: uri.to_string(),
    })
}

/// Overlays without an id, uri or a positive size are dropped; duplicate ids keep the first.
fn overlays(v: Option<&Value>) -> Vec<ImageOverlay> {
    let Some(items) = v.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for item in items {
        let Some(overlay) = overlay(item) else {
            tracing::debug!("draft overlay dropped");
            continue;
        };
        if seen.insert(overlay.id.clone()) {
            out.push(overlay);
        }
    }
    out
}

fn overlay(v: &Value) -> Option<ImageOverlay> {
    let obj = v.as_object()?;
    let id = str_field(obj, "id").filter(|s| !s.is_empty())?;
    let uri = str_field(obj, "uri").filter(|s| !s.trim().is_empty())?;
    let width = finite(obj.get("width")).filter(|w| *w > 0.0)?;
    let height = finite(obj.get("height")).filter(|h| *h > 0.0)?;
    Some(ImageOverlay {
        id: id.to_string(),
        uri: uri.to_string(),
        width,
        height,
        opacity: finite(obj.get("opacity")).map_or(1.0, |o| o.clamp(0.0, 1.0)),
        name: str_field(obj, "name").unwrap_or_default().to_string(),
    })
}

/// Unknown entries and duplicates are dropped. Stale overlay ids stay; built-in layers and
/// live overlays missing from the list are appended.
fn layer_order(v: Option<&Value>, overlays: &[ImageOverlay]) -> Vec<LayerId> {
    let Some(items) = v.and_then(Value::as_array) else {
        let mut order = default_layer_order();
        order.extend(overlays.iter().map(ImageOverlay::layer_id));
        return order;
    };
    let mut order: Vec<LayerId> = Vec::new();
    for id in items.iter().filter_map(layer_id) {
        if !order.contains(&id) {
            order.push(id);
        }
    }
    for id in default_layer_order()
        .into_iter()
        .chain(overlays.iter().map(ImageOverlay::layer_id))
    {
        if !order.contains(&id) {
            order.push(id);
        }
    }
    order
}

fn bool_map(v: Option<&Value>) -> BTreeMap<LayerId, bool> {
    let Some(obj) = v.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    obj.iter()
        .filter_map(|(k, v)| Some((k.parse::<LayerId>().ok()?, v.as_bool()?)))
        .collect()
}

fn transforms(v: Option<&Value>) -> BTreeMap<LayerId, LayerTransform> {
    let Some(obj) = v.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    obj.iter()
        .filter_map(|(k, v)| Some((k.parse::<LayerId>().ok()?, transform(v)?)))
        .collect()
}

fn transform(v: &Value) -> Option<LayerTransform> {
    let obj = v.as_object()?;
    let d = LayerTransform::default();
    Some(LayerTransform {
        x: finite(obj.get("x")).unwrap_or(d.x),
        y: finite(obj.get("y")).unwrap_or(d.y),
        scale: finite(obj.get("scale"))
            .filter(|s| *s > 0.0)
            .unwrap_or(d.scale),
        rotation_deg: finite(obj.get("rotationDeg")).unwrap_or(d.rotation_deg),
    })
}

/// An all-off result falls back to the defaults.
fn stats_visibility(v: Option<&Value>) -> StatsVisibility {
    let defaults = StatsVisibility::default();
    let Some(obj) = v.and_then(Value::as_object) else {
        return defaults;
    };
    let mut out = defaults;
    for field in StatField::ALL {
        if let Some(on) = obj.get(field.as_str()).and_then(Value::as_bool) {
            out.set(field, on);
        }
    }
    if out.count() == 0 { defaults } else { out }
}

#[cfg(test)]
#[path = "../../tests/unit/draft/sanitize.rs"]
mod tests;
