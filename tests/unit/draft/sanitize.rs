use serde_json::json;

use super::*;
use crate::activity::model::Activity;
use crate::canvas::editor::{EditOutcome, EditorState};
use crate::foundation::core::Size;

fn edited_state() -> EditorState {
    let run = Activity::new("1", "Run");
    let mut state = EditorState::default();
    let _ = state.set_background(Some(BackgroundMedia::image("file:///bg.jpg")));
    let a = state
        .add_image_overlay("file:///a.png", Size::new(120.0, 80.0), "a")
        .expect("overlay a");
    let b = state
        .add_image_overlay("file:///b.png", Size::new(64.0, 64.0), "b")
        .expect("overlay b");
    let _ = state.set_overlay_opacity(&a, 0.4);
    let _ = state.commit_transform(&a, LayerTransform {
        x: 12.5,
        y: -3.25,
        scale: 1.7,
        rotation_deg: -33.0,
    });
    let _ = state.commit_transform(&LayerId::Stats, LayerTransform::at(40.0, 400.0));
    let _ = state.toggle_behind(&LayerId::Route);
    let _ = state.toggle_stat(StatField::Pace, &run);
    let _ = state.set_route_mode(RouteMode::Map);
    let _ = state.set_background_filter(BackgroundFilter::Warm);
    let _ = state.remove_image_overlay(&b);
    let _ = state.select(a);
    state
}

#[test]
fn sanitizing_a_serialized_core_draft_is_identity() {
    for state in [EditorState::default(), edited_state()] {
        let draft = Draft::from_state(&state);
        let text = serde_json::to_string(&draft).expect("serialize");
        let value: Value = serde_json::from_str(&text).expect("parse");
        assert_eq!(sanitize(&value), Some(draft.clone()));

        let again = sanitize(&draft.to_value()).expect("sanitize twice");
        assert_eq!(sanitize(&again.to_value()), Some(again));
    }
}

#[test]
fn blank_background_uri_never_reaches_a_draft() {
    let mut state = EditorState::default();
    for uri in ["", "  "] {
        let outcome = state.set_background(Some(BackgroundMedia::image(uri)));
        assert_eq!(outcome, EditOutcome::Unchanged);
    }
    assert_eq!(state.media, None);

    let draft = Draft::from_state(&state);
    assert_eq!(sanitize(&draft.to_value()), Some(draft));
}

#[test]
fn wrong_or_missing_version_is_no_draft() {
    assert_eq!(sanitize(&json!({})), None);
    assert_eq!(sanitize(&json!({"v": 2})), None);
    assert_eq!(sanitize(&json!({"v": "1"})), None);
    assert_eq!(sanitize(&json!([1, 2])), None);
    assert_eq!(sanitize(&Value::Null), None);
}

#[test]
fn bare_version_tag_yields_defaults() {
    let d = sanitize(&json!({"v": 1})).expect("draft");
    let defaults = Draft::from_state(&EditorState::default());
    assert_eq!(d.selected_layer, None);
    assert_eq!(d.template_id, defaults.template_id);
    assert_eq!(d.layer_order, defaults.layer_order);
    assert_eq!(d.visible_layers, defaults.visible_layers);
    assert_eq!(d.stats_visibility, defaults.stats_visibility);
    assert!(d.overlays.is_empty());
    assert!(d.transforms.is_empty());
}

#[test]
fn malformed_fields_fall_back_one_by_one() {
    let d = sanitize(&json!({
        "v": 1,
        "media": {"kind": "gif", "uri": "x"},
        "templateId": "nope",
        "fontPresetId": 7,
        "routeMode": "satellite",
        "primaryField": "cadence",
        "backgroundFilter": "sepia",
        "selectedLayer": "image:missing",
        "statsVisibility": {"distance": false, "time": false, "pace": false, "elev": false},
        "visibleLayers": {"route": false, "bogus": true, "meta": "yes"},
        "transforms": {
            "stats": {"x": "left", "y": 10, "scale": -1, "rotationDeg": null},
            "nonsense": {"x": 1}
        }
    }))
    .expect("draft");

    assert_eq!(d.media, None);
    assert_eq!(d.template_id, "classic");
    assert_eq!(d.font_preset_id, "sans");
    assert_eq!(d.route_mode, RouteMode::Trace);
    assert_eq!(d.primary_field, StatField::Distance);
    assert_eq!(d.background_filter, BackgroundFilter::None);
    assert_eq!(d.selected_layer, Some(LayerId::Stats));
    assert_eq!(d.stats_visibility, StatsVisibility::default());
    assert_eq!(d.visible_layers.get(&LayerId::Route), Some(&false));
    assert_eq!(d.visible_layers.get(&LayerId::Meta), Some(&true));
    assert_eq!(
        d.transforms.get(&LayerId::Stats),
        Some(&LayerTransform::at(0.0, 10.0))
    );
    assert_eq!(d.transforms.len(), 1);
}

#[test]
fn bad_overlays_are_dropped_and_duplicates_collapse() {
    let d = sanitize(&json!({
        "v": 1,
        "overlays": [
            {"id": "a", "uri": "file:///a.png", "width": 100, "height": 50, "opacity": 3},
            {"id": "a", "uri": "file:///dup.png", "width": 10, "height": 10},
            {"id": "b", "uri": "", "width": 10, "height": 10},
            {"id": "c", "uri": "file:///c.png", "width": 0, "height": 10},
            "junk"
        ],
        "layerOrder": ["meta", "image:a", "meta", "image:gone", 4, "???"]
    }))
    .expect("draft");

    assert_eq!(d.overlays.len(), 1);
    assert_eq!(d.overlays[0].uri, "file:///a.png");
    assert_eq!(d.overlays[0].opacity, 1.0);
    assert_eq!(d.overlays[0].name, "");
    assert_eq!(
        d.layer_order,
        vec![
            LayerId::Meta,
            LayerId::image("a"),
            LayerId::image("gone"),
            LayerId::Route,
            LayerId::Primary,
            LayerId::Stats,
        ]
    );
}

#[test]
fn video_media_survives() {
    let d = sanitize(&json!({"v": 1, "media": {"kind": "video", "uri": "file:///clip.mp4"}}))
        .expect("draft");
    assert_eq!(d.media, Some(BackgroundMedia::video("file:///clip.mp4")));
}
