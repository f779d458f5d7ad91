use super::*;
use crate::activity::model::Activity;
use crate::foundation::core::Size;

#[test]
fn default_state_serializes_with_camel_case_keys() {
    let v = Draft::from_state(&EditorState::default()).to_value();
    assert_eq!(v["v"], 1);
    assert_eq!(v["selectedLayer"], "stats");
    assert_eq!(v["templateId"], "classic");
    assert_eq!(v["routeMode"], "trace");
    assert_eq!(v["primaryField"], "distance");
    assert_eq!(v["layerOrder"][0], "route");
    assert_eq!(v["visibleLayers"]["primary"], false);
    assert_eq!(v["backgroundFilter"], "none");
    assert!(v["media"].is_null());
}

#[test]
fn state_round_trips_without_the_cutout() {
    let mut state = EditorState::default();
    let _ = state.set_background(Some(BackgroundMedia::image("file:///bg.jpg")));
    let _ = state.set_subject_cutout(Some("file:///cut.png".to_string()));
    let img = state
        .add_image_overlay("file:///sticker.png", Size::new(120.0, 80.0), "sticker")
        .expect("add overlay");
    let _ = state.commit_transform(&img, LayerTransform::at(10.0, 20.0));
    let _ = state.toggle_stat(StatField::Elev, &Activity::new("1", "Run"));

    let restored = Draft::from_state(&state).into_state();
    assert_eq!(restored.subject_cutout, None);
    assert_eq!(restored.overlays, state.overlays);
    assert_eq!(restored.transforms, state.transforms);
    assert_eq!(restored.selected, Some(img));
    assert!(restored.stats_visibility.elev);
}

#[test]
fn image_keys_use_the_prefixed_form() {
    let mut state = EditorState::default();
    let img = state
        .add_image_overlay("file:///a.png", Size::new(10.0, 10.0), "")
        .expect("add overlay");
    let _ = state.commit_transform(&img, LayerTransform::at(1.0, 2.0));
    let v = Draft::from_state(&state).to_value();
    let key = img.to_string();
    assert!(key.starts_with("image:"));
    assert_eq!(v["transforms"][key.as_str()]["x"], 1.0);
    assert_eq!(v["transforms"][key.as_str()]["rotationDeg"], 0.0);
}
