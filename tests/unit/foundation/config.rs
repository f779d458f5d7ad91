use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = EditorConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.export_canvas(), Canvas::STORY);
    assert_eq!(cfg.snap_px, 8.0);
    assert_eq!((cfg.min_scale, cfg.max_scale), (0.7, 2.8));
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: EditorConfig = serde_json::from_str(r#"{ "snap_px": 12.0 }"#).unwrap();
    assert_eq!(cfg.snap_px, 12.0);
    assert_eq!(cfg.rotation_snap_deg, 2.0);
    assert_eq!(cfg.tap_max_ms, 180);
}

#[test]
fn validation_rejects_inverted_scale_bounds() {
    let cfg = EditorConfig {
        min_scale: 3.0,
        max_scale: 1.0,
        ..EditorConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn gesture_limits_mirror_config() {
    let cfg = EditorConfig::default();
    let limits = cfg.gesture_limits();
    assert_eq!(limits.snap_px, cfg.snap_px);
    assert_eq!(limits.tap_max_travel_px, 6.0);
}
