use super::*;

const RUN_JSON: &str = r#"{
    "id": 1234567890,
    "name": "Morning Run",
    "distance": 5021.3,
    "moving_time": 1513,
    "elapsed_time": 1600,
    "total_elevation_gain": 42.0,
    "type": "Run",
    "start_date": "2026-10-18T07:15:00Z",
    "average_speed": 3.319,
    "map": { "summary_polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" }
}"#;

#[test]
fn parses_api_shape_with_numeric_id() {
    let a: Activity = serde_json::from_str(RUN_JSON).unwrap();
    assert_eq!(a.id, "1234567890");
    assert_eq!(a.kind, "Run");
    assert_eq!(a.path_points().len(), 3);
    assert!(a.has_route());
    assert_eq!(a.display_date().as_deref(), Some("Oct 18, 2026"));
}

#[test]
fn null_polyline_means_no_route() {
    let a: Activity =
        serde_json::from_str(r#"{ "id": "abc", "type": "Yoga", "map": { "summary_polyline": null } }"#)
            .unwrap();
    assert!(!a.has_route());
    assert!(a.path_points().is_empty());
    assert!(!a.supports_full_stats());
}

#[test]
fn sport_family_is_case_insensitive() {
    let mut a: Activity = serde_json::from_str(RUN_JSON).unwrap();
    for (kind, family) in [
        ("run", SportFamily::Foot),
        ("TrailRun", SportFamily::Foot),
        ("Ride", SportFamily::Cycle),
        ("cycling", SportFamily::Cycle),
        ("Swim", SportFamily::Water),
        ("WeightTraining", SportFamily::Other),
    ] {
        a.kind = kind.to_string();
        assert_eq!(a.sport_family(), family, "{kind}");
    }
}

#[test]
fn duration_falls_back_to_elapsed() {
    let mut a: Activity = serde_json::from_str(RUN_JSON).unwrap();
    a.moving_time = 0;
    assert_eq!(a.duration_secs(), 1600);
}
