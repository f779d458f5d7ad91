use super::*;
use crate::canvas::layer::{BackgroundFilter, BackgroundMedia};
use crate::foundation::core::Canvas;
use crate::render::text::ApproxMeasure;

const LOGICAL: Size = Size::new(360.0, 640.0);

fn run() -> Activity {
    let mut a = Activity::new("1", "Run");
    a.distance = 5021.3;
    a.moving_time = 1513;
    a.map.summary_polyline = Some("_p~iF~ps|U_ulLnnqC_mqNvxq`@".to_string());
    a
}

fn build(state: &EditorState, activity: &Activity, flags: RenderFlags, guides: GuideState) -> Scene {
    let geometry = CanvasGeometry::fit(Size::new(360.0, 640.0), Size::ZERO, LOGICAL, 1.0);
    let live = BTreeMap::new();
    build_scene(
        state,
        &SceneInputs {
            activity,
            source: geometry,
            target: geometry,
            flags,
            guides,
            live: &live,
            measure: &ApproxMeasure,
        },
    )
}

#[test]
fn editing_scene_shows_chrome() {
    let state = EditorState::default();
    let guides = GuideState {
        vertical: true,
        ..GuideState::default()
    };
    let scene = build(&state, &run(), RenderFlags::default(), guides);
    assert!(scene.has_content(|c| matches!(c, NodeContent::Checkerboard)));
    assert!(scene.has_content(|c| matches!(c, NodeContent::SelectionOutline)));
    assert!(scene.has_content(|c| matches!(c, NodeContent::Guide(GuideAxis::Vertical))));
    assert!(scene.node(&LayerId::Route).is_some());
    assert!(scene.nodes.windows(2).all(|w| w[0].z <= w[1].z));
}

#[test]
fn single_point_route_still_gets_a_node() {
    let mut a = run();
    a.map.summary_polyline = Some(crate::geometry::polyline::encode_path(&[Point::new(-120.2, 38.5)]));
    assert!(a.has_route());
    let scene = build(&EditorState::default(), &a, RenderFlags::default(), GuideState::default());
    let node = scene.node(&LayerId::Route).expect("route node");
    match &node.content {
        NodeContent::Route { points, .. } => {
            assert_eq!(points.len(), 1);
            assert!(points[0].x > 0.0 && points[0].x < node.size.width);
        }
        other => panic!("unexpected content {other:?}"),
    }
}

#[test]
fn capture_hides_chrome_but_keeps_media() {
    let mut state = EditorState::default();
    let _ = state.set_background(Some(BackgroundMedia::image("bg.jpg")));
    let _ = state.set_background_filter(BackgroundFilter::Dim);
    let flags = RenderFlags {
        capture: true,
        ..RenderFlags::default()
    };
    let guides = GuideState {
        vertical: true,
        horizontal: true,
        rotation: true,
    };
    let scene = build(&state, &run(), flags, guides);
    assert!(!scene.has_content(|c| matches!(c, NodeContent::SelectionOutline | NodeContent::Guide(_) | NodeContent::Checkerboard)));
    assert!(scene.has_content(|c| matches!(c, NodeContent::Media { .. })));
    assert!(scene.has_content(|c| matches!(c, NodeContent::Tint(_))));
}

#[test]
fn transparent_only_drops_background_and_tint() {
    let mut state = EditorState::default();
    let _ = state.set_background(Some(BackgroundMedia::video("clip.mp4")));
    let _ = state.set_background_filter(BackgroundFilter::Warm);
    let flags = RenderFlags {
        capture: true,
        transparent_only: true,
        watermark: false,
    };
    let scene = build(&state, &run(), flags, GuideState::default());
    assert!(scene.nodes.iter().all(|n| n.layer.is_some()));
}

#[test]
fn cutout_sits_between_behind_and_normal_layers() {
    let mut state = EditorState::default();
    let _ = state.set_subject_cutout(Some("cut.png".into()));
    let _ = state.toggle_behind(&LayerId::Meta);
    let scene = build(&state, &run(), RenderFlags::default(), GuideState::default());
    let pos = |pred: &dyn Fn(&SceneNode) -> bool| scene.nodes.iter().position(pred).unwrap();
    let cutout = pos(&|n| matches!(n.content, NodeContent::SubjectCutout { .. }));
    let meta = pos(&|n| n.layer == Some(LayerId::Meta));
    let stats = pos(&|n| n.layer == Some(LayerId::Stats) && matches!(n.content, NodeContent::Text(_)));
    assert!(meta < cutout && cutout < stats);
}

#[test]
fn route_skipped_without_path_or_when_off() {
    let state = EditorState::default();
    let scene = build(&state, &Activity::new("2", "Run"), RenderFlags::default(), GuideState::default());
    assert!(scene.node(&LayerId::Route).is_none());

    let mut off = EditorState::default();
    let _ = off.set_route_mode(RouteMode::Off);
    let scene = build(&off, &run(), RenderFlags::default(), GuideState::default());
    assert!(scene.node(&LayerId::Route).is_none());
}

#[test]
fn stored_transforms_rescale_to_export() {
    let mut state = EditorState::default();
    let _ = state.commit_transform(&LayerId::Meta, LayerTransform::at(10.0, 20.0));
    let editor = CanvasGeometry::fit(Size::new(360.0, 640.0), Size::ZERO, LOGICAL, 1.0);
    let export = CanvasGeometry::for_export(Canvas::STORY, LOGICAL);
    let live = BTreeMap::new();
    let activity = run();
    let scene = build_scene(
        &state,
        &SceneInputs {
            activity: &activity,
            source: editor,
            target: export,
            flags: RenderFlags {
                capture: true,
                ..RenderFlags::default()
            },
            guides: GuideState::default(),
            live: &live,
            measure: &ApproxMeasure,
        },
    );
    let meta = scene.node(&LayerId::Meta).unwrap();
    let origin = meta.transform * Point::ORIGIN;
    assert!((origin.x - 30.0).abs() < 1e-9);
    assert!((origin.y - 60.0).abs() < 1e-9);
    assert_eq!(scene.size, Size::new(1080.0, 1920.0));
}

#[test]
fn watermark_is_topmost() {
    let flags = RenderFlags {
        watermark: true,
        ..RenderFlags::default()
    };
    let scene = build(&EditorState::default(), &run(), flags, GuideState::default());
    let last = scene.nodes.last().unwrap();
    assert!(matches!(last.content, NodeContent::Watermark));
}
