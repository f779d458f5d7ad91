use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use super::*;
use crate::canvas::layer::RouteMode;
use crate::foundation::core::{FrameRGBA, Vec2};
use crate::gesture::engine::GestureInput;
use crate::gesture::queue::{CommandSender, command_queue};
use crate::platform::{MemoryDraftStore, StaticEntitlements};
use crate::render::text::ApproxMeasure;

#[derive(Clone, Default)]
struct SharedSink(Rc<RefCell<Vec<(PathBuf, String)>>>);

impl ShareSink for SharedSink {
    fn share(&mut self, path: &Path, mime: &str) -> StoryResult<()> {
        self.0.borrow_mut().push((path.to_path_buf(), mime.to_string()));
        Ok(())
    }
}

struct ClearSnapshotter;

impl Snapshotter for ClearSnapshotter {
    fn snapshot(&mut self, scene: &Scene) -> StoryResult<FrameRGBA> {
        let (w, h) = (scene.size.width as u32, scene.size.height as u32);
        Ok(FrameRGBA {
            width: w,
            height: h,
            data: vec![0; (w * h * 4) as usize],
            premultiplied: true,
        })
    }
}

struct BrokenSnapshotter;

impl Snapshotter for BrokenSnapshotter {
    fn snapshot(&mut self, _scene: &Scene) -> StoryResult<FrameRGBA> {
        Err(StoryError::export("gpu lost"))
    }
}

struct FixedExtractor(&'static str);

impl SubjectExtractor for FixedExtractor {
    fn extract(&self, _image_uri: &str) -> StoryResult<String> {
        Ok(self.0.to_string())
    }
}

fn out_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("storycard-session-{}-{name}", std::process::id()))
}

fn session_with(premium: bool, snapshotter: Box<dyn Snapshotter>, sink: SharedSink) -> EditorSession {
    let config = EditorConfig {
        export_width: 36,
        export_height: 64,
        settle_ms: 0,
        ..EditorConfig::default()
    };
    let collab = Collaborators {
        entitlements: Box::new(StaticEntitlements { premium }),
        drafts: Box::new(MemoryDraftStore::default()),
        share: Box::new(sink),
        snapshotter,
        measure: Box::new(ApproxMeasure),
        compositor: None,
        extractor: Some(Box::new(FixedExtractor("file:///cutout.png"))),
    };
    EditorSession::new(Activity::new("42", "Run"), config, collab, out_dir("default"))
}

fn session() -> EditorSession {
    session_with(false, Box::new(ClearSnapshotter), SharedSink::default())
}

fn stored_draft(s: &EditorSession) -> Option<serde_json::Value> {
    s.collab.drafts.load().unwrap()
}

#[test]
fn fresh_session_has_no_draft_until_an_edit() {
    let mut s = session();
    assert_eq!(stored_draft(&s), None);
    let outcome = s.edit(|state, _, _| state.set_route_mode(RouteMode::Map));
    assert!(outcome.changed());
    let draft = stored_draft(&s).expect("draft saved");
    assert_eq!(draft["routeMode"], "map");
}

#[test]
fn commit_command_persists_and_clears_live_value() {
    let mut s = session();
    let t = LayerTransform::at(33.0, 44.0);
    s.handle_command(LayerCommand {
        layer: LayerId::Stats,
        event: GestureEvent::InteractionStarted,
    });
    s.handle_command(LayerCommand {
        layer: LayerId::Stats,
        event: GestureEvent::Live(t),
    });
    assert_eq!(s.interacting(), Some(&LayerId::Stats));
    assert_eq!(s.live_transform(&LayerId::Stats), Some(t));

    s.handle_command(LayerCommand {
        layer: LayerId::Stats,
        event: GestureEvent::Guides {
            vertical: true,
            horizontal: false,
        },
    });
    assert!(s.guides().vertical);

    s.handle_command(LayerCommand {
        layer: LayerId::Stats,
        event: GestureEvent::Commit(t),
    });
    s.handle_command(LayerCommand {
        layer: LayerId::Stats,
        event: GestureEvent::InteractionEnded,
    });
    assert_eq!(s.live_transform(&LayerId::Stats), None);
    assert_eq!(s.state().transforms.get(&LayerId::Stats), Some(&t));
    assert!(!s.guides().any());
    assert_eq!(s.interacting(), None);
    assert_eq!(stored_draft(&s).unwrap()["transforms"]["stats"]["x"], 33.0);
}

#[test]
fn gesture_engine_round_trip_through_the_queue() {
    let mut s = session();
    let (mut tx, rx) = command_queue();
    let mut engine = s.engine_for(&LayerId::Meta).expect("meta is visible");

    engine.handle(GestureInput::Begin { at_ms: 0, selected: false }, &mut tx);
    engine.handle(
        GestureInput::Pan {
            translation: Vec2::new(5000.0, 40.0),
        },
        &mut tx,
    );
    engine.handle(GestureInput::End { at_ms: 400 }, &mut tx);
    assert!(s.apply_commands(&rx) >= 3);

    let committed = s.state().transforms[&LayerId::Meta];
    assert_eq!(committed, engine.transform());
    let node = s.scene().node(&LayerId::Meta).cloned().expect("meta node");
    let lw = node.size.width * s.geometry().scale;
    assert!(committed.x <= s.geometry().display.width - lw * 0.5 + 1e-9);
}

fn tap(s: &EditorSession, engine: &mut TransformEngine, tx: &mut CommandSender, at_ms: u64) {
    let selected = s.is_selected(engine.layer());
    engine.handle(GestureInput::Begin { at_ms, selected }, tx);
    engine.handle(GestureInput::End { at_ms: at_ms + 50 }, tx);
}

#[test]
fn two_taps_on_a_kept_engine_select_then_activate() {
    let mut s = session();
    let (mut tx, rx) = command_queue();
    let mut engine = s.engine_for(&LayerId::Meta).expect("meta is visible");
    let font = s.state().font_preset_id.clone();

    tap(&s, &mut engine, &mut tx, 0);
    assert_eq!(s.apply_commands(&rx), 1);
    assert!(s.is_selected(&LayerId::Meta));
    assert_eq!(s.state().font_preset_id, font);

    tap(&s, &mut engine, &mut tx, 1000);
    assert_eq!(s.apply_commands(&rx), 2);
    assert_ne!(s.state().font_preset_id, font);
}

#[test]
fn tap_after_selection_moved_away_only_selects() {
    let mut s = session();
    let (mut tx, rx) = command_queue();
    let _ = s.edit(|state, _, _| state.select(LayerId::Meta));
    let mut engine = s.engine_for(&LayerId::Meta).expect("meta is visible");
    let _ = s.edit(|state, _, _| state.select(LayerId::Stats));
    let font = s.state().font_preset_id.clone();

    tap(&s, &mut engine, &mut tx, 0);
    assert_eq!(s.apply_commands(&rx), 1);
    assert!(s.is_selected(&LayerId::Meta));
    assert_eq!(s.state().font_preset_id, font);
}

#[test]
fn engine_seed_outside_the_canvas_is_stored_clamped() {
    let mut s = session();
    let _ = s.edit(|state, _, _| {
        state.commit_transform(&LayerId::Meta, LayerTransform::at(5000.0, -5000.0))
    });
    let engine = s.engine_for(&LayerId::Meta).expect("meta is visible");

    let stored = s.state().transforms[&LayerId::Meta];
    assert_eq!(stored, engine.transform());
    assert!(stored.x < 5000.0 && stored.y > -5000.0);
    assert_eq!(stored_draft(&s).unwrap()["transforms"]["meta"]["x"], stored.x);
}

#[test]
fn second_tap_on_stats_cycles_the_template() {
    let mut s = session();
    let before = s.state().template_id.clone();
    s.handle_command(LayerCommand {
        layer: LayerId::Stats,
        event: GestureEvent::Activate,
    });
    assert_ne!(s.state().template_id, before);
    assert!(!template_is_premium(&s.state().template_id));
}

fn template_is_premium(id: &str) -> bool {
    crate::layout::template::template(id).is_some_and(|t| t.premium)
}

#[test]
fn locked_template_raises_upsell_without_mutation() {
    let mut s = session();
    let before = s.state().clone();
    let outcome = s.select_template("glass").unwrap();
    assert_eq!(outcome, EditOutcome::Upsell);
    assert_eq!(s.state(), &before);
    assert_eq!(stored_draft(&s), None);
    assert_eq!(s.take_notice(), Some(Notice::upsell("glass")));

    let mut premium = session_with(true, Box::new(ClearSnapshotter), SharedSink::default());
    assert!(premium.select_template("glass").unwrap().changed());
    assert!(premium.notice().is_none());
}

#[test]
fn invalid_stored_draft_is_discarded() {
    let mut s = session();
    s.collab
        .drafts
        .save(&serde_json::json!({"v": 9, "templateId": "grid"}))
        .unwrap();
    assert!(!s.restore_draft());
    assert_eq!(stored_draft(&s), None);
    assert_eq!(s.state(), &EditorState::default());
}

#[test]
fn restore_round_trips_a_saved_session() {
    let mut s = session();
    let _ = s.edit(|state, _, _| state.toggle_layer(&LayerId::Primary));
    let _ = s.add_image_overlay("file:///sticker.png", Size::new(50.0, 50.0), "sticker");
    let saved = s.state().clone();
    let blob = stored_draft(&s).unwrap();

    let mut other = session();
    other.collab.drafts.save(&blob).unwrap();
    assert!(other.restore_draft());
    assert_eq!(other.state(), &saved);
}

#[test]
fn reset_clears_state_and_draft() {
    let mut s = session();
    let _ = s.edit(|state, _, _| state.set_route_mode(RouteMode::Off));
    s.reset();
    assert_eq!(s.state(), &EditorState::default());
    assert_eq!(stored_draft(&s), None);
}

#[test]
fn successful_still_export_is_shared_as_png() {
    let sink = SharedSink::default();
    let mut s = session_with(false, Box::new(ClearSnapshotter), sink.clone());
    let art = s.export_still().expect("exported");
    assert_eq!(art.format, crate::export::StillFormat::Png);
    let shared = sink.0.borrow();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].1, "image/png");
    assert!(!s.is_busy());
    assert_eq!(s.capture_flags(), None);
    let _ = std::fs::remove_file(&art.path);
}

#[test]
fn failed_export_resets_flags_and_reports() {
    let sink = SharedSink::default();
    let mut s = session_with(false, Box::new(BrokenSnapshotter), sink.clone());
    assert!(s.export_still().is_none());
    assert!(!s.is_busy());
    assert_eq!(s.capture_flags(), None);
    assert!(sink.0.borrow().is_empty());
    match s.take_notice() {
        Some(Notice::Error(msg)) => assert!(msg.contains("gpu lost")),
        other => panic!("unexpected notice {other:?}"),
    }
}

#[test]
fn cancelled_export_is_silent_and_rearms() {
    let mut s = session();
    s.export_cancel_token().cancel();
    assert!(s.export_still().is_none());
    assert!(s.notice().is_none());
    assert!(!s.export_cancel_token().is_cancelled());
}

#[test]
fn video_export_without_compositor_is_rejected() {
    let mut s = session();
    let _ = s.set_background(Some(BackgroundMedia::video("file:///clip.mp4")));
    assert!(s.export_video().is_none());
    assert!(matches!(s.take_notice(), Some(Notice::Error(_))));
    assert_eq!(s.capture_flags(), None);
}

#[test]
fn extraction_applies_cutout_for_current_background() {
    let mut s = session();
    let _ = s.set_background(Some(BackgroundMedia::image("file:///bg.jpg")));
    assert!(s.extract_subject());
    assert_eq!(s.state().subject_cutout.as_deref(), Some("file:///cutout.png"));
    assert!(!s.is_extracting());
}

#[test]
fn stale_extraction_is_discarded() {
    let mut s = session();
    let _ = s.set_background(Some(BackgroundMedia::image("file:///a.jpg")));
    let ticket = s.begin_extraction().expect("ticket");
    assert!(s.is_extracting());

    let _ = s.set_background(Some(BackgroundMedia::image("file:///b.jpg")));
    assert!(ticket.cancel.is_cancelled());
    assert!(!s.finish_extraction(&ticket, Ok("file:///a-cut.png".into())));
    assert_eq!(s.state().subject_cutout, None);
    assert!(!s.is_extracting());
}

#[test]
fn failed_extraction_degrades_to_no_cutout() {
    let mut s = session();
    let _ = s.set_background(Some(BackgroundMedia::image("file:///bg.jpg")));
    let ticket = s.begin_extraction().expect("ticket");
    assert!(!s.finish_extraction(&ticket, Err(StoryError::input("model missing"))));
    assert_eq!(s.state().subject_cutout, None);
    assert!(!s.is_extracting());
    assert!(s.notice().is_none());
}

#[test]
fn extraction_needs_an_image_background() {
    let mut s = session();
    assert!(s.begin_extraction().is_none());
    let _ = s.set_background(Some(BackgroundMedia::video("file:///clip.mp4")));
    assert!(!s.extract_subject());
}

#[test]
fn viewport_refit_rescales_stored_transforms() {
    let mut s = session();
    s.handle_command(LayerCommand {
        layer: LayerId::Stats,
        event: GestureEvent::Commit(LayerTransform::at(100.0, 200.0)),
    });
    // 2x fit, shrunk by the 0.94 margin.
    s.set_viewport(Size::new(720.0, 1280.0), Size::ZERO);
    let k = s.geometry().scale;
    assert!((k - 2.0 * 0.94).abs() < 1e-9);
    let t = s.state().transforms[&LayerId::Stats];
    assert!((t.x - 100.0 * k).abs() < 1e-9);
    assert!((t.y - 200.0 * k).abs() < 1e-9);
}
