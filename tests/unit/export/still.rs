use std::path::PathBuf;

use super::*;
use crate::activity::model::Activity;
use crate::canvas::editor::EditorState;
use crate::canvas::layer::BackgroundMedia;
use crate::canvas::scene::{NodeContent, Scene};
use crate::canvas::viewport::CanvasGeometry;
use crate::foundation::config::EditorConfig;
use crate::foundation::core::Canvas;
use crate::platform::CancelToken;
use crate::render::text::ApproxMeasure;

struct SolidSnapshotter {
    px: [u8; 4],
    scenes: Vec<Scene>,
}

impl Snapshotter for SolidSnapshotter {
    fn snapshot(&mut self, scene: &Scene) -> StoryResult<FrameRGBA> {
        let (w, h) = (scene.size.width as u32, scene.size.height as u32);
        self.scenes.push(scene.clone());
        Ok(FrameRGBA {
            width: w,
            height: h,
            data: self.px.repeat((w * h) as usize),
            premultiplied: true,
        })
    }
}

fn out_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("storycard-still-{}-{name}", std::process::id()))
}

fn config() -> EditorConfig {
    EditorConfig {
        export_width: 36,
        export_height: 64,
        settle_ms: 0,
        watermark: false,
        ..EditorConfig::default()
    }
}

fn run(
    state: &EditorState,
    cancel: &CancelToken,
    dir: &Path,
    snap: &mut SolidSnapshotter,
) -> StoryResult<StillArtifact> {
    let cfg = config();
    let activity = Activity::new("1", "Run");
    let ctx = ExportContext {
        state,
        activity: &activity,
        config: &cfg,
        source: CanvasGeometry::for_export(Canvas { width: 360, height: 640 }, cfg.logical_size()),
        measure: &ApproxMeasure,
        cancel,
        out_dir: dir,
    };
    export_still(&ctx, snap)
}

#[test]
fn no_background_exports_transparent_png() {
    let dir = out_dir("png");
    let mut snap = SolidSnapshotter {
        px: [0, 0, 0, 0],
        scenes: Vec::new(),
    };
    let art = run(&EditorState::default(), &CancelToken::new(), &dir, &mut snap).unwrap();

    assert_eq!(art.format, StillFormat::Png);
    assert_eq!(art.mime(), "image/png");
    assert_eq!((art.width, art.height), (36, 64));
    assert_eq!(art.path.extension().and_then(|e| e.to_str()), Some("png"));

    let scene = &snap.scenes[0];
    assert!(!scene.has_content(|c| matches!(
        c,
        NodeContent::Checkerboard | NodeContent::Media { .. } | NodeContent::SelectionOutline
    )));

    let img = image::open(&art.path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (36, 64));
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn image_background_exports_jpeg() {
    let dir = out_dir("jpg");
    let mut state = EditorState::default();
    let _ = state.set_background(Some(BackgroundMedia::image("file:///bg.jpg")));
    let mut snap = SolidSnapshotter {
        px: [200, 10, 10, 255],
        scenes: Vec::new(),
    };
    let art = run(&state, &CancelToken::new(), &dir, &mut snap).unwrap();

    assert!(matches!(art.format, StillFormat::Jpeg { quality: 92 }));
    assert_eq!(art.mime(), "image/jpeg");
    assert!(snap.scenes[0].has_content(|c| matches!(c, NodeContent::Media { .. })));

    let img = image::open(&art.path).unwrap();
    assert!(!img.color().has_alpha());
    let px = img.to_rgb8().get_pixel(10, 10).0;
    assert!(px[0] > 150 && px[1] < 60);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cancelled_export_never_snapshots() {
    let dir = out_dir("cancel");
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut snap = SolidSnapshotter {
        px: [0, 0, 0, 0],
        scenes: Vec::new(),
    };
    let err = run(&EditorState::default(), &cancel, &dir, &mut snap).unwrap_err();
    assert!(matches!(err, StoryError::Cancelled(_)));
    assert!(snap.scenes.is_empty());
}

#[test]
fn empty_frames_are_rejected() {
    let frame = FrameRGBA {
        width: 0,
        height: 0,
        data: Vec::new(),
        premultiplied: true,
    };
    let err = write_still(&frame, StillFormat::Png, &out_dir("empty").join("x.png")).unwrap_err();
    assert!(matches!(err, StoryError::Export(_)));
}
