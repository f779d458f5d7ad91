use super::*;
use crate::canvas::editor::{Z_TINT, Z_WATERMARK};
use crate::canvas::scene::WATERMARK_SIZE;

fn snapshotter() -> CpuSnapshotter {
    CpuSnapshotter::new(FontBook::new(), MediaStore::new("/nonexistent"))
}

fn full(z: i32, size: Size, content: NodeContent) -> SceneNode {
    SceneNode {
        layer: None,
        z,
        transform: Affine::IDENTITY,
        size,
        opacity: 1.0,
        content,
    }
}

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

#[test]
fn empty_scene_is_fully_transparent() {
    let scene = Scene {
        size: Size::new(8.0, 8.0),
        nodes: Vec::new(),
    };
    let frame = snapshotter().snapshot(&scene).unwrap();
    assert_eq!((frame.width, frame.height), (8, 8));
    assert!(frame.premultiplied);
    assert!(frame.data.iter().all(|b| *b == 0));
}

#[test]
fn tint_covers_the_canvas() {
    let size = Size::new(6.0, 6.0);
    let scene = Scene {
        size,
        nodes: vec![full(Z_TINT, size, NodeContent::Tint(Rgba8::new(255, 0, 0, 255)))],
    };
    let frame = snapshotter().snapshot(&scene).unwrap();
    assert_eq!(pixel(&frame, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame, 5, 5), [255, 0, 0, 255]);
    assert!(!frame.has_transparency());
}

#[test]
fn image_overlay_uses_front_loaded_pixels() {
    let mut snap = snapshotter();
    snap.media_mut().insert(
        "mem://blue",
        PreparedImage {
            width: 2,
            height: 2,
            rgba8_premul: Arc::new([0u8, 0, 255, 255].repeat(4)),
        },
    );
    let scene = Scene {
        size: Size::new(8.0, 8.0),
        nodes: vec![SceneNode {
            layer: None,
            z: 20,
            transform: Affine::IDENTITY,
            size: Size::new(4.0, 4.0),
            opacity: 1.0,
            content: NodeContent::Image {
                uri: "mem://blue".into(),
            },
        }],
    };
    let frame = snap.snapshot(&scene).unwrap();
    let inside = pixel(&frame, 1, 1);
    assert!(inside[2] > 200 && inside[3] > 200);
    assert_eq!(pixel(&frame, 7, 7), [0, 0, 0, 0]);
}

#[test]
fn missing_overlay_media_is_an_input_error() {
    let scene = Scene {
        size: Size::new(4.0, 4.0),
        nodes: vec![full(20, Size::new(4.0, 4.0), NodeContent::Image { uri: "gone.png".into() })],
    };
    assert!(matches!(snapshotter().snapshot(&scene), Err(StoryError::Input(_))));
}

#[test]
fn missing_cutout_degrades_to_nothing() {
    let size = Size::new(4.0, 4.0);
    let scene = Scene {
        size,
        nodes: vec![full(5, size, NodeContent::SubjectCutout { uri: "gone.png".into() })],
    };
    let frame = snapshotter().snapshot(&scene).unwrap();
    assert!(frame.data.iter().all(|b| *b == 0));
}

#[test]
fn watermark_lands_in_its_box() {
    let scene = Scene {
        size: Size::new(120.0, 40.0),
        nodes: vec![SceneNode {
            layer: None,
            z: Z_WATERMARK,
            transform: Affine::translate(Vec2::new(8.0, 8.0)),
            size: WATERMARK_SIZE,
            opacity: 1.0,
            content: NodeContent::Watermark,
        }],
    };
    let frame = snapshotter().snapshot(&scene).unwrap();
    assert_eq!(pixel(&frame, 0, 0)[3], 0);
    assert!(pixel(&frame, 8 + 48, 8 + 12)[3] > 0);
}

#[test]
fn zero_sized_scene_is_rejected() {
    let scene = Scene {
        size: Size::ZERO,
        nodes: Vec::new(),
    };
    assert!(snapshotter().snapshot(&scene).is_err());
}

#[test]
fn cover_fit_fills_frame_and_centres() {
    let t = cover_fit(Size::new(100.0, 50.0), Size::new(50.0, 50.0));
    let a = t * Point::new(0.0, 0.0);
    let b = t * Point::new(100.0, 50.0);
    assert_eq!((a.y, b.y), (0.0, 50.0));
    assert_eq!(a.x, -25.0);
    assert_eq!(b.x, 75.0);
}
