//! Storycard turns a fitness activity into a layered, editable story card.
//!
//! The editor composes a header, a stats block, a hero metric, the route trace and free-form
//! image overlays over a photo or video background. Every layer can be dragged, pinched and
//! rotated; the result is flattened into a 1080x1920 PNG/JPG or composited onto a video.
//!
//! # Pipeline overview
//!
//! 1. **Layout**: templates + [`layout::sizing`] give each layer a default placement.
//! 2. **Gesture**: a [`gesture::engine::TransformEngine`] per layer turns pan/pinch/rotate
//!    input into clamped, snapped transforms and sends them through [`gesture::queue`].
//! 3. **Scene**: [`canvas::scene::build_scene`] flattens [`EditorState`] into z-sorted nodes.
//! 4. **Raster**: a [`platform::Snapshotter`] (by default [`render::raster::CpuSnapshotter`])
//!    turns the scene into premultiplied RGBA8.
//! 5. **Export**: [`export`] encodes stills or hands a transparent overlay to a
//!    [`platform::VideoCompositor`].
//!
//! [`session::EditorSession`] owns the state and wires all of the above to injected platform
//! collaborators. Drafts round-trip through [`draft::sanitize`].
#![forbid(unsafe_code)]

pub mod activity;
pub mod assets;
pub mod canvas;
pub mod draft;
pub mod export;
pub mod foundation;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod platform;
pub mod render;
pub mod session;

pub use activity::model::Activity;
pub use activity::stats::{StatField, StatsVisibility};
pub use canvas::editor::{EditOutcome, EditorState, OrderStep};
pub use canvas::layer::{
    BackgroundFilter, BackgroundMedia, ImageOverlay, LayerId, MediaKind, RouteMode,
};
pub use canvas::scene::{RenderFlags, Scene, SceneNode, build_scene};
pub use canvas::viewport::CanvasGeometry;
pub use draft::{Draft, sanitize};
pub use export::{FfmpegVideoCompositor, StillArtifact, StillFormat, VideoArtifact};
pub use foundation::config::EditorConfig;
pub use foundation::core::{Canvas, FrameRGBA, LayerTransform, Rgba8};
pub use foundation::error::{StoryError, StoryResult};
pub use geometry::polyline::{decode_path, encode_path};
pub use geometry::projection::normalize;
pub use gesture::engine::{GestureEvent, GestureInput, GestureLimits, TransformEngine};
pub use gesture::queue::{CommandReceiver, CommandSender, LayerCommand, command_queue};
pub use layout::sizing::stats_block_width;
pub use layout::template::{LayoutKind, Template};
pub use render::raster::CpuSnapshotter;
pub use session::{Collaborators, EditorSession, Notice};
