//! Export pipeline: flatten the editor into a still image or an overlaid video.
//!
//! Both paths build a capture-mode [`Scene`] at the export canvas, wait the settle delay, then
//! snapshot it. Flag bookkeeping and notices live in [`crate::session`]; this module only
//! produces files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::activity::model::Activity;
use crate::canvas::editor::EditorState;
use crate::canvas::scene::{GuideState, RenderFlags, Scene, SceneInputs, build_scene};
use crate::canvas::viewport::CanvasGeometry;
use crate::foundation::config::EditorConfig;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::StoryResult;
use crate::platform::{CancelToken, Snapshotter};
use crate::render::text::TextMeasure;

pub mod still;
pub mod video;

pub use still::{StillArtifact, StillFormat, export_still};
pub use video::{FfmpegVideoCompositor, VideoArtifact, export_video};

/// Everything an export reads. Borrowed from the session for the duration of one export.
pub struct ExportContext<'a> {
    pub state: &'a EditorState,
    pub activity: &'a Activity,
    pub config: &'a EditorConfig,
    /// Geometry the persisted transforms were committed in.
    pub source: CanvasGeometry,
    pub measure: &'a dyn TextMeasure,
    pub cancel: &'a CancelToken,
    pub out_dir: &'a Path,
}

impl ExportContext<'_> {
    pub fn target(&self) -> CanvasGeometry {
        CanvasGeometry::for_export(self.config.export_canvas(), self.config.logical_size())
    }

    /// Capture flags for a still export of the current state.
    pub fn still_flags(&self) -> RenderFlags {
        RenderFlags {
            capture: true,
            transparent_only: !self.state.has_image_background(),
            watermark: self.config.watermark,
        }
    }

    pub fn scene(&self, flags: RenderFlags) -> Scene {
        let live = BTreeMap::new();
        let inputs = SceneInputs {
            activity: self.activity,
            source: self.source,
            target: self.target(),
            flags,
            guides: GuideState::default(),
            live: &live,
            measure: self.measure,
        };
        build_scene(self.state, &inputs)
    }

    /// Settle, then snapshot the capture scene. Cancellation is checked on both sides of the
    /// snapshot.
    pub fn capture(
        &self,
        flags: RenderFlags,
        snapshotter: &mut dyn Snapshotter,
        what: &str,
    ) -> StoryResult<FrameRGBA> {
        if self.config.settle_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.config.settle_ms));
        }
        self.cancel.check(what)?;
        let scene = self.scene(flags);
        let frame = snapshotter.snapshot(&scene)?;
        self.cancel.check(what)?;
        Ok(frame)
    }
}

/// Unique file name under `dir`, e.g. `storycard-20261018-101500-1a2b3c4d.png`.
pub fn artifact_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    dir.join(format!("{prefix}-{stamp}-{}.{ext}", &nonce[..8]))
}
