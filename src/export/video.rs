use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::assets::store::resolve_uri;
use crate::canvas::scene::RenderFlags;
use crate::export::still::{StillFormat, write_still};
use crate::export::{ExportContext, artifact_path};
use crate::foundation::error::{StoryError, StoryResult};
use crate::platform::{Snapshotter, VideoCompositor};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoArtifact {
    pub path: PathBuf,
    /// Transparent overlay that was composited onto the video.
    pub overlay: PathBuf,
}

impl VideoArtifact {
    pub const MIME: &'static str = "video/mp4";
}

/// Snapshot the overlay layers into a transparent PNG and hand it to `compositor`.
#[tracing::instrument(skip_all, fields(out_dir = %ctx.out_dir.display()))]
pub fn export_video(
    ctx: &ExportContext<'_>,
    compositor: &dyn VideoCompositor,
    snapshotter: &mut dyn Snapshotter,
) -> StoryResult<VideoArtifact> {
    let Some(video_uri) = ctx.state.video_background() else {
        return Err(StoryError::capability(
            "video export needs a video background",
        ));
    };
    if !compositor.is_available() {
        return Err(StoryError::capability(
            "video compositing is not available on this device",
        ));
    }

    let flags = RenderFlags {
        capture: true,
        transparent_only: true,
        watermark: ctx.config.watermark,
    };
    let frame = ctx.capture(flags, snapshotter, "video export")?;
    let overlay = artifact_path(ctx.out_dir, "storycard-overlay", "png");
    write_still(&frame, StillFormat::Png, &overlay)?;
    ctx.cancel.check("video export")?;

    let overlay = std::path::absolute(&overlay)
        .with_context(|| format!("resolve overlay path '{}'", overlay.display()))?;
    let overlay_uri = format!("file://{}", overlay.display());
    let out_uri = compositor.compose(video_uri, &overlay_uri)?;
    let path = PathBuf::from(out_uri.strip_prefix("file://").unwrap_or(&out_uri));
    if !path.is_file() {
        return Err(StoryError::export(format!(
            "compositor reported '{}' but no file was written",
            path.display()
        )));
    }
    tracing::debug!(path = %path.display(), "video written");
    Ok(VideoArtifact { path, overlay })
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> StoryResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Composites with the system `ffmpeg` binary.
///
/// The overlay is scaled to the video frame, audio is copied when present, and the output is
/// H.264 yuv420p MP4 with `+faststart`.
#[derive(Clone, Debug)]
pub struct FfmpegVideoCompositor {
    media_root: PathBuf,
    out_dir: PathBuf,
}

impl FfmpegVideoCompositor {
    pub fn new(media_root: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
            out_dir: out_dir.into(),
        }
    }

    pub fn args(video: &Path, overlay: &Path, out: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-loglevel",
            "error",
            "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(video.display().to_string());
        args.push("-i".to_string());
        args.push(overlay.display().to_string());
        args.extend(
            [
                "-filter_complex",
                "[1:v][0:v]scale2ref[ov][base];[base][ov]overlay=0:0[out]",
                "-map",
                "[out]",
                "-map",
                "0:a?",
                "-c:a",
                "copy",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(out.display().to_string());
        args
    }
}

impl VideoCompositor for FfmpegVideoCompositor {
    fn is_available(&self) -> bool {
        is_ffmpeg_on_path()
    }

    #[tracing::instrument(skip(self))]
    fn compose(&self, video_uri: &str, overlay_uri: &str) -> StoryResult<String> {
        let video = resolve_uri(&self.media_root, video_uri)?;
        let overlay = resolve_uri(&self.media_root, overlay_uri)?;
        if !video.is_file() {
            return Err(StoryError::input(format!(
                "video '{}' does not exist",
                video.display()
            )));
        }
        let out = artifact_path(&self.out_dir, "storycard", "mp4");
        ensure_parent_dir(&out)?;
        let out = std::path::absolute(&out)
            .with_context(|| format!("resolve output path '{}'", out.display()))?;

        let output = Command::new("ffmpeg")
            .args(Self::args(&video, &overlay, &out))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                StoryError::capability(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StoryError::export(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(format!("file://{}", out.display()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/video.rs"]
mod tests;
