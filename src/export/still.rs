use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::export::{ExportContext, artifact_path};
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{StoryError, StoryResult};
use crate::platform::Snapshotter;
use crate::render::composite::encoder_pixels;

/// JPG when an image background fills the frame, PNG with alpha otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StillFormat {
    Png,
    Jpeg { quality: u8 },
}

impl StillFormat {
    pub fn mime(self) -> &'static str {
        match self {
            StillFormat::Png => "image/png",
            StillFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            StillFormat::Png => "png",
            StillFormat::Jpeg { .. } => "jpg",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StillArtifact {
    pub path: PathBuf,
    pub format: StillFormat,
    pub width: u32,
    pub height: u32,
}

impl StillArtifact {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

#[tracing::instrument(skip_all, fields(out_dir = %ctx.out_dir.display()))]
pub fn export_still(
    ctx: &ExportContext<'_>,
    snapshotter: &mut dyn Snapshotter,
) -> StoryResult<StillArtifact> {
    let format = if ctx.state.has_image_background() {
        StillFormat::Jpeg {
            quality: ctx.config.jpeg_quality,
        }
    } else {
        StillFormat::Png
    };
    let frame = ctx.capture(ctx.still_flags(), snapshotter, "still export")?;
    let path = artifact_path(ctx.out_dir, "storycard", format.extension());
    write_still(&frame, format, &path)?;
    tracing::debug!(path = %path.display(), mime = format.mime(), "still written");
    Ok(StillArtifact {
        path,
        format,
        width: frame.width,
        height: frame.height,
    })
}

/// Encode `frame` to `path`. JPEG output is flattened over black.
pub fn write_still(frame: &FrameRGBA, format: StillFormat, path: &Path) -> StoryResult<()> {
    if frame.width == 0 || frame.height == 0 {
        return Err(StoryError::export("cannot encode an empty frame"));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    match format {
        StillFormat::Png => {
            let pixels = encoder_pixels(frame, false, [0, 0, 0, 255])?;
            image::save_buffer_with_format(
                path,
                &pixels,
                frame.width,
                frame.height,
                image::ColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write png '{}'", path.display()))?;
        }
        StillFormat::Jpeg { quality } => {
            let pixels = encoder_pixels(frame, true, [0, 0, 0, 255])?;
            let rgb: Vec<u8> = pixels
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let file = File::create(path)
                .with_context(|| format!("create jpeg '{}'", path.display()))?;
            let mut writer = BufWriter::new(file);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
                .encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
                .with_context(|| format!("encode jpeg '{}'", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/still.rs"]
mod tests;
