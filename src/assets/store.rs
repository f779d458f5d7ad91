//! Front-loaded media for a scene.
//!
//! All file IO happens in [`MediaStore::prepare_scene`]; the rasterizer only reads from the
//! store and never touches the filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::assets::decode::{PreparedImage, decode_image};
use crate::canvas::layer::MediaKind;
use crate::canvas::scene::{NodeContent, Scene};
use crate::foundation::error::{StoryError, StoryResult};

#[derive(Debug, Default)]
pub struct MediaStore {
    root: PathBuf,
    images: HashMap<String, PreparedImage>,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, uri: &str) -> Option<&PreparedImage> {
        self.images.get(uri)
    }

    /// Register an already decoded image under `uri`.
    pub fn insert(&mut self, uri: impl Into<String>, image: PreparedImage) {
        self.images.insert(uri.into(), image);
    }

    pub fn load(&mut self, uri: &str) -> StoryResult<&PreparedImage> {
        if !self.images.contains_key(uri) {
            let path = resolve_uri(&self.root, uri)?;
            let bytes = std::fs::read(&path)
                .map_err(|e| StoryError::input(format!("read '{}': {e}", path.display())))?;
            let image = decode_image(&bytes)
                .map_err(|e| StoryError::input(format!("decode '{}': {e}", path.display())))?;
            self.images.insert(uri.to_string(), image);
        }
        self.images
            .get(uri)
            .ok_or_else(|| StoryError::input(format!("image '{uri}' not loaded")))
    }

    /// Load every raster the scene references. A missing subject cutout degrades to no cutout.
    #[tracing::instrument(skip_all, fields(nodes = scene.nodes.len()))]
    pub fn prepare_scene(&mut self, scene: &Scene) -> StoryResult<()> {
        for node in &scene.nodes {
            match &node.content {
                NodeContent::Media {
                    kind: MediaKind::Image,
                    uri,
                }
                | NodeContent::Image { uri } => {
                    self.load(uri)?;
                }
                NodeContent::SubjectCutout { uri } => {
                    if let Err(err) = self.load(uri) {
                        tracing::warn!(%uri, error = %err, "subject cutout unavailable, skipping");
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Map a media uri onto a local path. Relative paths resolve against `root`.
pub fn resolve_uri(root: &Path, uri: &str) -> StoryResult<PathBuf> {
    let trimmed = uri.trim();
    if trimmed.is_empty() {
        return Err(StoryError::validation("media uri must not be empty"));
    }
    let path_str = match trimmed.strip_prefix("file://") {
        Some(rest) => rest,
        None if trimmed.contains("://") => {
            return Err(StoryError::input(format!(
                "unsupported media uri '{trimmed}'; only local files can be rendered"
            )));
        }
        None => trimmed,
    };
    let path = Path::new(path_str);
    Ok(if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
