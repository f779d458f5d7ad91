//! Collaborator contracts the editor consumes, plus simple host-side implementations.
//!
//! Hosts inject these into [`crate::session::EditorSession`]; nothing in the core reaches for
//! ambient globals.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;

use crate::activity::model::Activity;
use crate::canvas::scene::Scene;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{StoryError, StoryResult};

pub trait ActivitySource {
    fn activity(&self, id: &str) -> StoryResult<Activity>;
}

/// Produces a background-removed copy of an image and returns its uri.
pub trait SubjectExtractor {
    fn extract(&self, image_uri: &str) -> StoryResult<String>;
}

/// Overlays a transparent PNG onto a video.
pub trait VideoCompositor {
    fn is_available(&self) -> bool;
    fn compose(&self, video_uri: &str, overlay_uri: &str) -> StoryResult<String>;
}

pub trait Entitlements {
    fn is_premium(&self) -> bool;
}

/// Opaque draft blob persistence.
pub trait DraftStore {
    fn load(&self) -> StoryResult<Option<serde_json::Value>>;
    fn save(&mut self, draft: &serde_json::Value) -> StoryResult<()>;
    fn clear(&mut self) -> StoryResult<()>;
}

pub trait ShareSink {
    fn share(&mut self, path: &Path, mime: &str) -> StoryResult<()>;
}

/// Rasterizes a scene into a frame the size of `scene.size`.
pub trait Snapshotter {
    fn snapshot(&mut self, scene: &Scene) -> StoryResult<FrameRGBA>;
}

/// Shared flag checked before async results are applied.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self, what: &str) -> StoryResult<()> {
        if self.is_cancelled() {
            Err(StoryError::cancelled(what.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Activities from a JSON file holding one activity or an array of them.
#[derive(Clone, Debug)]
pub struct JsonFileActivitySource {
    path: PathBuf,
}

impl JsonFileActivitySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn all(&self) -> StoryResult<Vec<Activity>> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read activities from '{}'", self.path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let activities = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value)?,
            other => vec![serde_json::from_value(other)?],
        };
        Ok(activities)
    }
}

impl ActivitySource for JsonFileActivitySource {
    fn activity(&self, id: &str) -> StoryResult<Activity> {
        self.all()?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| StoryError::validation(format!("activity '{id}' not found")))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StaticEntitlements {
    pub premium: bool,
}

impl Entitlements for StaticEntitlements {
    fn is_premium(&self) -> bool {
        self.premium
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryDraftStore {
    pub blob: Option<serde_json::Value>,
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> StoryResult<Option<serde_json::Value>> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, draft: &serde_json::Value) -> StoryResult<()> {
        self.blob = Some(draft.clone());
        Ok(())
    }

    fn clear(&mut self) -> StoryResult<()> {
        self.blob = None;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct JsonFileDraftStore {
    path: PathBuf,
}

impl JsonFileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DraftStore for JsonFileDraftStore {
    /// Unparseable files read as "no draft".
    fn load(&self) -> StoryResult<Option<serde_json::Value>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::from(e)
                    .context(format!("read draft '{}'", self.path.display()))
                    .into());
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding unreadable draft");
                Ok(None)
            }
        }
    }

    fn save(&mut self, draft: &serde_json::Value) -> StoryResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create draft directory '{}'", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(draft)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("write draft '{}'", self.path.display()))?;
        Ok(())
    }

    fn clear(&mut self) -> StoryResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::from(e)
                .context(format!("remove draft '{}'", self.path.display()))
                .into()),
        }
    }
}

/// Records shared files instead of handing them to a platform sheet.
#[derive(Clone, Debug, Default)]
pub struct CollectingShareSink {
    pub shared: Vec<(PathBuf, String)>,
}

impl ShareSink for CollectingShareSink {
    fn share(&mut self, path: &Path, mime: &str) -> StoryResult<()> {
        if !path.is_file() {
            return Err(StoryError::export(format!(
                "nothing to share at '{}'",
                path.display()
            )));
        }
        self.shared.push((path.to_path_buf(), mime.to_string()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/platform.rs"]
mod tests;
