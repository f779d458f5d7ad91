//! The single owner of editor state.
//!
//! [`EditorSession`] holds the [`EditorState`], the activity being decorated, configuration,
//! and every injected collaborator. Gesture engines talk to it only through
//! [`crate::gesture::queue`]; exports and subject extraction run through it so that transient
//! flags (busy, extracting, capturing) are always reset, whatever the outcome.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::activity::model::Activity;
use crate::canvas::editor::{EditOutcome, EditorState};
use crate::canvas::layer::{BackgroundMedia, LayerId};
use crate::canvas::scene::{
    GuideState, RenderFlags, Scene, SceneInputs, build_scene, measured_layer_size,
    rescale_transform,
};
use crate::canvas::viewport::CanvasGeometry;
use crate::draft::{Draft, sanitize};
use crate::export::{ExportContext, StillArtifact, VideoArtifact, export_still, export_video};
use crate::foundation::config::EditorConfig;
use crate::foundation::core::{LayerTransform, Size};
use crate::foundation::error::{StoryError, StoryResult};
use crate::gesture::engine::{GestureEvent, TransformEngine};
use crate::gesture::queue::{CommandReceiver, LayerCommand};
use crate::platform::{
    CancelToken, DraftStore, Entitlements, ShareSink, Snapshotter, SubjectExtractor,
    VideoCompositor,
};
use crate::render::text::TextMeasure;

mod extraction;
mod notice;

pub use extraction::ExtractionTicket;
pub use notice::Notice;

use extraction::ExtractionTracker;

/// Host-provided implementations of every platform boundary.
pub struct Collaborators {
    pub entitlements: Box<dyn Entitlements>,
    pub drafts: Box<dyn DraftStore>,
    pub share: Box<dyn ShareSink>,
    pub snapshotter: Box<dyn Snapshotter>,
    pub measure: Box<dyn TextMeasure>,
    pub compositor: Option<Box<dyn VideoCompositor>>,
    pub extractor: Option<Box<dyn SubjectExtractor>>,
}

pub struct EditorSession {
    state: EditorState,
    activity: Activity,
    config: EditorConfig,
    geometry: CanvasGeometry,
    collab: Collaborators,
    out_dir: PathBuf,
    live: BTreeMap<LayerId, LayerTransform>,
    guides: GuideState,
    interacting: Option<LayerId>,
    busy: bool,
    capturing: Option<RenderFlags>,
    extraction: ExtractionTracker,
    export_cancel: CancelToken,
    notice: Option<Notice>,
}

impl EditorSession {
    /// Start with a fresh state. Transforms are kept in logical units until a viewport is set.
    pub fn new(
        activity: Activity,
        config: EditorConfig,
        collab: Collaborators,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        let logical = config.logical_size();
        let geometry = CanvasGeometry::fit(logical, Size::ZERO, logical, 1.0);
        Self {
            state: EditorState::default(),
            activity,
            config,
            geometry,
            collab,
            out_dir: out_dir.into(),
            live: BTreeMap::new(),
            guides: GuideState::default(),
            interacting: None,
            busy: false,
            capturing: None,
            extraction: ExtractionTracker::default(),
            export_cancel: CancelToken::new(),
            notice: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn geometry(&self) -> CanvasGeometry {
        self.geometry
    }

    pub fn guides(&self) -> GuideState {
        self.guides
    }

    pub fn live_transform(&self, id: &LayerId) -> Option<LayerTransform> {
        self.live.get(id).copied()
    }

    pub fn interacting(&self) -> Option<&LayerId> {
        self.interacting.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_extracting(&self) -> bool {
        self.extraction.in_flight()
    }

    /// Flags currently engaged by an export, if one is running.
    pub fn capture_flags(&self) -> Option<RenderFlags> {
        self.capturing
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn is_premium(&self) -> bool {
        self.collab.entitlements.is_premium()
    }

    /// Clone of the token that cancels the export in progress.
    pub fn export_cancel_token(&self) -> CancelToken {
        self.export_cancel.clone()
    }

    /// Refit the canvas into a new viewport, carrying stored transforms along.
    pub fn set_viewport(&mut self, viewport: Size, chrome: Size) {
        let next = CanvasGeometry::fit(
            viewport,
            chrome,
            self.config.logical_size(),
            self.config.margin_factor,
        );
        if !next.is_ready() || next == self.geometry {
            return;
        }
        for t in self.state.transforms.values_mut() {
            *t = rescale_transform(*t, &self.geometry, &next);
        }
        for t in self.live.values_mut() {
            *t = rescale_transform(*t, &self.geometry, &next);
        }
        tracing::debug!(scale = next.scale, "canvas refit");
        self.geometry = next;
        if !self.state.transforms.is_empty() {
            self.persist();
        }
    }

    /// Run an editor operation; changed state is persisted and upsells become a notice.
    pub fn edit(
        &mut self,
        op: impl FnOnce(&mut EditorState, &Activity, bool) -> EditOutcome,
    ) -> EditOutcome {
        let premium = self.is_premium();
        let outcome = op(&mut self.state, &self.activity, premium);
        self.settle(outcome, "premium item");
        outcome
    }

    pub fn select_template(&mut self, id: &str) -> StoryResult<EditOutcome> {
        let premium = self.is_premium();
        let outcome = self.state.select_template(id, premium)?;
        self.settle(outcome, id);
        Ok(outcome)
    }

    pub fn select_font_preset(&mut self, id: &str) -> StoryResult<EditOutcome> {
        let premium = self.is_premium();
        let outcome = self.state.select_font_preset(id, premium)?;
        self.settle(outcome, id);
        Ok(outcome)
    }

    pub fn add_image_overlay(
        &mut self,
        uri: impl Into<String>,
        nominal: Size,
        name: impl Into<String>,
    ) -> StoryResult<LayerId> {
        let id = self.state.add_image_overlay(uri, nominal, name)?;
        self.persist();
        Ok(id)
    }

    /// Swap the background. Any extraction for the old media is cancelled.
    pub fn set_background(&mut self, media: Option<BackgroundMedia>) -> EditOutcome {
        let outcome = self.state.set_background(media);
        if outcome.changed() {
            self.extraction.invalidate();
        }
        self.settle(outcome, "background");
        outcome
    }

    fn settle(&mut self, outcome: EditOutcome, item: &str) {
        match outcome {
            EditOutcome::Changed => self.persist(),
            EditOutcome::Upsell => self.notice = Some(Notice::upsell(item)),
            EditOutcome::Unchanged => {}
        }
    }

    /// Apply every queued gesture command. Returns how many were handled.
    pub fn apply_commands(&mut self, rx: &CommandReceiver) -> usize {
        let commands = rx.drain();
        let n = commands.len();
        for command in commands {
            self.handle_command(command);
        }
        n
    }

    #[tracing::instrument(skip_all, fields(layer = %command.layer))]
    pub fn handle_command(&mut self, command: LayerCommand) {
        let LayerCommand { layer, event } = command;
        match event {
            GestureEvent::InteractionStarted => self.interacting = Some(layer),
            GestureEvent::Live(t) => {
                self.live.insert(layer, t);
            }
            GestureEvent::Guides {
                vertical,
                horizontal,
            } => {
                self.guides.vertical = vertical;
                self.guides.horizontal = horizontal;
            }
            GestureEvent::RotationGuide(on) => self.guides.rotation = on,
            GestureEvent::Select => {
                let outcome = self.state.select(layer);
                self.settle(outcome, "layer");
            }
            GestureEvent::Activate => {
                let premium = self.is_premium();
                let outcome = self.state.activate(&layer, &self.activity, premium);
                self.settle(outcome, "layer");
            }
            GestureEvent::Commit(t) => {
                self.live.remove(&layer);
                let outcome = self.state.commit_transform(&layer, t);
                self.settle(outcome, "layer");
            }
            GestureEvent::InteractionEnded => {
                self.live.remove(&layer);
                self.guides = GuideState::default();
                if self.interacting.as_ref() == Some(&layer) {
                    self.interacting = None;
                }
            }
        }
    }

    /// Preview scene at the current viewport, with live gesture values applied.
    pub fn scene(&self) -> Scene {
        let flags = self.capturing.unwrap_or(RenderFlags {
            watermark: self.config.watermark,
            ..RenderFlags::default()
        });
        let inputs = SceneInputs {
            activity: &self.activity,
            source: self.geometry,
            target: self.geometry,
            flags,
            guides: self.guides,
            live: &self.live,
            measure: self.collab.measure.as_ref(),
        };
        build_scene(&self.state, &inputs)
    }

    /// Engine for `id`, seeded with its current transform and measured sizes. A seed that lies
    /// outside the canvas is committed in its clamped form.
    pub fn engine_for(&mut self, id: &LayerId) -> Option<TransformEngine> {
        let scene = self.scene();
        let node = scene.node(id)?;
        let size = measured_layer_size(node, &self.geometry);
        let initial = self
            .state
            .layer_transform(id, &self.activity, &self.geometry, size);
        let mut engine = TransformEngine::new(id.clone(), self.config.gesture_limits(), initial);
        let _ = engine.set_canvas_size(self.geometry.display);
        let _ = engine.set_layer_size(size);
        if engine.transform() != initial {
            let outcome = self.state.commit_transform(id, engine.transform());
            self.settle(outcome, "layer");
        }
        Some(engine)
    }

    /// Whether `id` is the selected layer; hosts pass this in `GestureInput::Begin`.
    pub fn is_selected(&self, id: &LayerId) -> bool {
        self.state.selected.as_ref() == Some(id)
    }

    /// Write the current state to the draft store. Failures are logged, never raised.
    pub fn persist(&mut self) {
        let value = Draft::from_state(&self.state).to_value();
        if let Err(err) = self.collab.drafts.save(&value) {
            tracing::warn!(error = %err, "failed to save draft");
        }
    }

    /// Load the stored draft. Unreadable or invalid drafts are discarded.
    #[tracing::instrument(skip(self))]
    pub fn restore_draft(&mut self) -> bool {
        let blob = match self.collab.drafts.load() {
            Ok(Some(blob)) => blob,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load draft");
                return false;
            }
        };
        let Some(draft) = sanitize(&blob) else {
            tracing::debug!("stored draft failed sanitization, discarding");
            if let Err(err) = self.collab.drafts.clear() {
                tracing::warn!(error = %err, "failed to clear draft");
            }
            return false;
        };
        self.extraction.invalidate();
        self.live.clear();
        self.state = draft.into_state();
        true
    }

    /// Back to a blank editor; the stored draft is discarded.
    pub fn reset(&mut self) {
        self.extraction.invalidate();
        self.live.clear();
        self.guides = GuideState::default();
        self.interacting = None;
        self.state.reset();
        if let Err(err) = self.collab.drafts.clear() {
            tracing::warn!(error = %err, "failed to clear draft");
        }
    }

    /// Start extracting the subject from the image background.
    pub fn begin_extraction(&mut self) -> Option<ExtractionTicket> {
        if !self.state.has_image_background() {
            return None;
        }
        let uri = self.state.media.as_ref()?.uri.clone();
        Some(self.extraction.issue(uri))
    }

    /// Apply an extraction result. Stale or cancelled results are dropped; failures leave the
    /// editor without a cutout.
    pub fn finish_extraction(
        &mut self,
        ticket: &ExtractionTicket,
        result: StoryResult<String>,
    ) -> bool {
        let current = self.extraction.is_current(ticket)
            && self.state.media.as_ref().map(|m| m.uri.as_str()) == Some(ticket.image_uri.as_str());
        self.extraction.finish(ticket);
        if !current {
            tracing::debug!(generation = ticket.generation, "discarding stale extraction");
            return false;
        }
        match result {
            Ok(cutout) => self.state.set_subject_cutout(Some(cutout)).changed(),
            Err(err) => {
                tracing::warn!(error = %err, "subject extraction failed, continuing without cutout");
                false
            }
        }
    }

    /// Run the configured extractor inline.
    #[tracing::instrument(skip(self))]
    pub fn extract_subject(&mut self) -> bool {
        let Some(ticket) = self.begin_extraction() else {
            return false;
        };
        let result = match &self.collab.extractor {
            Some(extractor) => extractor.extract(&ticket.image_uri),
            None => Err(StoryError::capability("subject extraction is not available")),
        };
        self.finish_extraction(&ticket, result)
    }

    /// Flatten to PNG/JPG and share it. Errors become a notice.
    #[tracing::instrument(skip(self))]
    pub fn export_still(&mut self) -> Option<StillArtifact> {
        if self.busy {
            return None;
        }
        self.busy = true;
        let result = self.export_still_inner();
        self.capturing = None;
        self.busy = false;
        self.finish_export(result)
    }

    fn export_still_inner(&mut self) -> StoryResult<StillArtifact> {
        let Self {
            state,
            activity,
            config,
            geometry,
            collab,
            out_dir,
            capturing,
            export_cancel,
            ..
        } = self;
        let ctx = ExportContext {
            state,
            activity,
            config,
            source: *geometry,
            measure: collab.measure.as_ref(),
            cancel: export_cancel,
            out_dir,
        };
        *capturing = Some(ctx.still_flags());
        let artifact = export_still(&ctx, collab.snapshotter.as_mut())?;
        collab.share.share(&artifact.path, artifact.mime())?;
        Ok(artifact)
    }

    /// Composite the overlay layers onto the video background and share the MP4.
    #[tracing::instrument(skip(self))]
    pub fn export_video(&mut self) -> Option<VideoArtifact> {
        if self.busy {
            return None;
        }
        self.busy = true;
        let result = self.export_video_inner();
        self.capturing = None;
        self.busy = false;
        self.finish_export(result)
    }

    fn export_video_inner(&mut self) -> StoryResult<VideoArtifact> {
        let Self {
            state,
            activity,
            config,
            geometry,
            collab,
            out_dir,
            capturing,
            export_cancel,
            ..
        } = self;
        let Some(compositor) = collab.compositor.as_deref() else {
            return Err(StoryError::capability(
                "video compositing is not available on this device",
            ));
        };
        let ctx = ExportContext {
            state,
            activity,
            config,
            source: *geometry,
            measure: collab.measure.as_ref(),
            cancel: export_cancel,
            out_dir,
        };
        *capturing = Some(RenderFlags {
            capture: true,
            transparent_only: true,
            watermark: config.watermark,
        });
        let artifact = export_video(&ctx, compositor, collab.snapshotter.as_mut())?;
        collab.share.share(&artifact.path, VideoArtifact::MIME)?;
        Ok(artifact)
    }

    fn finish_export<T>(&mut self, result: StoryResult<T>) -> Option<T> {
        if self.export_cancel.is_cancelled() {
            self.export_cancel = CancelToken::new();
        }
        match result {
            Ok(artifact) => Some(artifact),
            Err(StoryError::Cancelled(what)) => {
                tracing::debug!(%what, "export cancelled");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "export failed");
                self.notice = Some(Notice::from(&err));
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/session.rs"]
mod tests;
