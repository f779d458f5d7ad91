//! Per-layer direct-manipulation state machine.
//!
//! One [`TransformEngine`] tracks one layer. Pan, pinch and rotate may all be active inside the
//! same continuous gesture; each update is computed from the snapshot taken at `Begin`, so
//! deltas never accumulate rounding drift.

use crate::canvas::layer::LayerId;
use crate::foundation::core::{LayerTransform, Size, Vec2, normalize_degrees};

/// Thresholds and bounds for gesture handling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureLimits {
    pub snap_px: f64,
    pub rotation_snap_deg: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub tap_max_ms: u64,
    pub tap_max_travel_px: f64,
}

impl Default for GestureLimits {
    fn default() -> Self {
        Self {
            snap_px: 8.0,
            rotation_snap_deg: 2.0,
            min_scale: 0.7,
            max_scale: 2.8,
            tap_max_ms: 180,
            tap_max_travel_px: 6.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureInput {
    /// `selected` is the owner's selection state for this layer when the touch lands.
    Begin { at_ms: u64, selected: bool },
    /// Cumulative translation since `Begin`, in display pixels.
    Pan { translation: Vec2 },
    /// Cumulative pinch ratio since `Begin`.
    Pinch { scale: f64 },
    /// Cumulative rotation since `Begin`.
    Rotate { rotation_rad: f64 },
    End { at_ms: u64 },
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    InteractionStarted,
    /// Render-time value while the gesture is in flight.
    Live(LayerTransform),
    Guides { vertical: bool, horizontal: bool },
    RotationGuide(bool),
    Select,
    Activate,
    /// End-of-gesture value for the owner to persist.
    Commit(LayerTransform),
    InteractionEnded,
}

/// Receiver of engine events.
pub trait EventSink {
    fn emit(&mut self, layer: &LayerId, event: GestureEvent);
}

impl EventSink for Vec<(LayerId, GestureEvent)> {
    fn emit(&mut self, layer: &LayerId, event: GestureEvent) {
        self.push((layer.clone(), event));
    }
}

#[derive(Clone, Copy, Debug)]
struct GestureStart {
    transform: LayerTransform,
    rotation_offset_deg: f64,
    at_ms: u64,
    was_selected: bool,
}

#[derive(Debug)]
pub struct TransformEngine {
    layer: LayerId,
    limits: GestureLimits,
    current: LayerTransform,
    static_rotation_deg: f64,
    rotation_offset_deg: f64,
    start: Option<GestureStart>,
    travel_px: f64,
    reshaped: bool,
    started: bool,
    guide_v: bool,
    guide_h: bool,
    rotation_guide: bool,
    layer_size: Size,
    canvas_size: Size,
}

impl TransformEngine {
    pub fn new(layer: LayerId, limits: GestureLimits, initial: LayerTransform) -> Self {
        Self {
            layer,
            limits,
            current: initial,
            static_rotation_deg: initial.rotation_deg,
            rotation_offset_deg: 0.0,
            start: None,
            travel_px: 0.0,
            reshaped: false,
            started: false,
            guide_v: false,
            guide_h: false,
            rotation_guide: false,
            layer_size: Size::ZERO,
            canvas_size: Size::ZERO,
        }
    }

    pub fn layer(&self) -> &LayerId {
        &self.layer
    }

    pub fn transform(&self) -> LayerTransform {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    /// Adopt a new persisted transform. Ignored mid-gesture. Returns the re-clamped value when
    /// clamping moved it.
    pub fn sync(&mut self, initial: LayerTransform) -> Option<LayerTransform> {
        if self.is_active() || !initial.is_finite() {
            return None;
        }
        self.current = initial;
        self.static_rotation_deg = initial.rotation_deg;
        self.rotation_offset_deg = 0.0;
        self.reclamp(initial)
    }

    pub fn set_canvas_size(&mut self, size: Size) -> Option<LayerTransform> {
        self.canvas_size = size;
        self.reclamp(self.current)
    }

    pub fn set_layer_size(&mut self, size: Size) -> Option<LayerTransform> {
        self.layer_size = size;
        self.reclamp(self.current)
    }

    fn reclamp(&mut self, before: LayerTransform) -> Option<LayerTransform> {
        if self.is_active() {
            return None;
        }
        self.clamp();
        (self.current != before).then_some(self.current)
    }

    fn sizes_known(&self) -> bool {
        self.layer_size.width > 0.0
            && self.layer_size.height > 0.0
            && self.canvas_size.width > 0.0
            && self.canvas_size.height > 0.0
    }

    /// Keep the layer centre inside the canvas on each axis.
    fn clamp(&mut self) {
        if !self.sizes_known() {
            return;
        }
        let (lw, lh) = (self.layer_size.width, self.layer_size.height);
        let (cw, ch) = (self.canvas_size.width, self.canvas_size.height);
        self.current.x = self.current.x.clamp(-lw * 0.5, cw - lw * 0.5);
        self.current.y = self.current.y.clamp(-lh * 0.5, ch - lh * 0.5);
    }

    /// Pull each axis onto the canvas centre when within `snap_px`; returns `(vertical,
    /// horizontal)` guide state.
    fn snap(&mut self) -> (bool, bool) {
        if !self.sizes_known() {
            return (false, false);
        }
        let half_w = self.layer_size.width * 0.5;
        let half_h = self.layer_size.height * 0.5;
        let cx = self.canvas_size.width * 0.5;
        let cy = self.canvas_size.height * 0.5;
        let v = (self.current.x + half_w - cx).abs() <= self.limits.snap_px;
        let h = (self.current.y + half_h - cy).abs() <= self.limits.snap_px;
        if v {
            self.current.x = cx - half_w;
        }
        if h {
            self.current.y = cy - half_h;
        }
        (v, h)
    }

    pub fn handle(&mut self, input: GestureInput, sink: &mut dyn EventSink) {
        match input {
            GestureInput::Begin { at_ms, selected } => {
                self.begin(at_ms, selected);
            }
            GestureInput::Pan { translation } => {
                let start = self.ensure_start();
                if !(translation.x.is_finite() && translation.y.is_finite()) {
                    return;
                }
                self.mark_started(sink);
                self.travel_px = self.travel_px.max(translation.hypot());
                self.current.x = start.transform.x + translation.x;
                self.current.y = start.transform.y + translation.y;
                let (v, h) = self.snap();
                self.clamp();
                self.update_guides(v, h, sink);
                self.emit_live(sink);
            }
            GestureInput::Pinch { scale } => {
                let start = self.ensure_start();
                if !scale.is_finite() || scale <= 0.0 {
                    return;
                }
                self.mark_started(sink);
                if (scale - 1.0).abs() > f64::EPSILON {
                    self.reshaped = true;
                }
                self.current.scale =
                    (start.transform.scale * scale).clamp(self.limits.min_scale, self.limits.max_scale);
                self.emit_live(sink);
            }
            GestureInput::Rotate { rotation_rad } => {
                let start = self.ensure_start();
                if !rotation_rad.is_finite() {
                    return;
                }
                self.mark_started(sink);
                if rotation_rad != 0.0 {
                    self.reshaped = true;
                }
                self.rotation_offset_deg = start.rotation_offset_deg + rotation_rad.to_degrees();
                let total = normalize_degrees(self.static_rotation_deg + self.rotation_offset_deg);
                let snapped = total.abs() <= self.limits.rotation_snap_deg;
                if snapped {
                    self.rotation_offset_deg = -self.static_rotation_deg;
                }
                self.current.rotation_deg = self.static_rotation_deg + self.rotation_offset_deg;
                if snapped != self.rotation_guide {
                    self.rotation_guide = snapped;
                    sink.emit(&self.layer, GestureEvent::RotationGuide(snapped));
                }
                self.emit_live(sink);
            }
            GestureInput::End { at_ms } => {
                let Some(start) = self.start else {
                    return;
                };
                let duration = at_ms.saturating_sub(start.at_ms);
                let is_tap = duration <= self.limits.tap_max_ms
                    && self.travel_px <= self.limits.tap_max_travel_px
                    && !self.reshaped;
                if is_tap {
                    self.finish_tap(start, sink);
                } else {
                    self.finish(sink);
                }
            }
            GestureInput::Cancel => {
                if self.start.is_some() {
                    self.finish(sink);
                }
            }
        }
    }

    fn begin(&mut self, at_ms: u64, selected: bool) -> GestureStart {
        let start = GestureStart {
            transform: self.current,
            rotation_offset_deg: self.rotation_offset_deg,
            at_ms,
            was_selected: selected,
        };
        self.start = Some(start);
        self.travel_px = 0.0;
        self.reshaped = false;
        self.started = false;
        start
    }

    /// Updates without a `Begin` open an implicit gesture that can never be a tap.
    fn ensure_start(&mut self) -> GestureStart {
        if let Some(start) = self.start {
            return start;
        }
        let start = self.begin(0, false);
        self.reshaped = true;
        start
    }

    fn mark_started(&mut self, sink: &mut dyn EventSink) {
        if !self.started {
            self.started = true;
            sink.emit(&self.layer, GestureEvent::InteractionStarted);
        }
    }

    fn emit_live(&self, sink: &mut dyn EventSink) {
        sink.emit(&self.layer, GestureEvent::Live(self.current));
    }

    fn update_guides(&mut self, v: bool, h: bool, sink: &mut dyn EventSink) {
        if v != self.guide_v || h != self.guide_h {
            self.guide_v = v;
            self.guide_h = h;
            sink.emit(
                &self.layer,
                GestureEvent::Guides {
                    vertical: v,
                    horizontal: h,
                },
            );
        }
    }

    fn clear_guides(&mut self, sink: &mut dyn EventSink) {
        self.update_guides(false, false, sink);
        if self.rotation_guide {
            self.rotation_guide = false;
            sink.emit(&self.layer, GestureEvent::RotationGuide(false));
        }
    }

    fn finish(&mut self, sink: &mut dyn EventSink) {
        self.clamp();
        self.static_rotation_deg =
            normalize_degrees(self.static_rotation_deg + self.rotation_offset_deg);
        self.rotation_offset_deg = 0.0;
        self.current.rotation_deg = self.static_rotation_deg;
        sink.emit(&self.layer, GestureEvent::Commit(self.current));
        self.clear_guides(sink);
        sink.emit(&self.layer, GestureEvent::InteractionEnded);
        self.start = None;
        self.started = false;
    }

    /// A tap leaves the layer where it was and commits nothing.
    fn finish_tap(&mut self, start: GestureStart, sink: &mut dyn EventSink) {
        self.current = start.transform;
        self.rotation_offset_deg = start.rotation_offset_deg;
        self.clear_guides(sink);
        sink.emit(&self.layer, GestureEvent::Select);
        if start.was_selected {
            sink.emit(&self.layer, GestureEvent::Activate);
        }
        if self.started {
            sink.emit(&self.layer, GestureEvent::InteractionEnded);
        }
        self.start = None;
        self.started = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gesture/engine.rs"]
mod tests;
