//! Flattened, z-sorted description of what the canvas shows.
//!
//! A [`Scene`] is rebuilt from [`EditorState`] on every change. It carries no references into
//! the state, so it can be handed to a snapshotter on another thread.

use std::collections::BTreeMap;

use crate::activity::model::Activity;
use crate::activity::stats::{StatField, format_stat, visible_stats};
use crate::canvas::editor::{EditorState, Z_BACKGROUND, Z_CHROME, Z_SUBJECT, Z_TINT, Z_WATERMARK};
use crate::canvas::layer::{LayerId, MediaKind, RouteMode};
use crate::canvas::viewport::CanvasGeometry;
use crate::foundation::core::{Affine, LayerTransform, Point, Rect, Rgba8, Size};
use crate::geometry::projection::normalize;
use crate::layout::placement;
use crate::render::text::{self, TextBlock, TextMeasure};

pub const ROUTE_PADDING: f64 = 12.0;
pub const ROUTE_STROKE: f64 = 4.0;
pub const WATERMARK_SIZE: Size = Size::new(96.0, 24.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuideAxis {
    Vertical,
    Horizontal,
    Rotation,
}

/// Guide lines currently requested by the active gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuideState {
    pub vertical: bool,
    pub horizontal: bool,
    pub rotation: bool,
}

impl GuideState {
    pub fn any(&self) -> bool {
        self.vertical || self.horizontal || self.rotation
    }
}

/// Presentation switches toggled by export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderFlags {
    /// Hide checkerboard, selection outline and guides.
    pub capture: bool,
    /// Also hide background media and the filter tint.
    pub transparent_only: bool,
    pub watermark: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeContent {
    Media { kind: MediaKind, uri: String },
    Checkerboard,
    Tint(Rgba8),
    SubjectCutout { uri: String },
    Text(TextBlock),
    Route { mode: RouteMode, points: Vec<Point>, stroke_width: f64, color: Rgba8 },
    Image { uri: String },
    SelectionOutline,
    Guide(GuideAxis),
    Watermark,
}

/// One drawable. `size` is in the node's local units; `transform` maps local units to output
/// pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub layer: Option<LayerId>,
    pub z: i32,
    pub transform: Affine,
    pub size: Size,
    pub opacity: f64,
    pub content: NodeContent,
}

impl SceneNode {
    fn full_canvas(z: i32, size: Size, content: NodeContent) -> Self {
        Self {
            layer: None,
            z,
            transform: Affine::IDENTITY,
            size,
            opacity: 1.0,
            content,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub size: Size,
    /// Sorted back to front.
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn layer_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes
            .iter()
            .filter(|n| n.layer.is_some() && !matches!(n.content, NodeContent::SelectionOutline))
    }

    pub fn node(&self, id: &LayerId) -> Option<&SceneNode> {
        self.layer_nodes().find(|n| n.layer.as_ref() == Some(id))
    }

    pub fn has_content(&self, pred: impl Fn(&NodeContent) -> bool) -> bool {
        self.nodes.iter().any(|n| pred(&n.content))
    }
}

/// Inputs that are not part of the persisted editor state.
pub struct SceneInputs<'a> {
    pub activity: &'a Activity,
    /// Geometry that stored transforms were committed in.
    pub source: CanvasGeometry,
    /// Geometry to build for (the editor canvas, or the export target).
    pub target: CanvasGeometry,
    pub flags: RenderFlags,
    pub guides: GuideState,
    /// In-flight gesture values, in `source` pixels.
    pub live: &'a BTreeMap<LayerId, LayerTransform>,
    pub measure: &'a dyn TextMeasure,
}

/// Laid-out content of one layer before placement, in logical units.
pub struct LayerContent {
    pub size: Size,
    pub opacity: f64,
    pub content: NodeContent,
}

pub fn layer_content(
    state: &EditorState,
    id: &LayerId,
    activity: &Activity,
    logical: Size,
    measure: &dyn TextMeasure,
) -> Option<LayerContent> {
    let preset = state.font_preset();
    let content = match id {
        LayerId::Meta => {
            let block = text::layout_header(activity, preset, measure);
            (block.size, 1.0, NodeContent::Text(block))
        }
        LayerId::Stats => {
            let stats = visible_stats(&state.stats_visibility, activity);
            let width = state.stats_block_width(activity);
            let block = text::layout_stats(&stats, state.template(), preset, width, measure);
            (block.size, 1.0, NodeContent::Text(block))
        }
        LayerId::Primary => {
            let field = if activity.supports_full_stats() {
                state.primary_field
            } else {
                StatField::Time
            };
            let stat = format_stat(field, activity);
            let block = text::layout_primary(&stat, preset, measure);
            (block.size, 1.0, NodeContent::Text(block))
        }
        LayerId::Route => {
            let frame = placement::route_frame(logical).size();
            let points = normalize(&activity.path_points(), frame.width, frame.height, ROUTE_PADDING);
            if points.is_empty() {
                return None;
            }
            let content = NodeContent::Route {
                mode: state.route_mode,
                points,
                stroke_width: ROUTE_STROKE,
                color: Rgba8::WHITE,
            };
            (frame, 1.0, content)
        }
        LayerId::Image(image_id) => {
            let overlay = state.overlay(image_id)?;
            let content = NodeContent::Image {
                uri: overlay.uri.clone(),
            };
            (Size::new(overlay.width, overlay.height), overlay.opacity, content)
        }
    };
    Some(LayerContent {
        size: content.0,
        opacity: content.1,
        content: content.2,
    })
}

/// Rescale a transform stored in `from` display pixels into `to` display pixels.
pub fn rescale_transform(t: LayerTransform, from: &CanvasGeometry, to: &CanvasGeometry) -> LayerTransform {
    let k = from.rescale_factor(to);
    LayerTransform {
        x: t.x * k,
        y: t.y * k,
        ..t
    }
}

#[tracing::instrument(skip_all, fields(layers = state.layer_order.len(), capture = inputs.flags.capture))]
pub fn build_scene(state: &EditorState, inputs: &SceneInputs<'_>) -> Scene {
    let target = inputs.target;
    let canvas = target.display;
    let flags = inputs.flags;
    let mut nodes = Vec::new();

    if !flags.transparent_only {
        match &state.media {
            Some(media) => nodes.push(SceneNode::full_canvas(
                Z_BACKGROUND,
                canvas,
                NodeContent::Media {
                    kind: media.kind,
                    uri: media.uri.clone(),
                },
            )),
            None if !flags.capture => {
                nodes.push(SceneNode::full_canvas(Z_BACKGROUND, canvas, NodeContent::Checkerboard));
            }
            None => {}
        }
        if let Some(tint) = state.background_filter.tint() {
            nodes.push(SceneNode::full_canvas(Z_TINT, canvas, NodeContent::Tint(tint)));
        }
    }

    if let Some(uri) = &state.subject_cutout {
        nodes.push(SceneNode::full_canvas(
            Z_SUBJECT,
            canvas,
            NodeContent::SubjectCutout { uri: uri.clone() },
        ));
    }

    let mut selected_node = None;
    for (id, z) in state.z_order() {
        if !state.is_visible(&id) {
            continue;
        }
        if id == LayerId::Route && !state.route_effectively_visible(inputs.activity) {
            continue;
        }
        let Some(content) = layer_content(state, &id, inputs.activity, target.logical, inputs.measure) else {
            continue;
        };
        let display_size = target.size_to_display(content.size);
        let transform = match inputs.live.get(&id).or_else(|| state.transforms.get(&id)) {
            Some(t) => rescale_transform(*t, &inputs.source, &target),
            None => state.default_transform(&id, inputs.activity, &target, display_size),
        };
        let affine = transform.to_affine(display_size) * Affine::scale(target.scale);
        if state.selected.as_ref() == Some(&id) {
            selected_node = Some((id.clone(), affine, content.size));
        }
        nodes.push(SceneNode {
            layer: Some(id),
            z,
            transform: affine,
            size: content.size,
            opacity: content.opacity,
            content: content.content,
        });
    }

    if !flags.capture {
        if let Some((id, transform, size)) = selected_node {
            nodes.push(SceneNode {
                layer: Some(id),
                z: Z_CHROME,
                transform,
                size,
                opacity: 1.0,
                content: NodeContent::SelectionOutline,
            });
        }
        for (on, axis) in [
            (inputs.guides.vertical, GuideAxis::Vertical),
            (inputs.guides.horizontal, GuideAxis::Horizontal),
            (inputs.guides.rotation, GuideAxis::Rotation),
        ] {
            if on {
                nodes.push(SceneNode::full_canvas(Z_CHROME + 1, canvas, NodeContent::Guide(axis)));
            }
        }
    }

    if flags.watermark {
        let logical = target.logical;
        let origin = Point::new(
            logical.width - WATERMARK_SIZE.width - 16.0,
            logical.height - WATERMARK_SIZE.height - 16.0,
        );
        nodes.push(SceneNode {
            layer: None,
            z: Z_WATERMARK,
            transform: Affine::scale(target.scale) * Affine::translate(origin.to_vec2()),
            size: WATERMARK_SIZE,
            opacity: 0.85,
            content: NodeContent::Watermark,
        });
    }

    nodes.sort_by_key(|n| n.z);
    Scene { size: canvas, nodes }
}

/// Axis-aligned bounds of a node in output pixels.
pub fn node_bounds(node: &SceneNode) -> Rect {
    node.transform
        .transform_rect_bbox(Rect::from_origin_size(Point::ORIGIN, node.size))
}

/// Display-pixel size of a layer box, as the gesture engine measures it.
pub fn measured_layer_size(node: &SceneNode, target: &CanvasGeometry) -> Size {
    target.size_to_display(node.size)
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/scene.rs"]
mod tests;
