//! CPU rasterization of a [`Scene`] with `vello_cpu`.

use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::assets::decode::{PreparedImage, parse_svg};
use crate::assets::fonts::{FontBook, TextBrushRgba8};
use crate::assets::store::MediaStore;
use crate::canvas::layer::{MediaKind, RouteMode};
use crate::canvas::scene::{GuideAxis, NodeContent, Scene, SceneNode};
use crate::foundation::core::{Affine, BezPath, FrameRGBA, Point, Rect, Rgba8, Size, Vec2};
use crate::foundation::error::{StoryError, StoryResult};
use crate::geometry::projection::route_path;
use crate::platform::Snapshotter;
use crate::render::svg::{rasterize_svg_to_premul_rgba8, svg_raster_params};
use crate::render::text::TextBlock;

const WATERMARK_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="24" viewBox="0 0 96 24">
  <rect width="96" height="24" rx="12" fill="#000000" fill-opacity="0.35"/>
  <path d="M12 16 L20 8 L28 14 L36 6" stroke="#ffffff" stroke-width="2.5" fill="none" stroke-linecap="round" stroke-linejoin="round"/>
  <rect x="44" y="10" width="40" height="4" rx="2" fill="#ffffff"/>
</svg>"##;

const CHECKER_CELL: f64 = 12.0;
const CHECKER_LIGHT: Rgba8 = Rgba8::new(250, 250, 250, 255);
const CHECKER_DARK: Rgba8 = Rgba8::new(222, 222, 222, 255);
const VIDEO_PLACEHOLDER: Rgba8 = Rgba8::new(24, 24, 28, 255);
const GUIDE_COLOR: Rgba8 = Rgba8::new(255, 214, 0, 255);
const ROTATION_GUIDE_COLOR: Rgba8 = Rgba8::new(0, 214, 255, 255);
const ROUTE_BACKDROP: Rgba8 = Rgba8::new(0, 0, 0, 110);

/// [`Snapshotter`] that draws scenes on the CPU.
///
/// Media is front-loaded into the [`MediaStore`] before drawing starts.
pub struct CpuSnapshotter {
    fonts: FontBook,
    media: MediaStore,
    image_cache: HashMap<String, (vello_cpu::Image, f64, f64)>,
    watermark_cache: HashMap<(u32, u32), vello_cpu::Image>,
}

impl CpuSnapshotter {
    pub fn new(fonts: FontBook, media: MediaStore) -> Self {
        if fonts.is_empty() {
            tracing::warn!("no fonts loaded; text layers will not be drawn");
        }
        Self {
            fonts,
            media,
            image_cache: HashMap::new(),
            watermark_cache: HashMap::new(),
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn media_mut(&mut self) -> &mut MediaStore {
        &mut self.media
    }

    fn image_paint_for(&mut self, uri: &str) -> StoryResult<Option<(vello_cpu::Image, f64, f64)>> {
        if let Some(paint) = self.image_cache.get(uri) {
            return Ok(Some(paint.clone()));
        }
        let Some(prepared) = self.media.get(uri) else {
            return Ok(None);
        };
        let paint = (
            image_paint(prepared)?,
            f64::from(prepared.width),
            f64::from(prepared.height),
        );
        self.image_cache.insert(uri.to_string(), paint.clone());
        Ok(Some(paint))
    }

    fn watermark_paint_for(&mut self, transform: Affine) -> StoryResult<(vello_cpu::Image, f64, f64, Affine)> {
        let tree = parse_svg(WATERMARK_SVG)?;
        let (w, h, adjust) = svg_raster_params(&tree, transform)?;
        if let Some(paint) = self.watermark_cache.get(&(w, h)) {
            return Ok((paint.clone(), f64::from(w), f64::from(h), adjust));
        }
        let premul = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
        let paint = image_paint(&PreparedImage {
            width: w,
            height: h,
            rgba8_premul: Arc::new(premul),
        })?;
        self.watermark_cache.insert((w, h), paint.clone());
        Ok((paint, f64::from(w), f64::from(h), adjust))
    }

    fn draw_node(&mut self, ctx: &mut vello_cpu::RenderContext, node: &SceneNode, canvas: Size) -> StoryResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let layered = node.opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(node.opacity.clamp(0.0, 1.0) as f32);
        }

        match &node.content {
            NodeContent::Media { kind: MediaKind::Image, uri } | NodeContent::SubjectCutout { uri } => {
                if let Some((paint, w, h)) = self.image_paint_for(uri)? {
                    ctx.set_transform(affine_to_cpu(node.transform * cover_fit(Size::new(w, h), node.size)));
                    ctx.set_paint(paint);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                }
            }
            NodeContent::Media { kind: MediaKind::Video, uri } => {
                tracing::debug!(%uri, "video background drawn as placeholder");
                fill_rect(ctx, node.transform, Rect::from_origin_size(Point::ORIGIN, node.size), VIDEO_PLACEHOLDER);
            }
            NodeContent::Checkerboard => draw_checkerboard(ctx, node.size),
            NodeContent::Tint(color) => {
                fill_rect(ctx, node.transform, Rect::from_origin_size(Point::ORIGIN, node.size), *color);
            }
            NodeContent::Text(block) => self.draw_text(ctx, node.transform, block),
            NodeContent::Route {
                mode,
                points,
                stroke_width,
                color,
            } => {
                if *mode == RouteMode::Map {
                    let backdrop = kurbo::RoundedRect::from_rect(
                        Rect::from_origin_size(Point::ORIGIN, node.size),
                        16.0,
                    )
                    .to_path(0.1);
                    fill_path(ctx, node.transform, &backdrop, ROUTE_BACKDROP);
                }
                let path = route_path(points);
                if !path.elements().is_empty() {
                    stroke_path(ctx, node.transform, &path, *stroke_width, *color);
                }
                if let Some(first) = points.first() {
                    let dot = kurbo::Circle::new(*first, stroke_width * 1.25).to_path(0.1);
                    fill_path(ctx, node.transform, &dot, *color);
                }
            }
            NodeContent::Image { uri } => {
                if let Some((paint, w, h)) = self.image_paint_for(uri)? {
                    let fit = Affine::scale_non_uniform(node.size.width / w, node.size.height / h);
                    ctx.set_transform(affine_to_cpu(node.transform * fit));
                    ctx.set_paint(paint);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                }
            }
            NodeContent::SelectionOutline => {
                let outline = Rect::from_origin_size(Point::ORIGIN, node.size).inflate(4.0, 4.0);
                stroke_path(ctx, node.transform, &outline.to_path(0.1), 1.5, Rgba8::WHITE);
            }
            NodeContent::Guide(axis) => {
                let (line, color) = guide_line(*axis, canvas);
                stroke_path(ctx, node.transform, &line, 1.0, color);
            }
            NodeContent::Watermark => {
                let (paint, w, h, adjust) = self.watermark_paint_for(node.transform)?;
                ctx.set_transform(affine_to_cpu(adjust));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            }
        }

        if layered {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn draw_text(&self, ctx: &mut vello_cpu::RenderContext, transform: Affine, block: &TextBlock) {
        if let Some(style) = block.backdrop {
            let shape = kurbo::RoundedRect::from_rect(
                Rect::from_origin_size(Point::ORIGIN, block.size),
                style.radius,
            )
            .to_path(0.1);
            if !style.fill.is_transparent() {
                fill_path(ctx, transform, &shape, style.fill);
            }
            if style.stroke_width > 0.0 && !style.stroke.is_transparent() {
                stroke_path(ctx, transform, &shape, style.stroke_width, style.stroke);
            }
        }

        for run in &block.runs {
            let brush = TextBrushRgba8 {
                r: run.color.r,
                g: run.color.g,
                b: run.color.b,
                a: run.color.a,
            };
            let (layout, font) = match self.fonts.layout_line(&run.text, block.family, run.font_size as f32, brush) {
                Ok(shaped) => shaped,
                Err(err) => {
                    tracing::debug!(text = %run.text, error = %err, "text run not drawn");
                    continue;
                }
            };
            ctx.set_transform(affine_to_cpu(transform * Affine::translate(run.origin.to_vec2())));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                        continue;
                    };
                    let brush = glyph_run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(brush.r, brush.g, brush.b, brush.a));
                    let glyphs = glyph_run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font.data)
                        .font_size(glyph_run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
    }
}

impl Snapshotter for CpuSnapshotter {
    #[tracing::instrument(skip_all, fields(width = scene.size.width, height = scene.size.height))]
    fn snapshot(&mut self, scene: &Scene) -> StoryResult<FrameRGBA> {
        let width = to_u16(scene.size.width, "width")?;
        let height = to_u16(scene.size.height, "height")?;

        self.media.prepare_scene(scene)?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        for node in &scene.nodes {
            self.draw_node(&mut ctx, node, scene.size)?;
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: u32::from(width),
            height: u32::from(height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn to_u16(v: f64, what: &str) -> StoryResult<u16> {
    let px = v.round();
    if !px.is_finite() || px < 1.0 || px > f64::from(u16::MAX) {
        return Err(StoryError::validation(format!("scene {what} {v} is not a valid pixel size")));
    }
    Ok(px as u16)
}

/// Scale-to-cover `content` into `frame`, centred.
fn cover_fit(content: Size, frame: Size) -> Affine {
    if content.width <= 0.0 || content.height <= 0.0 {
        return Affine::IDENTITY;
    }
    let s = (frame.width / content.width).max(frame.height / content.height);
    let offset = Vec2::new(
        (frame.width - content.width * s) * 0.5,
        (frame.height - content.height * s) * 0.5,
    );
    Affine::translate(offset) * Affine::scale(s)
}

fn guide_line(axis: GuideAxis, canvas: Size) -> (BezPath, Rgba8) {
    let mut line = BezPath::new();
    match axis {
        GuideAxis::Vertical => {
            line.move_to((canvas.width * 0.5, 0.0));
            line.line_to((canvas.width * 0.5, canvas.height));
            (line, GUIDE_COLOR)
        }
        GuideAxis::Horizontal => {
            line.move_to((0.0, canvas.height * 0.5));
            line.line_to((canvas.width, canvas.height * 0.5));
            (line, GUIDE_COLOR)
        }
        GuideAxis::Rotation => {
            line.move_to((canvas.width * 0.2, canvas.height * 0.5));
            line.line_to((canvas.width * 0.8, canvas.height * 0.5));
            (line, ROTATION_GUIDE_COLOR)
        }
    }
}

fn draw_checkerboard(ctx: &mut vello_cpu::RenderContext, size: Size) {
    fill_rect(ctx, Affine::IDENTITY, Rect::from_origin_size(Point::ORIGIN, size), CHECKER_LIGHT);
    ctx.set_paint(color_to_cpu(CHECKER_DARK));
    let cols = (size.width / CHECKER_CELL).ceil() as u32;
    let rows = (size.height / CHECKER_CELL).ceil() as u32;
    for row in 0..rows {
        for col in (row % 2..cols).step_by(2) {
            let x = f64::from(col) * CHECKER_CELL;
            let y = f64::from(row) * CHECKER_CELL;
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x, y, x + CHECKER_CELL, y + CHECKER_CELL));
        }
    }
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, transform: Affine, rect: Rect, color: Rgba8) {
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
}

fn fill_path(ctx: &mut vello_cpu::RenderContext, transform: Affine, path: &BezPath, color: Rgba8) {
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn stroke_path(ctx: &mut vello_cpu::RenderContext, transform: Affine, path: &BezPath, width: f64, color: Rgba8) {
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(color_to_cpu(color));
    ctx.set_stroke(
        vello_cpu::kurbo::Stroke::new(width)
            .with_join(vello_cpu::kurbo::Join::Round)
            .with_caps(vello_cpu::kurbo::Cap::Round),
    );
    ctx.stroke_path(&bezpath_to_cpu(path));
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_paint(img: &PreparedImage) -> StoryResult<vello_cpu::Image> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| StoryError::validation("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| StoryError::validation("image height exceeds u16"))?;
    if img.rgba8_premul.len() != img.width as usize * img.height as usize * 4 {
        return Err(StoryError::validation("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = img
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
