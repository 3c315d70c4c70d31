//! CPU rasterizer built on tiny-skia.

use crate::renderer::{Primitive, RenderContext, RenderResult, Renderer, RendererError, Segment};
use doodleboard_core::path::SerializableColor;
use kurbo::{Affine, Rect};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Rasterizes frames into a tiny-skia [`Pixmap`].
#[derive(Debug, Clone, Copy)]
pub struct PixmapRenderer {
    pub anti_alias: bool,
}

impl Default for PixmapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixmapRenderer {
    pub fn new() -> Self {
        Self { anti_alias: true }
    }

    fn paint(&self, color: SerializableColor) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = self.anti_alias;
        paint
    }

    fn draw_primitive(&self, pixmap: &mut Pixmap, primitive: &Primitive, transform: Transform) {
        match primitive {
            Primitive::Segment(segment) => {
                if let Some(path) = segment_path(segment) {
                    pixmap.fill_path(&path, &self.paint(segment.color), FillRule::Winding, transform, None);
                }
            }
            Primitive::RectOutline {
                rect,
                stroke_width,
                color,
            } => {
                let path = to_skia_rect(*rect).map(PathBuilder::from_rect);
                self.stroke(pixmap, path, *stroke_width, *color, transform);
            }
            Primitive::EllipseOutline {
                rect,
                stroke_width,
                color,
            } => {
                let path = to_skia_rect(*rect).and_then(PathBuilder::from_oval);
                self.stroke(pixmap, path, *stroke_width, *color, transform);
            }
        }
    }

    fn stroke(
        &self,
        pixmap: &mut Pixmap,
        path: Option<tiny_skia::Path>,
        width: f64,
        color: SerializableColor,
        transform: Transform,
    ) {
        let Some(path) = path else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &self.paint(color), &stroke, transform, None);
    }
}

impl Renderer for PixmapRenderer {
    type Frame = Pixmap;

    fn draw(&mut self, ctx: &RenderContext<'_>) -> RenderResult<Pixmap> {
        let width = ctx.viewport_size.width.round();
        let height = ctx.viewport_size.height.round();
        if !(width >= 1.0 && height >= 1.0 && width <= u32::MAX as f64 && height <= u32::MAX as f64) {
            return Err(RendererError::Surface(format!(
                "Invalid viewport size {}x{}",
                ctx.viewport_size.width, ctx.viewport_size.height
            )));
        }

        let mut pixmap = Pixmap::new(width as u32, height as u32).ok_or_else(|| {
            RendererError::Surface(format!("Failed to allocate {}x{} pixmap", width, height))
        })?;

        let bg = ctx.background_color.to_rgba8();
        pixmap.fill(Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        let transform = to_skia_transform(ctx.view);
        for primitive in ctx.primitives() {
            self.draw_primitive(&mut pixmap, &primitive, transform);
        }
        Ok(pixmap)
    }
}

/// Encode a pixmap as an 8-bit RGBA PNG.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, png::EncodingError> {
    // tiny-skia stores premultiplied alpha; PNG wants straight alpha.
    let rgba_data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&rgba_data)?;
    }
    Ok(png_data)
}

fn segment_path(segment: &Segment) -> Option<tiny_skia::Path> {
    let [c0, c1, c2, c3] = segment.corners();
    let mut pb = PathBuilder::new();
    pb.move_to(c0.x as f32, c0.y as f32);
    pb.line_to(c1.x as f32, c1.y as f32);
    pb.line_to(c2.x as f32, c2.y as f32);
    pb.line_to(c3.x as f32, c3.y as f32);
    pb.close();
    pb.finish()
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
}

fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}
