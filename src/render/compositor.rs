use std::sync::Arc;

use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Affine, Canvas, FrameIndex};
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::frame::{AnimationRequest, Frame, SourceImage};
use crate::render::motion::{FrameMotion, char_prefix};
use crate::render::text::{CaptionFont, CaptionShaper, ShapedLine};

/// Placement and look of the caption text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionLayout {
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Outline stroke width in pixels.
    pub stroke_px: f64,
    /// Baseline of the first top line, measured from the top edge.
    pub top_baseline_px: f64,
    /// Distance from the bottom edge to the baseline of the last bottom line.
    pub bottom_margin_px: f64,
    /// Line advance as a multiple of the font size.
    pub line_height: f64,
    /// Glyph fill color (straight RGBA8).
    pub fill_rgba: [u8; 4],
    /// Glyph outline color (straight RGBA8).
    pub stroke_rgba: [u8; 4],
}

impl Default for CaptionLayout {
    fn default() -> Self {
        Self {
            font_size_px: 36.0,
            stroke_px: 5.0,
            top_baseline_px: 50.0,
            bottom_margin_px: 30.0,
            line_height: 1.2,
            fill_rgba: [255, 255, 255, 255],
            stroke_rgba: [0, 0, 0, 255],
        }
    }
}

/// A shaped caption line and the canvas position of its baseline start.
#[derive(Clone, Debug)]
struct PlacedLine {
    line: Arc<ShapedLine>,
    origin_x: f64,
    baseline_y: f64,
}

/// Everything a worker needs to rasterize one frame.
#[derive(Clone, Debug)]
struct FramePlan {
    motion: FrameMotion,
    lines: Vec<PlacedLine>,
}

/// Renders animated meme frames: Ken-Burns zoom, typed-in top caption, shaking bottom caption.
///
/// A compositor is immutable and can be shared between threads; every call renders
/// independently.
#[derive(Clone, Debug)]
pub struct Compositor {
    font: Option<CaptionFont>,
    layout: CaptionLayout,
}

impl Compositor {
    /// Create a compositor; without a font, frames are rendered with no captions.
    pub fn new(font: Option<CaptionFont>) -> Self {
        if font.is_none() {
            tracing::warn!("no caption font available; animations will render without captions");
        }
        Self {
            font,
            layout: CaptionLayout::default(),
        }
    }

    /// Replace the caption layout.
    pub fn with_layout(mut self, layout: CaptionLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Caption font, if any.
    pub fn font(&self) -> Option<&CaptionFont> {
        self.font.as_ref()
    }

    /// Caption layout in use.
    pub fn layout(&self) -> &CaptionLayout {
        &self.layout
    }

    /// Render all frames of `req` in index order.
    ///
    /// Frames are rasterized in parallel and reassembled by index before returning.
    #[tracing::instrument(skip_all, fields(frames = req.frame_count, width = req.image.width, height = req.image.height))]
    pub fn render(&self, req: &AnimationRequest) -> MemeResult<Vec<Frame>> {
        let canvas = req.validate()?;
        let plans = self.plan_frames(req, canvas)?;
        let image = image_paint(&req.image)?;

        let rendered = plans
            .par_iter()
            .map(|plan| self.rasterize(plan, &image, canvas, req.frame_delay_ms))
            .collect::<Vec<_>>();

        let mut frames = Vec::with_capacity(rendered.len());
        for frame in rendered {
            frames.push(frame?);
        }
        tracing::debug!(frames = frames.len(), "animation rendered");
        Ok(frames)
    }

    /// Render `req` and push every frame into `sink` in index order.
    pub fn render_into(&self, req: &AnimationRequest, sink: &mut dyn FrameSink) -> MemeResult<()> {
        let frames = self.render(req)?;
        sink.begin(SinkConfig {
            width: req.image.width,
            height: req.image.height,
            frame_count: req.frame_count,
        })?;
        for (i, frame) in frames.iter().enumerate() {
            sink.push_frame(FrameIndex(i as u32), frame)?;
        }
        sink.end()
    }

    /// Render a single frame of `req`.
    pub fn render_frame(&self, req: &AnimationRequest, index: FrameIndex) -> MemeResult<Frame> {
        let canvas = req.validate()?;
        if index.0 >= req.frame_count {
            return Err(MemeError::invalid_input(format!(
                "frame {} is outside a {}-frame animation",
                index.0, req.frame_count
            )));
        }
        let mut shaper = self.shaper()?;
        let plan = self.plan_frame(req, canvas, index, shaper.as_mut());
        let image = image_paint(&req.image)?;
        self.rasterize(&plan, &image, canvas, req.frame_delay_ms)
    }

    fn shaper(&self) -> MemeResult<Option<CaptionShaper>> {
        self.font
            .as_ref()
            .map(|f| CaptionShaper::new(f, self.layout.font_size_px))
            .transpose()
    }

    fn plan_frames(&self, req: &AnimationRequest, canvas: Canvas) -> MemeResult<Vec<FramePlan>> {
        let mut shaper = self.shaper()?;
        Ok((0..req.frame_count)
            .map(|i| self.plan_frame(req, canvas, FrameIndex(i), shaper.as_mut()))
            .collect())
    }

    fn plan_frame(
        &self,
        req: &AnimationRequest,
        canvas: Canvas,
        index: FrameIndex,
        shaper: Option<&mut CaptionShaper>,
    ) -> FramePlan {
        let top_chars = req.caption.top.chars().count();
        let motion = FrameMotion::at(index, req.frame_count, canvas, top_chars);

        let Some(shaper) = shaper else {
            return FramePlan {
                motion,
                lines: Vec::new(),
            };
        };

        let line_advance = f64::from(self.layout.font_size_px) * self.layout.line_height;
        let center_x = canvas.center_x();
        let mut lines = Vec::new();

        let visible_top = char_prefix(&req.caption.top, motion.visible_top_chars);
        for (k, text) in visible_top.split('\n').enumerate() {
            let baseline_y = self.layout.top_baseline_px + k as f64 * line_advance;
            push_line(&mut lines, shaper.shape(text), center_x, baseline_y);
        }

        let bottom: Vec<&str> = req.caption.bottom.split('\n').collect();
        let last_baseline = f64::from(canvas.height) - self.layout.bottom_margin_px;
        for (k, text) in bottom.iter().enumerate() {
            let lines_below = (bottom.len() - 1 - k) as f64;
            let baseline_y = last_baseline - lines_below * line_advance;
            push_line(
                &mut lines,
                shaper.shape(text),
                center_x + motion.bottom_jitter_px,
                baseline_y,
            );
        }

        FramePlan { motion, lines }
    }

    fn rasterize(
        &self,
        plan: &FramePlan,
        image: &vello_cpu::Image,
        canvas: Canvas,
        delay_ms: u32,
    ) -> MemeResult<Frame> {
        let (w, h) = canvas_u16(canvas)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_transform(affine_to_cpu(plan.motion.image_transform()));
        ctx.set_paint(image.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(canvas.width),
            f64::from(canvas.height),
        ));

        if let Some(font) = self.font.as_ref().map(CaptionFont::raster) {
            let [sr, sg, sb, sa] = self.layout.stroke_rgba;
            let [fr, fg, fb, fa] = self.layout.fill_rgba;
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(self.layout.stroke_px));
            for placed in &plan.lines {
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                    placed.origin_x,
                    placed.baseline_y,
                )));

                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(sr, sg, sb, sa));
                ctx.glyph_run(font)
                    .font_size(placed.line.font_size)
                    .stroke_glyphs(placed.line.glyphs.clone().into_iter());

                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(fr, fg, fb, fa));
                ctx.glyph_run(font)
                    .font_size(placed.line.font_size)
                    .fill_glyphs(placed.line.glyphs.clone().into_iter());
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(Frame {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            delay_ms,
        })
    }
}

fn push_line(lines: &mut Vec<PlacedLine>, line: Arc<ShapedLine>, center_x: f64, baseline_y: f64) {
    if line.glyphs.is_empty() {
        return;
    }
    lines.push(PlacedLine {
        origin_x: center_x - f64::from(line.width) / 2.0,
        baseline_y: baseline_y - f64::from(line.baseline),
        line,
    });
}

fn canvas_u16(canvas: Canvas) -> MemeResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| MemeError::invalid_input("image width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| MemeError::invalid_input("image height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint(img: &SourceImage) -> MemeResult<vello_cpu::Image> {
    let (w, h) = canvas_u16(img.canvas()?)?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(img.width as usize * img.height as usize);
    for px in img.rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
