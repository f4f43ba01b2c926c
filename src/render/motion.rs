//! Per-frame animation parameters.
//!
//! Every value here is a pure function of the frame index and the frame count, so frames can be
//! rendered in any order and still agree with each other.

use crate::foundation::core::{Affine, Canvas, FrameIndex, Vec2};

/// Scale gained across the whole sequence; the last frame sits at `1 + ZOOM_SPAN * (n-1)/n`.
pub const ZOOM_SPAN: f64 = 0.1;
/// Fraction of the sequence after which the top caption is fully typed out.
pub const REVEAL_FRACTION: f64 = 0.7;
/// Horizontal shake amplitude of the bottom caption in pixels.
pub const SHAKE_PX: f64 = 2.0;

/// Ken-Burns zoom factor: linear ramp from `1.0` at frame 0.
pub fn zoom_factor(index: FrameIndex, frame_count: u32) -> f64 {
    1.0 + (f64::from(index.0) / f64::from(frame_count)) * ZOOM_SPAN
}

/// Typing progress of the top caption in `[0, 1]`.
pub fn reveal_progress(index: FrameIndex, frame_count: u32) -> f64 {
    ((f64::from(index.0) + 1.0) / (f64::from(frame_count) * REVEAL_FRACTION)).min(1.0)
}

/// Number of leading characters of a `text_chars`-long caption visible at `index`.
pub fn visible_chars(text_chars: usize, index: FrameIndex, frame_count: u32) -> usize {
    let n = (text_chars as f64 * reveal_progress(index, frame_count)).floor() as usize;
    n.min(text_chars)
}

/// Horizontal offset of the bottom caption: `+2` on even frames, `-2` on odd frames.
pub fn bottom_jitter(index: FrameIndex) -> f64 {
    if index.0 % 2 == 0 { SHAKE_PX } else { -SHAKE_PX }
}

/// First `chars` Unicode scalar values of `text`.
pub fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Resolved motion parameters for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMotion {
    /// Frame position in the sequence.
    pub index: FrameIndex,
    /// Image scale factor.
    pub zoom: f64,
    /// Top-left of the scaled image in canvas space (non-positive once zoomed).
    pub offset: Vec2,
    /// Characters of the top caption drawn in this frame.
    pub visible_top_chars: usize,
    /// Horizontal shake of the bottom caption.
    pub bottom_jitter_px: f64,
}

impl FrameMotion {
    /// Compute the motion for frame `index` of `frame_count` over `canvas`.
    pub fn at(index: FrameIndex, frame_count: u32, canvas: Canvas, top_chars: usize) -> Self {
        let zoom = zoom_factor(index, frame_count);
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        Self {
            index,
            zoom,
            offset: Vec2::new((w - w * zoom) / 2.0, (h - h * zoom) / 2.0),
            visible_top_chars: visible_chars(top_chars, index, frame_count),
            bottom_jitter_px: bottom_jitter(index),
        }
    }

    /// Image-space to canvas-space transform: scale about the origin, then center.
    pub fn image_transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/motion.rs"]
mod tests;
