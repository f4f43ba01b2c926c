use crate::foundation::error::{MemeError, MemeResult};

pub use kurbo::{Affine, Vec2};

/// Largest edge the CPU raster backend can allocate.
pub const MAX_CANVAS_EDGE: u32 = u16::MAX as u32;

/// 0-based position of a frame within one animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameIndex(pub u32);

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas that the raster backend can draw into.
    pub fn new(width: u32, height: u32) -> MemeResult<Self> {
        if width == 0 || height == 0 {
            return Err(MemeError::invalid_input(format!(
                "image must have non-zero dimensions, got {width}x{height}"
            )));
        }
        if width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
            return Err(MemeError::invalid_input(format!(
                "image dimensions {width}x{height} exceed {MAX_CANVAS_EDGE}px"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Horizontal center in pixels.
    pub fn center_x(self) -> f64 {
        f64::from(self.width) / 2.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
