use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::caption::model::CaptionRecord;
use crate::config::{DEFAULT_FRAME_COUNT, DEFAULT_FRAME_DELAY_MS, DEFAULT_MAX_IMAGE_EDGE};
use crate::foundation::core::Canvas;
use crate::foundation::error::{MemeError, MemeResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded source raster in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct SourceImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Decode encoded image bytes (PNG, JPEG, GIF, ...) no larger than the default edge limit.
    pub fn decode(bytes: &[u8]) -> MemeResult<Self> {
        Self::decode_within(bytes, DEFAULT_MAX_IMAGE_EDGE)
    }

    /// Decode encoded image bytes and premultiply alpha.
    ///
    /// Images wider or taller than `max_edge` are refused from their header, before any pixel
    /// buffer is allocated. Animated inputs contribute their first frame only.
    pub fn decode_within(bytes: &[u8], max_edge: u32) -> MemeResult<Self> {
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .context("sniff image format")?;
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(max_edge);
        limits.max_image_height = Some(max_edge);
        reader.limits(limits);

        let dyn_img = reader.decode().map_err(|e| match e {
            image::ImageError::Limits(_) => {
                MemeError::validation(format!("Image dimensions exceed {max_edge}px"))
            }
            other => MemeError::Other(anyhow::Error::new(other).context("decode image")),
        })?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgba8_premul = rgba.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);

        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Wrap straight-alpha RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> MemeResult<Self> {
        if rgba8.len() != width as usize * height as usize * 4 {
            return Err(MemeError::invalid_input(format!(
                "rgba8 buffer has {} bytes, expected {}",
                rgba8.len(),
                width as usize * height as usize * 4
            )));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    /// Validated canvas matching this image.
    pub fn canvas(&self) -> MemeResult<Canvas> {
        Canvas::new(self.width, self.height)
    }
}

/// One rendered animation frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// How long the frame is shown.
    pub delay_ms: u32,
}

/// Everything needed to render one animated meme.
#[derive(Clone, Debug)]
pub struct AnimationRequest {
    /// Background image.
    pub image: SourceImage,
    /// Caption drawn over the image.
    pub caption: CaptionRecord,
    /// Number of frames to render (>= 1).
    pub frame_count: u32,
    /// Display time per frame in milliseconds (> 0).
    pub frame_delay_ms: u32,
}

impl AnimationRequest {
    /// Request with the default frame count and delay.
    pub fn new(image: SourceImage, caption: CaptionRecord) -> Self {
        Self {
            image,
            caption,
            frame_count: DEFAULT_FRAME_COUNT,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
        }
    }

    /// Override frame count and delay.
    pub fn with_timing(mut self, frame_count: u32, frame_delay_ms: u32) -> Self {
        self.frame_count = frame_count;
        self.frame_delay_ms = frame_delay_ms;
        self
    }

    /// Bytes held by the full set of rendered frames (`width * height * 4 * frame_count`).
    pub fn frame_bytes(&self) -> u64 {
        u64::from(self.image.width) * u64::from(self.image.height) * 4 * u64::from(self.frame_count)
    }

    /// Refuse animations whose rendered frames would exceed `budget_bytes`.
    pub fn check_budget(&self, budget_bytes: u64) -> MemeResult<()> {
        let needed = self.frame_bytes();
        if needed > budget_bytes {
            return Err(MemeError::validation(format!(
                "Animation too large: {}x{} with {} frames needs {needed} bytes, limit is {budget_bytes}",
                self.image.width, self.image.height, self.frame_count
            )));
        }
        Ok(())
    }

    /// Reject inputs that would produce degenerate output.
    pub fn validate(&self) -> MemeResult<Canvas> {
        let canvas = self.image.canvas()?;
        if self.frame_count < 1 {
            return Err(MemeError::invalid_input("frame count must be >= 1"));
        }
        if self.frame_delay_ms == 0 {
            return Err(MemeError::invalid_input("frame delay must be > 0 ms"));
        }
        if self.image.rgba8_premul.len() != canvas.rgba8_len() {
            return Err(MemeError::invalid_input(
                "source image byte length does not match its dimensions",
            ));
        }
        Ok(canvas)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
