use image::codecs::gif::{GifEncoder, Repeat};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MemeError, MemeResult};
use crate::foundation::math::flatten_premul_over_bg;
use crate::render::frame::Frame;

/// Quantizer speed handed to the GIF encoder (1 = best quality, 30 = fastest).
const GIF_SPEED: i32 = 10;

/// GIF stores delays in centiseconds; round to the nearest one, never below 10 ms.
fn gif_delay(delay_ms: u32) -> image::Delay {
    let centis = (delay_ms.saturating_add(5) / 10).max(1);
    image::Delay::from_numer_denom_ms(centis * 10, 1)
}

/// Sink that encodes frames into a looping animated GIF held in memory.
pub struct GifSink {
    bg_rgb: [u8; 3],
    cfg: Option<SinkConfig>,
    pending: Vec<image::Frame>,
    bytes: Vec<u8>,
    finished: bool,
}

impl Default for GifSink {
    fn default() -> Self {
        Self::new([255, 255, 255])
    }
}

impl GifSink {
    /// Create a sink that flattens transparency over `bg_rgb`.
    pub fn new(bg_rgb: [u8; 3]) -> Self {
        Self {
            bg_rgb,
            cfg: None,
            pending: Vec::new(),
            bytes: Vec::new(),
            finished: false,
        }
    }

    /// Encoded GIF; empty until `end` succeeds.
    pub fn into_bytes(self) -> MemeResult<Vec<u8>> {
        if !self.finished {
            return Err(MemeError::encode("gif sink was not finished"));
        }
        Ok(self.bytes)
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> MemeResult<()> {
        cfg.validate()?;
        self.pending = Vec::with_capacity(cfg.frame_count as usize);
        self.bytes.clear();
        self.finished = false;
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> MemeResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MemeError::encode("gif sink not started"))?;
        cfg.check_next(self.pending.len() as u32, idx, frame)?;

        let mut rgba = vec![0u8; frame.data.len()];
        flatten_premul_over_bg(&mut rgba, &frame.data, self.bg_rgb);
        let buffer = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
            .ok_or_else(|| MemeError::encode("frame buffer does not fit its dimensions"))?;
        self.pending
            .push(image::Frame::from_parts(buffer, 0, 0, gif_delay(frame.delay_ms)));
        Ok(())
    }

    fn end(&mut self) -> MemeResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MemeError::encode("gif sink not started"))?;
        cfg.check_complete(self.pending.len() as u32)?;

        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut out, GIF_SPEED);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| MemeError::encode(format!("set gif repeat: {e}")))?;
            encoder
                .encode_frames(self.pending.drain(..))
                .map_err(|e| MemeError::encode(format!("encode gif frames: {e}")))?;
        }
        tracing::debug!(bytes = out.len(), "gif encoded");

        self.bytes = out;
        self.cfg = None;
        self.finished = true;
        Ok(())
    }
}

/// Encode `frames` (already in display order) as a looping GIF.
pub fn encode_gif(frames: &[Frame]) -> MemeResult<Vec<u8>> {
    let first = frames
        .first()
        .ok_or_else(|| MemeError::encode("gif needs at least one frame"))?;
    let mut sink = GifSink::default();
    sink.begin(SinkConfig {
        width: first.width,
        height: first.height,
        frame_count: frames.len() as u32,
    })?;
    for (i, frame) in frames.iter().enumerate() {
        sink.push_frame(FrameIndex(i as u32), frame)?;
    }
    sink.end()?;
    sink.into_bytes()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
