//! Frame consumers for one rendered animation.

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::frame::Frame;

/// Shape of the animation a [`FrameSink`] is about to receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Number of frames the animation has.
    pub frame_count: u32,
}

impl SinkConfig {
    /// Reject an announcement no animation can satisfy.
    pub fn validate(&self) -> MemeResult<Canvas> {
        if self.frame_count == 0 {
            return Err(MemeError::validation("an animation needs at least one frame"));
        }
        Canvas::new(self.width, self.height)
            .map_err(|e| MemeError::validation(format!("sink dimensions: {e}")))
    }

    /// Check that `frame` is frame number `received` of this animation.
    pub fn check_next(&self, received: u32, idx: FrameIndex, frame: &Frame) -> MemeResult<()> {
        if idx.0 != received {
            return Err(MemeError::encode(format!(
                "expected frame {received}, got frame {}",
                idx.0
            )));
        }
        if idx.0 >= self.frame_count {
            return Err(MemeError::encode(format!(
                "frame {} is past the end of a {}-frame animation",
                idx.0, self.frame_count
            )));
        }
        if frame.width != self.width || frame.height != self.height {
            return Err(MemeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != frame.width as usize * frame.height as usize * 4 {
            return Err(MemeError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        if frame.delay_ms == 0 {
            return Err(MemeError::validation("frame delay must be > 0 ms"));
        }
        Ok(())
    }

    /// Check that all announced frames arrived.
    pub fn check_complete(&self, received: u32) -> MemeResult<()> {
        if received != self.frame_count {
            return Err(MemeError::encode(format!(
                "animation ended after {received} of {} frames",
                self.frame_count
            )));
        }
        Ok(())
    }
}

/// Consumer of one animation's frames.
///
/// Producers call `begin` once, push frames `0..frame_count` in order, then call `end`.
/// Sinks refuse gaps, repeats, extra frames and early ends.
pub trait FrameSink: Send {
    /// Announce the animation.
    fn begin(&mut self, cfg: SinkConfig) -> MemeResult<()>;
    /// Accept the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> MemeResult<()>;
    /// Finish the animation.
    fn end(&mut self) -> MemeResult<()>;
}

/// Keeps one animation's frames in memory, in display order.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Frame>,
    complete: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Announced animation, if `begin` was called.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames received so far; frame `i` is at position `i`.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Whether `end` accepted the animation.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Take the finished animation.
    pub fn into_frames(self) -> MemeResult<Vec<Frame>> {
        if !self.complete {
            return Err(MemeError::encode("animation is not complete"));
        }
        Ok(self.frames)
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MemeResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames = Vec::with_capacity(cfg.frame_count as usize);
        self.complete = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> MemeResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MemeError::encode("frame pushed before begin"))?;
        if self.complete {
            return Err(MemeError::encode("frame pushed after end"));
        }
        cfg.check_next(self.frames.len() as u32, idx, frame)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> MemeResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MemeError::encode("end called before begin"))?;
        cfg.check_complete(self.frames.len() as u32)?;
        self.complete = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
