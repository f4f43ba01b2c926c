//! Animated meme rendering: per-frame motion, caption shaping and CPU rasterization.

pub(crate) mod compositor;
pub(crate) mod frame;
pub(crate) mod motion;
pub(crate) mod text;
