//! Meme Agent turns an uploaded picture into a shareable animated meme.
//!
//! The pipeline is small and mostly synchronous:
//!
//! - Tag the image ([`ImageAnalyzer`]) and suggest captions ([`CaptionProvider`])
//! - Mask unsafe words in every caption ([`SafetyFilter`])
//! - Render a short zoom/typing/shake animation ([`Compositor`]) and encode it as a GIF
//! - Serve all of it over HTTP ([`router`]) with per-client [`RateLimiter`]s and webhook sharing
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image tagging backends and upload validation.
pub mod analyze;
pub(crate) mod caption;
/// Server configuration and its command-line surface.
pub mod config;
pub(crate) mod encode;
pub(crate) mod render;
pub(crate) mod server;

pub use crate::foundation::core::{Affine, Canvas, FrameIndex, Vec2};
pub use crate::foundation::error::{MemeError, MemeResult};

pub use crate::analyze::{AnalysisResult, ImageAnalyzer, MockImageAnalyzer, RemoteImageAnalyzer};
pub use crate::caption::model::{CaptionRecord, CaptionStyle, mock_captions};
pub use crate::caption::provider::{
    CaptionProvider, MockCaptionProvider, RemoteCaptionProvider, caption_provider_for,
};
pub use crate::caption::safety::SafetyFilter;
pub use crate::config::{
    AnimationDefaults, HttpTimeouts, RemotePipeline, RenderLimits, ServeArgs, ServerConfig,
};
pub use crate::encode::gif::{GifSink, encode_gif};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::compositor::{CaptionLayout, Compositor};
pub use crate::render::frame::{AnimationRequest, Frame, SourceImage};
pub use crate::render::motion::FrameMotion;
pub use crate::render::text::{CaptionFont, CaptionShaper, ShapedLine};
pub use crate::server::error::ApiError;
pub use crate::server::hello::{HELLO_MESSAGE, hello_router, serve_hello};
pub use crate::server::ratelimit::{RateLimitDecision, RateLimiter};
pub use crate::server::routes::client_id;
pub use crate::server::share::{ShareCounter, WebhookClient};
pub use crate::server::{AppState, router, serve};
