//! Runtime configuration.
//!
//! Every knob is a `clap` argument; the deployment-specific ones also read an environment variable.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context as _;

use crate::foundation::error::{MemeError, MemeResult};

/// Default upload ceiling for source images (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Default requests allowed per client per window.
pub const DEFAULT_RATE_LIMIT: u32 = 60;
/// Default rate-limit window.
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(5 * 60);
/// Default cadence for dropping expired rate-limit windows.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);
/// Default number of frames per animation.
pub const DEFAULT_FRAME_COUNT: u32 = 8;
/// Default display time of each frame.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 200;
/// Default ceiling on a whole outbound HTTP exchange (remote pipeline, webhook).
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);
/// Default ceiling on establishing an outbound connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default largest accepted source image edge in pixels.
pub const DEFAULT_MAX_IMAGE_EDGE: u32 = 4096;
/// Default ceiling on decoded frame memory for one render (`width * height * 4 * frames`).
pub const DEFAULT_RENDER_BUDGET_BYTES: u64 = 512 * 1024 * 1024;

/// A remote analysis/caption backend identified by base URL and pipeline id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemotePipeline {
    /// Base URL, e.g. `https://pipelines.example.com`.
    pub base_url: String,
    /// Pipeline identifier appended to request paths.
    pub pipeline_id: String,
}

impl RemotePipeline {
    /// Build a pipeline only when both parts are present and non-blank.
    pub fn from_parts(base_url: Option<&str>, pipeline_id: Option<&str>) -> Option<Self> {
        let base_url = base_url.map(str::trim).filter(|s| !s.is_empty())?;
        let pipeline_id = pipeline_id.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            pipeline_id: pipeline_id.to_string(),
        })
    }

    /// URL of `operation` on this pipeline.
    pub fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/pipelines/{}/{operation}",
            self.base_url.trim_end_matches('/'),
            self.pipeline_id
        )
    }
}

/// Outbound HTTP client bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Whole-request timeout.
    pub request: Duration,
    /// Connection establishment timeout.
    pub connect: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            request: DEFAULT_HTTP_TIMEOUT,
            connect: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl HttpTimeouts {
    /// A `reqwest` client that gives up after these bounds.
    pub fn client(&self) -> MemeResult<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("meme-agent/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(self.connect)
            .timeout(self.request)
            .build()
            .context("build http client")?;
        Ok(client)
    }
}

/// Limits applied to `/api/render` before any pixels are allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderLimits {
    /// Largest accepted source width or height.
    pub max_image_edge: u32,
    /// Largest `width * height * 4 * frame_count` a single render may hold.
    pub budget_bytes: u64,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_image_edge: DEFAULT_MAX_IMAGE_EDGE,
            budget_bytes: DEFAULT_RENDER_BUDGET_BYTES,
        }
    }
}

/// Frame count and delay used when a render request does not specify them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationDefaults {
    /// Frames per animation.
    pub frame_count: u32,
    /// Per-frame display time in milliseconds.
    pub frame_delay_ms: u32,
}

impl Default for AnimationDefaults {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
        }
    }
}

/// Resolved server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Chat webhook receiving shared GIFs; sharing is disabled when unset.
    pub webhook_url: Option<String>,
    /// Remote analysis/caption pipeline; mocks are used when unset.
    pub pipeline: Option<RemotePipeline>,
    /// Requests allowed per client per window.
    pub rate_limit: u32,
    /// Rate-limit window length.
    pub rate_window: Duration,
    /// Cadence of the expired-window purge task.
    pub purge_interval: Duration,
    /// Upload ceiling for source images.
    pub max_upload_bytes: usize,
    /// Caption font file; a system font is looked up when unset.
    pub font_path: Option<PathBuf>,
    /// Defaults for `/api/render`.
    pub animation: AnimationDefaults,
    /// Pixel limits for `/api/render`.
    pub render_limits: RenderLimits,
    /// Bounds for calls to the remote pipeline and the webhook.
    pub http: HttpTimeouts,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            webhook_url: None,
            pipeline: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: DEFAULT_RATE_WINDOW,
            purge_interval: DEFAULT_PURGE_INTERVAL,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            font_path: None,
            animation: AnimationDefaults::default(),
            render_limits: RenderLimits::default(),
            http: HttpTimeouts::default(),
        }
    }
}

/// Command-line and environment surface for `meme-agent serve`.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen host.
    #[arg(long, env = "MEME_AGENT_HOST", default_value = "127.0.0.1")]
    pub host: std::net::IpAddr,

    /// Listen port.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Chat webhook URL receiving shared GIFs.
    #[arg(long, env = "DISCORD_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Base URL of the remote analysis/caption service.
    #[arg(long, env = "CORESPEED_URL")]
    pub pipeline_url: Option<String>,

    /// Pipeline identifier on the remote service.
    #[arg(long, env = "ZYPHER_PIPELINE_ID")]
    pub pipeline_id: Option<String>,

    /// Requests allowed per client per window.
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT)]
    pub rate_limit: u32,

    /// Rate-limit window in seconds.
    #[arg(long, default_value_t = DEFAULT_RATE_WINDOW.as_secs())]
    pub rate_window_secs: u64,

    /// Seconds between purges of expired rate-limit windows.
    #[arg(long, default_value_t = DEFAULT_PURGE_INTERVAL.as_secs())]
    pub purge_interval_secs: u64,

    /// Maximum accepted source image size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Caption font file (TTF/OTF); defaults to a system Impact or bold sans-serif.
    #[arg(long, env = "MEME_FONT_PATH")]
    pub font: Option<PathBuf>,

    /// Default frames per rendered animation.
    #[arg(long, default_value_t = DEFAULT_FRAME_COUNT)]
    pub frame_count: u32,

    /// Default per-frame delay in milliseconds.
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS)]
    pub frame_delay_ms: u32,

    /// Largest accepted source image width or height in pixels.
    #[arg(long, default_value_t = DEFAULT_MAX_IMAGE_EDGE)]
    pub max_image_edge: u32,

    /// Largest decoded frame memory per render, in bytes.
    #[arg(long, default_value_t = DEFAULT_RENDER_BUDGET_BYTES)]
    pub render_budget_bytes: u64,

    /// Seconds before an outbound request (pipeline, webhook) is abandoned.
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    pub http_timeout_secs: u64,

    /// Seconds allowed to connect to an outbound host.
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs())]
    pub connect_timeout_secs: u64,
}

impl ServeArgs {
    /// Validate and resolve into a [`ServerConfig`].
    pub fn into_config(self) -> MemeResult<ServerConfig> {
        if self.rate_limit == 0 {
            return Err(MemeError::validation("rate limit must be >= 1"));
        }
        if self.rate_window_secs == 0 {
            return Err(MemeError::validation("rate window must be >= 1s"));
        }
        if self.purge_interval_secs == 0 {
            return Err(MemeError::validation("purge interval must be >= 1s"));
        }
        if self.frame_count == 0 || self.frame_delay_ms == 0 {
            return Err(MemeError::validation(
                "frame count and frame delay must be >= 1",
            ));
        }

        if self.max_image_edge == 0 || self.render_budget_bytes == 0 {
            return Err(MemeError::validation(
                "max image edge and render budget must be >= 1",
            ));
        }
        if self.http_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(MemeError::validation("http timeouts must be >= 1s"));
        }

        let webhook_url = self
            .webhook_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(ServerConfig {
            bind: SocketAddr::new(self.host, self.port),
            webhook_url,
            pipeline: RemotePipeline::from_parts(
                self.pipeline_url.as_deref(),
                self.pipeline_id.as_deref(),
            ),
            rate_limit: self.rate_limit,
            rate_window: Duration::from_secs(self.rate_window_secs),
            purge_interval: Duration::from_secs(self.purge_interval_secs),
            max_upload_bytes: self.max_upload_bytes,
            font_path: self.font,
            animation: AnimationDefaults {
                frame_count: self.frame_count,
                frame_delay_ms: self.frame_delay_ms,
            },
            render_limits: RenderLimits {
                max_image_edge: self.max_image_edge,
                budget_bytes: self.render_budget_bytes,
            },
            http: HttpTimeouts {
                request: Duration::from_secs(self.http_timeout_secs),
                connect: Duration::from_secs(self.connect_timeout_secs),
            },
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
