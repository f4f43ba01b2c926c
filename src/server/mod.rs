//! HTTP surface: routes, shared state, and the listener loop.

pub(crate) mod error;
pub(crate) mod hello;
pub(crate) mod ratelimit;
pub(crate) mod routes;
pub(crate) mod share;

use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::analyze::{ImageAnalyzer, image_analyzer_for};
use crate::caption::provider::{CaptionProvider, caption_provider_for};
use crate::caption::safety::SafetyFilter;
use crate::config::{AnimationDefaults, RenderLimits, ServerConfig};
use crate::foundation::error::MemeResult;
use crate::render::compositor::Compositor;
use crate::render::text::CaptionFont;
use crate::server::ratelimit::RateLimiter;
use crate::server::share::{ShareCounter, WebhookClient};

/// Extra request-body room on top of the image ceiling for the other form fields.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) shares: Arc<ShareCounter>,
    pub(crate) webhook: Option<WebhookClient>,
    pub(crate) analyzer: Arc<dyn ImageAnalyzer>,
    pub(crate) captions: Arc<dyn CaptionProvider>,
    pub(crate) safety: Arc<SafetyFilter>,
    pub(crate) compositor: Arc<Compositor>,
    pub(crate) max_upload_bytes: usize,
    pub(crate) animation: AnimationDefaults,
    pub(crate) render_limits: RenderLimits,
}

impl AppState {
    /// Wire every service from `config`, resolving the caption font and remote backends.
    pub fn from_config(config: &ServerConfig) -> MemeResult<Self> {
        let client = config.http.client()?;

        let font = CaptionFont::resolve(config.font_path.as_deref())?;
        if let Some(f) = &font {
            tracing::info!(family = f.family(), "caption font resolved");
        }

        Ok(Self {
            limiter: Arc::new(RateLimiter::new(config.rate_limit, config.rate_window)),
            shares: Arc::new(ShareCounter::default()),
            webhook: config
                .webhook_url
                .as_ref()
                .map(|url| WebhookClient::new(client.clone(), url.clone())),
            analyzer: image_analyzer_for(config.pipeline.as_ref(), &client),
            captions: caption_provider_for(config.pipeline.as_ref(), &client),
            safety: Arc::new(SafetyFilter::default()),
            compositor: Arc::new(Compositor::new(font)),
            max_upload_bytes: config.max_upload_bytes,
            animation: config.animation,
            render_limits: config.render_limits,
        })
    }

    /// Rate limiter shared by every route.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Successful shares so far.
    pub fn share_count(&self) -> u64 {
        self.shares.get()
    }
}

/// The `/api/*` router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);
    Router::new()
        .route("/api/analyze", post(routes::analyze))
        .route("/api/caption", post(routes::caption))
        .route("/api/render", post(routes::render))
        .route("/api/share", post(routes::share))
        .route("/api/stats", get(routes::stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Run the API server until ctrl-c.
pub async fn serve(config: ServerConfig) -> MemeResult<()> {
    let state = AppState::from_config(&config)?;
    let purge = state.limiter.clone().spawn_purge_task(config.purge_interval);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;
    tracing::info!(
        addr = %config.bind,
        sharing = config.webhook_url.is_some(),
        remote_pipeline = config.pipeline.is_some(),
        rate_limit = config.rate_limit,
        "meme-agent listening"
    );

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server");
    purge.abort();
    tracing::info!("meme-agent stopped");
    Ok(result?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
