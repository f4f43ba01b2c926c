use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::analyze::{AnalysisResult, validate_image_upload};
use crate::caption::model::CaptionRecord;
use crate::encode::gif::encode_gif;
use crate::foundation::error::MemeError;
use crate::render::frame::{AnimationRequest, SourceImage};
use crate::server::AppState;
use crate::server::error::ApiError;

/// Upper bound on `frameCount` accepted by `/api/render`.
pub const MAX_FRAME_COUNT: u32 = 120;

const MALFORMED_FORM_MESSAGE: &str = "Malformed multipart form data";

/// Identify the caller: first `x-forwarded-for` hop, then `x-real-ip`, then `anonymous`.
pub fn client_id(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    forwarded
        .or_else(real_ip)
        .unwrap_or("anonymous")
        .to_string()
}

fn enforce_rate_limit(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let client = client_id(headers);
    let now = std::time::Instant::now();
    let decision = state.limiter.check_at(&client, now);
    tracing::debug!(%client, allowed = decision.allowed, remaining = decision.remaining, "rate limit");
    decision.into_result(now)?;
    Ok(())
}

/// One received multipart field.
struct FormField {
    name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Only an exceeded body limit is reported as an oversized upload.
fn form_error(e: &MultipartError, max_bytes: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::bad_request(format!(
            "Image must be less than {}MB",
            max_bytes / (1024 * 1024)
        ))
    } else {
        ApiError::bad_request(MALFORMED_FORM_MESSAGE)
    }
}

async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
    max_bytes: usize,
) -> Result<Vec<FormField>, ApiError> {
    let mut multipart =
        multipart.map_err(|r| ApiError::bad_request(format!("Expected multipart form data: {r}")))?;

    let mut fields = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => return Err(form_error(&e, max_bytes)),
        };
        let name = field.name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            tracing::debug!(error = %e, field = %name, "multipart field read failed");
            form_error(&e, max_bytes)
        })?;
        fields.push(FormField {
            name,
            content_type,
            bytes,
        });
    }
    Ok(fields)
}

fn take_field(fields: &mut Vec<FormField>, name: &str) -> Option<FormField> {
    let pos = fields.iter().position(|f| f.name == name)?;
    Some(fields.swap_remove(pos))
}

fn take_image(fields: &mut Vec<FormField>, max_bytes: usize) -> Result<FormField, ApiError> {
    let image = take_field(fields, "image");
    validate_image_upload(
        image
            .as_ref()
            .map(|f| (f.content_type.as_deref().unwrap_or_default(), f.bytes.len())),
        max_bytes,
    )?;
    image.ok_or_else(|| ApiError::bad_request("No image file provided"))
}

fn optional_u32(fields: &mut Vec<FormField>, name: &str) -> Result<Option<u32>, ApiError> {
    let Some(field) = take_field(fields, name) else {
        return Ok(None);
    };
    std::str::from_utf8(&field.bytes)
        .ok()
        .map(str::trim)
        .and_then(|s| s.parse::<u32>().ok())
        .map(Some)
        .ok_or_else(|| ApiError::bad_request(format!("{name} must be a non-negative integer")))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    ok: bool,
    #[serde(flatten)]
    analysis: AnalysisResult,
}

/// `POST /api/analyze`
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    enforce_rate_limit(&state, &headers)?;

    let mut fields = read_form(multipart, state.max_upload_bytes).await?;
    let image = take_image(&mut fields, state.max_upload_bytes)?;
    let content_type = image.content_type.unwrap_or_default();

    let analysis = state
        .analyzer
        .analyze(&content_type, &image.bytes)
        .await
        .map_err(|e| ApiError::from_error(e, "Failed to analyze image"))?;
    tracing::debug!(analyzer = state.analyzer.name(), tags = ?analysis.tags, "image analyzed");

    Ok(Json(AnalyzeResponse { ok: true, analysis }))
}

/// Body of `POST /api/caption`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    /// Content tags from analysis.
    pub tags: Vec<String>,
    /// Style names to generate captions for.
    pub meme_candidates: Vec<String>,
}

#[derive(Serialize)]
struct CaptionResponse {
    ok: bool,
    options: Vec<CaptionRecord>,
}

/// `POST /api/caption`
pub async fn caption(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CaptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    enforce_rate_limit(&state, &headers)?;

    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(%rejection, "caption request rejected");
        ApiError::bad_request(
            "Invalid request body. Expected {tags: string[], memeCandidates: string[]}",
        )
    })?;

    let options = state
        .captions
        .captions(&req.tags, &req.meme_candidates)
        .await
        .map_err(|e| ApiError::from_error(e, "Failed to generate captions"))?;
    tracing::debug!(provider = state.captions.name(), count = options.len(), "captions generated");

    Ok(Json(CaptionResponse {
        ok: true,
        options: state.safety.sanitize_all(&options),
    }))
}

/// `POST /api/render`: multipart `image`, `caption` (JSON), optional `frameCount`/`frameDelayMs`.
pub async fn render(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    enforce_rate_limit(&state, &headers)?;

    let mut fields = read_form(multipart, state.max_upload_bytes).await?;
    let image = take_image(&mut fields, state.max_upload_bytes)?;
    let caption_field =
        take_field(&mut fields, "caption").ok_or_else(|| ApiError::bad_request("No caption provided"))?;
    let caption: CaptionRecord = serde_json::from_slice(&caption_field.bytes)
        .map_err(|_| ApiError::bad_request("Invalid caption. Expected {style, top, bottom, alt_text}"))?;

    let frame_count = optional_u32(&mut fields, "frameCount")?.unwrap_or(state.animation.frame_count);
    let frame_delay_ms =
        optional_u32(&mut fields, "frameDelayMs")?.unwrap_or(state.animation.frame_delay_ms);
    if frame_count > MAX_FRAME_COUNT {
        return Err(ApiError::bad_request(format!(
            "frameCount must be at most {MAX_FRAME_COUNT}"
        )));
    }

    let caption = state.safety.sanitize_record(&caption);
    let compositor = state.compositor.clone();
    let limits = state.render_limits;
    let gif = tokio::task::spawn_blocking(move || {
        let source = SourceImage::decode_within(&image.bytes, limits.max_image_edge)
            .map_err(|e| match e {
                MemeError::Validation(_) => e,
                _ => MemeError::validation("Could not decode image"),
            })?;
        let req = AnimationRequest::new(source, caption).with_timing(frame_count, frame_delay_ms);
        req.check_budget(limits.budget_bytes)?;
        let frames = compositor.render(&req)?;
        encode_gif(&frames)
    })
    .await
    .map_err(|e| ApiError::from_error(MemeError::Other(e.into()), "Failed to render meme"))?
    .map_err(|e| ApiError::from_error(e, "Failed to render meme"))?;

    tracing::info!(bytes = gif.len(), frame_count, "meme rendered");
    Ok(([(header::CONTENT_TYPE, "image/gif")], gif))
}

#[derive(Serialize)]
struct SharesResponse {
    ok: bool,
    shares: u64,
}

/// `POST /api/share`: forwards multipart `gif` to the webhook.
pub async fn share(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    enforce_rate_limit(&state, &headers)?;

    let Some(webhook) = state.webhook.as_ref() else {
        return Err(ApiError::bad_request("Discord webhook URL not configured").with_shares(0));
    };

    let mut fields = read_form(multipart, state.max_upload_bytes).await?;
    let gif = take_field(&mut fields, "gif").ok_or_else(|| ApiError::bad_request("No GIF file provided"))?;
    if gif.content_type.as_deref() != Some("image/gif") {
        return Err(ApiError::bad_request("File must be a GIF"));
    }

    webhook
        .post_gif(gif.bytes.to_vec())
        .await
        .map_err(|e| ApiError::from_error(e, "Failed to share to Discord").with_shares(0))?;

    Ok(Json(SharesResponse {
        ok: true,
        shares: state.shares.increment(),
    }))
}

/// `GET /api/stats`
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(SharesResponse {
        ok: true,
        shares: state.shares.get(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/server/routes.rs"]
mod tests;
