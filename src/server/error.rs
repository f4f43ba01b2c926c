use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::foundation::error::MemeError;

/// Public message for rejected requests over budget.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Try again later.";

/// JSON error response: `{ok: false, error}` plus `shares` on share-related failures.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    shares: Option<u64>,
    retry_after_secs: Option<u64>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    shares: Option<u64>,
}

impl ApiError {
    /// Error with an explicit status and public message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            shares: None,
            retry_after_secs: None,
        }
    }

    /// 400 with `message`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Map a library error; server-side failures are reported as `fallback` and logged.
    pub fn from_error(err: MemeError, fallback: &str) -> Self {
        match err {
            MemeError::Validation(msg) | MemeError::InvalidInput(msg) => Self::bad_request(msg),
            MemeError::RateLimited { retry_after } => Self {
                retry_after_secs: Some(retry_after.as_secs().max(1)),
                ..Self::new(StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE)
            },
            other => {
                tracing::error!(error = %other, "{fallback}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
            }
        }
    }

    /// Attach the current share count to the body.
    pub fn with_shares(mut self, shares: u64) -> Self {
        self.shares = Some(shares);
        self
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Public message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MemeError> for ApiError {
    fn from(err: MemeError) -> Self {
        Self::from_error(err, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            error: &self.message,
            shares: self.shares,
        };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/error.rs"]
mod tests;
