//! Share counting and webhook delivery of finished GIFs.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::foundation::error::{MemeError, MemeResult};

/// Message posted alongside every shared GIF.
pub const SHARE_MESSAGE: &str = "New meme shared from Meme Agent!";
/// File name given to the uploaded GIF.
pub const SHARE_FILE_NAME: &str = "meme.gif";

/// Number of successful shares since process start.
#[derive(Debug, Default)]
pub struct ShareCounter(AtomicU64);

impl ShareCounter {
    /// Count one successful share and return the new total.
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current total.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Posts GIFs to a chat webhook as multipart uploads.
#[derive(Clone, Debug)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// Target `url` using `client`'s connection pool.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Webhook URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Upload `gif` with [`SHARE_MESSAGE`].
    pub async fn post_gif(&self, gif: Vec<u8>) -> MemeResult<()> {
        let file = reqwest::multipart::Part::bytes(gif)
            .file_name(SHARE_FILE_NAME)
            .mime_str("image/gif")
            .context("build webhook file part")?;
        let form = reqwest::multipart::Form::new()
            .text("content", SHARE_MESSAGE)
            .part("file", file);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MemeError::upstream(format!("webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body.trim(), "webhook rejected shared gif");
            return Err(MemeError::upstream(format!("webhook returned {status}")));
        }
        tracing::info!("shared gif to webhook");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/share.rs"]
mod tests;
