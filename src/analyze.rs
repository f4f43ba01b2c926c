//! Image tagging.
//!
//! There is no real vision model behind this yet: the mock returns fixed tags, and the remote
//! variant asks a configured pipeline but falls back to the mock whenever that fails.

use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RemotePipeline;
use crate::foundation::error::{MemeError, MemeResult};

/// Tags and candidate meme styles for one uploaded image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Content tags.
    pub tags: Vec<String>,
    /// Style names worth generating captions for.
    pub meme_candidates: Vec<String>,
}

impl AnalysisResult {
    /// The fixed analysis served by [`MockImageAnalyzer`].
    pub fn mock() -> Self {
        Self {
            tags: vec!["wholesome".to_string(), "event".to_string()],
            meme_candidates: vec!["top_bottom".to_string(), "tweet_style".to_string()],
        }
    }
}

/// Check an uploaded image before it is analyzed.
///
/// `upload` is `(content_type, byte_len)` of the received file part, or `None` when absent.
pub fn validate_image_upload(
    upload: Option<(&str, usize)>,
    max_bytes: usize,
) -> MemeResult<()> {
    let Some((content_type, len)) = upload else {
        return Err(MemeError::validation("No image file provided"));
    };
    if !content_type.starts_with("image/") {
        return Err(MemeError::validation("File must be an image"));
    }
    if len > max_bytes {
        return Err(MemeError::validation(format!(
            "Image must be less than {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Capability that turns image bytes into tags.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Analyze an already validated image.
    async fn analyze(&self, content_type: &str, bytes: &[u8]) -> MemeResult<AnalysisResult>;
}

/// Returns [`AnalysisResult::mock`] for every image.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockImageAnalyzer;

#[async_trait]
impl ImageAnalyzer for MockImageAnalyzer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(&self, _content_type: &str, _bytes: &[u8]) -> MemeResult<AnalysisResult> {
        Ok(AnalysisResult::mock())
    }
}

/// Posts the raw image to a remote pipeline; degrades to the mock result on failure.
#[derive(Clone, Debug)]
pub struct RemoteImageAnalyzer {
    client: reqwest::Client,
    pipeline: RemotePipeline,
}

impl RemoteImageAnalyzer {
    /// Create an analyzer for `pipeline`, sharing `client`'s connection pool.
    pub fn new(client: reqwest::Client, pipeline: RemotePipeline) -> Self {
        Self { client, pipeline }
    }

    async fn fetch(&self, content_type: &str, bytes: &[u8]) -> MemeResult<AnalysisResult> {
        let url = self.pipeline.endpoint("analyze");
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MemeError::upstream(format!(
                "analysis pipeline returned {status}"
            )));
        }
        let parsed: AnalysisResult = response
            .json()
            .await
            .context("decode analysis pipeline response")?;
        Ok(parsed)
    }
}

#[async_trait]
impl ImageAnalyzer for RemoteImageAnalyzer {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, content_type: &str, bytes: &[u8]) -> MemeResult<AnalysisResult> {
        match self.fetch(content_type, bytes).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::warn!(error = %err, "analysis pipeline failed, serving mock tags");
                Ok(AnalysisResult::mock())
            }
        }
    }
}

/// Pick the remote analyzer when a pipeline is configured, else the mock.
pub fn image_analyzer_for(
    pipeline: Option<&RemotePipeline>,
    client: &reqwest::Client,
) -> Arc<dyn ImageAnalyzer> {
    match pipeline {
        Some(p) => Arc::new(RemoteImageAnalyzer::new(client.clone(), p.clone())),
        None => Arc::new(MockImageAnalyzer),
    }
}

#[cfg(test)]
#[path = "../tests/unit/analyze.rs"]
mod tests;
