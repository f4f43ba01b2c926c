use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::caption::model::{CaptionRecord, mock_captions};
use crate::config::RemotePipeline;
use crate::foundation::error::{MemeError, MemeResult};

/// Source of caption candidates for an analyzed image.
///
/// Handlers only see this capability, so the mock list and a real pipeline are interchangeable.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Produce caption candidates for the given tags and style candidates.
    async fn captions(
        &self,
        tags: &[String],
        meme_candidates: &[String],
    ) -> MemeResult<Vec<CaptionRecord>>;
}

/// Returns the fixed caption list regardless of input.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockCaptionProvider;

#[async_trait]
impl CaptionProvider for MockCaptionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn captions(
        &self,
        _tags: &[String],
        _meme_candidates: &[String],
    ) -> MemeResult<Vec<CaptionRecord>> {
        Ok(mock_captions())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineCaptionRequest<'a> {
    pipeline_id: &'a str,
    tags: &'a [String],
    meme_candidates: &'a [String],
}

#[derive(Deserialize)]
struct PipelineCaptionResponse {
    options: Vec<CaptionRecord>,
}

/// Calls a remote caption pipeline and degrades to the mock list on any failure.
#[derive(Clone, Debug)]
pub struct RemoteCaptionProvider {
    client: reqwest::Client,
    pipeline: RemotePipeline,
}

impl RemoteCaptionProvider {
    /// Create a provider for `pipeline`, sharing `client`'s connection pool.
    pub fn new(client: reqwest::Client, pipeline: RemotePipeline) -> Self {
        Self { client, pipeline }
    }

    async fn fetch(
        &self,
        tags: &[String],
        meme_candidates: &[String],
    ) -> MemeResult<Vec<CaptionRecord>> {
        let url = self.pipeline.endpoint("captions");
        let body = PipelineCaptionRequest {
            pipeline_id: &self.pipeline.pipeline_id,
            tags,
            meme_candidates,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MemeError::upstream(format!(
                "caption pipeline returned {status}"
            )));
        }

        let parsed: PipelineCaptionResponse = response
            .json()
            .await
            .context("decode caption pipeline response")?;
        if parsed.options.is_empty() {
            return Err(MemeError::upstream("caption pipeline returned no options"));
        }
        Ok(parsed.options)
    }
}

#[async_trait]
impl CaptionProvider for RemoteCaptionProvider {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn captions(
        &self,
        tags: &[String],
        meme_candidates: &[String],
    ) -> MemeResult<Vec<CaptionRecord>> {
        match self.fetch(tags, meme_candidates).await {
            Ok(options) => Ok(options),
            Err(err) => {
                tracing::warn!(error = %err, "caption pipeline failed, serving mock captions");
                Ok(mock_captions())
            }
        }
    }
}

/// Pick the remote provider when a pipeline is configured, else the mock.
pub fn caption_provider_for(
    pipeline: Option<&RemotePipeline>,
    client: &reqwest::Client,
) -> Arc<dyn CaptionProvider> {
    match pipeline {
        Some(p) => Arc::new(RemoteCaptionProvider::new(client.clone(), p.clone())),
        None => {
            tracing::info!("remote pipeline not configured, using mock captions");
            Arc::new(MockCaptionProvider)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/provider.rs"]
mod tests;
