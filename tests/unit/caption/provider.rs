use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};

use super::*;
use crate::caption::model::CaptionStyle;
use crate::config::HttpTimeouts;

async fn spawn_pipeline(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Accepts connections and never answers them.
async fn spawn_silent_pipeline() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

fn short_timeouts() -> HttpTimeouts {
    HttpTimeouts {
        request: Duration::from_millis(300),
        connect: Duration::from_millis(300),
    }
}

fn pipeline(base_url: String) -> RemotePipeline {
    RemotePipeline {
        base_url,
        pipeline_id: "zy-1".to_string(),
    }
}

#[tokio::test]
async fn mock_ignores_inputs() {
    let p = MockCaptionProvider;
    let a = p.captions(&[], &[]).await.unwrap();
    let b = p
        .captions(&["cat".to_string()], &["tweet_style".to_string()])
        .await
        .unwrap();
    assert_eq!(a, mock_captions());
    assert_eq!(a, b);
}

#[tokio::test]
async fn remote_returns_pipeline_options() {
    let app = Router::new().route(
        "/pipelines/zy-1/captions",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["pipelineId"], "zy-1");
            assert_eq!(body["tags"], serde_json::json!(["wholesome"]));
            Json(serde_json::json!({
                "options": [
                    {"style": "top_bottom", "top": "REMOTE", "bottom": "CAPTION", "alt_text": "r"}
                ]
            }))
        }),
    );
    let base = spawn_pipeline(app).await;

    let p = RemoteCaptionProvider::new(reqwest::Client::new(), pipeline(base));
    let out = p
        .captions(&["wholesome".to_string()], &["top_bottom".to_string()])
        .await
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].top, "REMOTE");
    assert_eq!(out[0].style, CaptionStyle::TopBottom);
}

#[tokio::test]
async fn remote_error_status_degrades_to_mock() {
    let app = Router::new().route(
        "/pipelines/zy-1/captions",
        post(|| async { StatusCode::BAD_GATEWAY }),
    );
    let base = spawn_pipeline(app).await;

    let p = RemoteCaptionProvider::new(reqwest::Client::new(), pipeline(base));
    assert_eq!(p.captions(&[], &[]).await.unwrap(), mock_captions());
}

#[tokio::test]
async fn remote_empty_options_degrade_to_mock() {
    let app = Router::new().route(
        "/pipelines/zy-1/captions",
        post(|| async { Json(serde_json::json!({"options": []})) }),
    );
    let base = spawn_pipeline(app).await;

    let p = RemoteCaptionProvider::new(reqwest::Client::new(), pipeline(base));
    assert_eq!(p.captions(&[], &[]).await.unwrap(), mock_captions());
}

#[tokio::test]
async fn unreachable_pipeline_degrades_to_mock() {
    let p = RemoteCaptionProvider::new(
        reqwest::Client::new(),
        pipeline("http://127.0.0.1:1".to_string()),
    );
    assert_eq!(p.captions(&[], &[]).await.unwrap(), mock_captions());
}

#[tokio::test]
async fn silent_pipeline_times_out_to_mock() {
    let base = spawn_silent_pipeline().await;
    let p = RemoteCaptionProvider::new(short_timeouts().client().unwrap(), pipeline(base));

    let out = tokio::time::timeout(Duration::from_secs(5), p.captions(&[], &[]))
        .await
        .expect("caption request should give up within the client timeout")
        .unwrap();
    assert_eq!(out, mock_captions());
}

#[test]
fn factory_picks_variant_from_config() {
    let client = reqwest::Client::new();
    assert_eq!(caption_provider_for(None, &client).name(), "mock");
    let p = pipeline("http://example.invalid".to_string());
    assert_eq!(caption_provider_for(Some(&p), &client).name(), "remote");
}
