use clap::Parser;

use super::*;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    serve: ServeArgs,
}

fn parse(args: &[&str]) -> ServeArgs {
    let mut argv = vec!["meme-agent"];
    argv.extend_from_slice(args);
    TestCli::parse_from(argv).serve
}

#[test]
fn pipeline_requires_both_parts() {
    assert!(RemotePipeline::from_parts(Some("http://x"), None).is_none());
    assert!(RemotePipeline::from_parts(None, Some("p")).is_none());
    assert!(RemotePipeline::from_parts(Some("  "), Some("p")).is_none());

    let p = RemotePipeline::from_parts(Some("http://x/"), Some(" p1 ")).unwrap();
    assert_eq!(p.base_url, "http://x");
    assert_eq!(p.pipeline_id, "p1");
    assert_eq!(p.endpoint("captions"), "http://x/pipelines/p1/captions");
}

#[test]
fn args_resolve_into_config() {
    let cfg = parse(&[
        "--host",
        "0.0.0.0",
        "--port",
        "8080",
        "--webhook-url",
        "https://hooks.example/abc",
        "--pipeline-url",
        "https://pipe.example",
        "--pipeline-id",
        "zy",
        "--rate-limit",
        "3",
        "--rate-window-secs",
        "1",
        "--frame-count",
        "12",
    ])
    .into_config()
    .unwrap();

    assert_eq!(cfg.bind, "0.0.0.0:8080".parse().unwrap());
    assert_eq!(cfg.webhook_url.as_deref(), Some("https://hooks.example/abc"));
    assert_eq!(cfg.pipeline.unwrap().pipeline_id, "zy");
    assert_eq!(cfg.rate_limit, 3);
    assert_eq!(cfg.rate_window, Duration::from_secs(1));
    assert_eq!(cfg.animation.frame_count, 12);
    assert_eq!(cfg.animation.frame_delay_ms, DEFAULT_FRAME_DELAY_MS);
    assert_eq!(cfg.http, HttpTimeouts::default());
    assert_eq!(cfg.render_limits, RenderLimits::default());
}

#[test]
fn render_limits_and_timeouts_are_configurable() {
    let cfg = parse(&[
        "--max-image-edge",
        "512",
        "--render-budget-bytes",
        "1000000",
        "--http-timeout-secs",
        "2",
        "--connect-timeout-secs",
        "1",
    ])
    .into_config()
    .unwrap();

    assert_eq!(cfg.render_limits.max_image_edge, 512);
    assert_eq!(cfg.render_limits.budget_bytes, 1_000_000);
    assert_eq!(cfg.http.request, Duration::from_secs(2));
    assert_eq!(cfg.http.connect, Duration::from_secs(1));
    cfg.http.client().unwrap();
}

#[test]
fn blank_webhook_counts_as_unset() {
    let cfg = parse(&["--port", "1", "--webhook-url", "   "])
        .into_config()
        .unwrap();
    assert!(cfg.webhook_url.is_none());
}

#[test]
fn zero_limits_are_rejected() {
    assert!(parse(&["--rate-limit", "0"]).into_config().is_err());
    assert!(parse(&["--rate-window-secs", "0"]).into_config().is_err());
    assert!(parse(&["--frame-count", "0"]).into_config().is_err());
    assert!(parse(&["--frame-delay-ms", "0"]).into_config().is_err());
    assert!(parse(&["--max-image-edge", "0"]).into_config().is_err());
    assert!(parse(&["--render-budget-bytes", "0"]).into_config().is_err());
    assert!(parse(&["--http-timeout-secs", "0"]).into_config().is_err());
}
