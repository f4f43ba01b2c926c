use axum::Router;
use axum::routing::get;

/// Body returned by the hello stub.
pub const HELLO_MESSAGE: &str = "Hello from the Hackathon API!";

/// Standalone router answering `GET /` with [`HELLO_MESSAGE`].
pub fn hello_router() -> Router {
    Router::new().route("/", get(|| async { HELLO_MESSAGE }))
}

/// Serve [`hello_router`] on `listener` until shutdown.
pub async fn serve_hello(listener: tokio::net::TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "hello stub listening");
    }
    axum::serve(listener, hello_router())
        .with_graceful_shutdown(super::shutdown_signal())
        .await
}
