use axum::{
  headers::ContentType,
  response::IntoResponse,
  routing::{get, post},
  Router, TypedHeader,
};

mod download;
mod error;
mod extractor;
mod playlist;
mod util;

pub use error::{Error, Result};

pub const HOMEPAGE_HTML: &str = include_str!("../html/homepage.html");

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  let app = Router::new()
    .route("/", get(homepage))
    .route("/health", get(health))
    .route("/api/download", post(download::download))
    .route("/api/playlist_info", post(playlist::playlist_info));

  let addr = "0.0.0.0:8080".parse().unwrap();
  tracing::info!("listening on {addr}");

  axum::Server::bind(&addr)
    .serve(app.into_make_service())
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("failed to start server");

  Ok(())
}

async fn shutdown_signal() {
  tokio::signal::ctrl_c()
    .await
    .expect("failed to listen for ctrl-c");
}

async fn homepage() -> impl IntoResponse {
  (
    TypedHeader::<ContentType>(ContentType::html()),
    HOMEPAGE_HTML,
  )
}

async fn health() -> impl IntoResponse {
  "ok".to_owned()
}
