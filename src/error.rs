use axum::{
  response::{IntoResponse, Response},
  Json,
};
use reqwest::StatusCode;
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
  // the inbound request itself was malformed; never dispatched upstream.
  Client(anyhow::Error),
  // the extractor could not be reached, or dropped the connection
  // before a full response came back.
  UpstreamTransport(anyhow::Error),
  Server(anyhow::Error),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Client(err) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": err.to_string() })),
      )
        .into_response(),
      Error::UpstreamTransport(err) => {
        // technical detail stays in the log; the client only ever
        // sees the generic body.
        tracing::error!("extractor unreachable: {err:#}");
        (
          StatusCode::BAD_GATEWAY,
          Json(json!({ "error": "extractor service unavailable" })),
        )
          .into_response()
      }
      Error::Server(err) => {
        tracing::error!("internal error: {err:#}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal server error" })),
        )
          .into_response()
      }
    }
  }
}

impl<E> From<E> for Error
where
  E: Into<anyhow::Error>,
{
  fn from(err: E) -> Self {
    Error::Server(err.into())
  }
}
