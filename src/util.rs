use std::{pin::pin, sync::LazyLock, time::Duration};

use axum::{body, response::Response};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use reqwest::header;

use crate::{Error, Result};

// upstream error bodies are JSON or short text; cap the read so a
// misbehaving extractor cannot balloon memory on the error path.
pub const ERROR_BODY_LIMIT: usize = 64 * 1024;

// overall per-request timeout, in seconds, read from the environment
// (EXTRACTOR_TIMEOUT_SECS). unset means no overall deadline, which is
// the right default for multi-gigabyte playlist downloads.
static EXTRACTOR_TIMEOUT: LazyLock<Option<Duration>> = LazyLock::new(|| {
  std::env::var("EXTRACTOR_TIMEOUT_SECS")
    .ok()
    .and_then(|s| s.parse::<u64>().ok())
    .map(Duration::from_secs)
});

pub fn extractor_timeout() -> Option<Duration> {
  *EXTRACTOR_TIMEOUT
}

pub fn http_client() -> Result<reqwest::Client> {
  let mut builder =
    reqwest::Client::builder().connect_timeout(Duration::from_secs(10));

  if let Some(timeout) = extractor_timeout() {
    builder = builder.timeout(timeout);
  }

  Ok(builder.build()?)
}

/// Drains `stream` into a single buffer, truncating at `limit` bytes.
pub async fn collect_bounded<S, E>(stream: S, limit: usize) -> anyhow::Result<Bytes>
where
  S: Stream<Item = Result<Bytes, E>>,
  E: Into<anyhow::Error>,
{
  let mut stream = pin!(stream);
  let mut buf = BytesMut::new();

  while let Some(chunk) = stream.next().await {
    let chunk = chunk.map_err(Into::into)?;

    if buf.len() + chunk.len() >= limit {
      buf.extend_from_slice(&chunk[..limit - buf.len()]);
      break;
    }

    buf.extend_from_slice(&chunk);
  }

  Ok(buf.freeze())
}

// forward a non-2xx extractor response verbatim: same status code,
// same body, same content type. the body read is bounded.
pub async fn upstream_error_response(
  response: reqwest::Response,
) -> Result<Response> {
  let status = response.status();
  let content_type = response.headers().get(header::CONTENT_TYPE).cloned();

  let body = collect_bounded(response.bytes_stream(), ERROR_BODY_LIMIT)
    .await
    .map_err(Error::UpstreamTransport)?;

  let mut resp = Response::builder().status(status);
  if let Some(content_type) = content_type {
    resp = resp.header(header::CONTENT_TYPE, content_type);
  }

  Ok(resp.body(body::boxed(body::Full::from(body)))?)
}
