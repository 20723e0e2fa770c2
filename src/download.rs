use anyhow::anyhow;
use axum::{
  body::{self, StreamBody},
  response::Response,
};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{extractor::ExtractorInstance, util, Error, Result};

#[derive(Serialize, Deserialize)]
pub struct DownloadRequest {
  pub url: String,
}

/// Relays a download request to the extractor and streams the media
/// payload back to the client.
///
/// The handler makes at most one outbound call per inbound request and
/// never materializes the payload: hyper pulls chunks from the
/// extractor only as fast as the client accepts them, so memory stays
/// bounded by the chunk size. If the client disconnects mid-transfer,
/// dropping the response body drops the extractor connection with it.
#[axum::debug_handler]
pub async fn download(
  instance: ExtractorInstance,
  body: Bytes,
) -> Result<Response> {
  let request = parse_request(&body)?;

  let response = util::http_client()?
    .post(instance.download_url())
    .json(&request)
    .send()
    .await
    .map_err(|err| Error::UpstreamTransport(err.into()))?;

  if !response.status().is_success() {
    // the extractor's own error semantics are preserved: status and
    // body go back verbatim.
    return util::upstream_error_response(response).await;
  }

  let content_type = propagated_header(
    &response,
    header::CONTENT_TYPE,
    "application/octet-stream",
  );
  // an empty disposition means "no suggested filename".
  let content_disposition =
    propagated_header(&response, header::CONTENT_DISPOSITION, "");

  // a failure here arrives after the 200 status line has been sent and
  // cannot be turned into an error response anymore; the connection is
  // closed early and the client sees a truncated body.
  let stream = response.bytes_stream().inspect_err(|err| {
    tracing::warn!("extractor stream interrupted mid-transfer: {err}");
  });

  let resp = Response::builder()
    .status(StatusCode::OK)
    .header(header::CONTENT_TYPE, content_type)
    .header(header::CONTENT_DISPOSITION, content_disposition)
    .body(body::boxed(StreamBody::new(stream)))?;

  Ok(resp)
}

fn parse_request(body: &[u8]) -> Result<DownloadRequest> {
  let request: DownloadRequest = serde_json::from_slice(body)
    .map_err(|err| Error::Client(anyhow!("invalid request body: {err}")))?;

  if request.url.trim().is_empty() {
    return Err(Error::Client(anyhow!("url must not be empty")));
  }

  Ok(request)
}

fn propagated_header(
  response: &reqwest::Response,
  name: header::HeaderName,
  default: &'static str,
) -> header::HeaderValue {
  response
    .headers()
    .get(&name)
    .cloned()
    .unwrap_or_else(|| header::HeaderValue::from_static(default))
}
