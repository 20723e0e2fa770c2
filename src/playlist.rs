use anyhow::anyhow;
use axum::{response::IntoResponse, response::Response, Json};
use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{extractor::ExtractorInstance, util, Error, Result};

#[derive(Serialize, Deserialize)]
pub struct PlaylistRequest {
  pub url: String,
}

/// Relays a playlist metadata request to the extractor.
///
/// Unlike the download relay, the response here is a small JSON
/// document, so it is deserialized and re-serialized rather than
/// streamed.
#[axum::debug_handler]
pub async fn playlist_info(
  instance: ExtractorInstance,
  body: Bytes,
) -> Result<Response> {
  let request: PlaylistRequest = serde_json::from_slice(&body)
    .map_err(|err| Error::Client(anyhow!("invalid request body: {err}")))?;

  if request.url.trim().is_empty() {
    return Err(Error::Client(anyhow!("url must not be empty")));
  }

  let response = util::http_client()?
    .post(instance.playlist_data_url())
    .json(&request)
    .send()
    .await
    .map_err(|err| Error::UpstreamTransport(err.into()))?;

  if !response.status().is_success() {
    return util::upstream_error_response(response).await;
  }

  // a 2xx response that is not valid json means the extractor broke
  // its contract mid-response; treat it like any other transport
  // failure.
  let data: serde_json::Value = response
    .json()
    .await
    .map_err(|err| Error::UpstreamTransport(err.into()))?;

  Ok((StatusCode::OK, Json(data)).into_response())
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use axum::{body, routing::post, Json, Router};
  use reqwest::header;
  use serde_json::json;

  use super::*;
  use crate::download::test::{counting_upstream, read_body, spawn_upstream};

  fn request_body() -> Bytes {
    Bytes::from_static(br#"{"url":"https://www.youtube.com/playlist?list=ABC"}"#)
  }

  #[tokio::test]
  async fn passes_playlist_metadata_through() {
    let metadata = json!({
      "title": "My Playlist",
      "videos": [
        { "title": "first", "length": "3:05" },
        { "title": "second", "length": "10:41" }
      ]
    });

    let app = {
      let metadata = metadata.clone();
      Router::new().route(
        "/api/playlist_data",
        post(move || {
          let metadata = metadata.clone();
          async move { Json(metadata) }
        }),
      )
    };

    let instance = spawn_upstream(app).await;
    let resp = playlist_info(instance, request_body())
      .await
      .into_response();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
      .to_str()
      .unwrap()
      .starts_with("application/json"));

    let body: serde_json::Value =
      serde_json::from_slice(&read_body(resp).await).unwrap();
    assert_eq!(body, metadata);
  }

  #[tokio::test]
  async fn forwards_upstream_errors() {
    let app = Router::new().route(
      "/api/playlist_data",
      post(|| async {
        Response::builder()
          .status(StatusCode::NOT_FOUND)
          .header(header::CONTENT_TYPE, "application/json")
          .body(body::boxed(body::Full::from(
            r#"{"message":"playlist not found"}"#,
          )))
          .unwrap()
      }),
    );

    let instance = spawn_upstream(app).await;
    let resp = playlist_info(instance, request_body())
      .await
      .into_response();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
      read_body(resp).await,
      Bytes::from_static(br#"{"message":"playlist not found"}"#)
    );
  }

  #[tokio::test]
  async fn rejects_invalid_bodies_without_calling_upstream() {
    let calls = Arc::new(AtomicUsize::new(0));
    let instance =
      spawn_upstream(counting_upstream("/api/playlist_data", calls.clone()))
        .await;

    for body in ["nope", "{}", r#"{"url":" "}"#] {
      let resp = playlist_info(instance.clone(), Bytes::from(body))
        .await
        .into_response();
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn garbled_success_body_maps_to_bad_gateway() {
    let app = Router::new()
      .route("/api/playlist_data", post(|| async { "definitely not json" }));

    let instance = spawn_upstream(app).await;
    let resp = playlist_info(instance, request_body())
      .await
      .into_response();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
  }
}
