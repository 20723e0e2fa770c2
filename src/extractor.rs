use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use once_cell::sync::Lazy;

const DEFAULT_EXTRACTOR_URL: &str = "http://127.0.0.1:5000";

// read once at startup; read-only afterwards.
static GLOBAL_EXTRACTOR_INSTANCE: Lazy<ExtractorInstance> = Lazy::new(|| {
  std::env::var("EXTRACTOR_URL")
    .map(ExtractorInstance::new)
    .unwrap_or_default()
});

/// Address of the media-extraction backend this service relays to.
#[derive(Clone, Debug)]
pub struct ExtractorInstance {
  base_url: String,
}

impl ExtractorInstance {
  pub fn new(base_url: String) -> Self {
    let base_url = base_url.trim_end_matches('/').to_owned();
    Self { base_url }
  }

  pub fn download_url(&self) -> String {
    format!("{}/api/download", self.base_url)
  }

  pub fn playlist_data_url(&self) -> String {
    format!("{}/api/playlist_data", self.base_url)
  }
}

impl Default for ExtractorInstance {
  fn default() -> Self {
    Self::new(DEFAULT_EXTRACTOR_URL.to_string())
  }
}

#[async_trait]
impl<S> FromRequestParts<S> for ExtractorInstance
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    _parts: &mut http::request::Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    Ok(GLOBAL_EXTRACTOR_INSTANCE.clone())
  }
}
