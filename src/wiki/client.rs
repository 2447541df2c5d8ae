//! Raw HTTP client for the published wiki content.

use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Failure to deliver a resource. The only errors the content pipeline
/// surfaces to callers; cache-internal failures never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  /// The server answered with a non-success status.
  #[error("resource unavailable: {path} (HTTP {status})")]
  Unavailable { path: String, status: u16 },

  /// The response body was not the JSON shape the resource promises.
  #[error("failed to parse {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  /// The resource path did not form a valid URL against the content root.
  #[error("invalid resource path {path}: {source}")]
  Url {
    path: String,
    #[source]
    source: url::ParseError,
  },

  /// Network-level failure (DNS, connect, TLS, body read).
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),
}

impl FetchError {
  /// HTTP status for unavailable resources, if that is what went wrong.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Unavailable { status, .. } => Some(*status),
      _ => None,
    }
  }
}

/// HTTP fetcher for the static JSON content tree.
#[derive(Clone)]
pub struct WikiClient {
  http: reqwest::Client,
  base_url: Url,
}

impl WikiClient {
  /// Create a client for the wiki served at `base_url`.
  pub fn new(base_url: &str) -> Result<Self> {
    // Relative resource paths resolve against the base, so it must end
    // with a slash.
    let normalized = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };

    let base_url = Url::parse(&normalized)
      .map_err(|e| eyre!("Invalid wiki base URL {}: {}", normalized, e))?;
    if base_url.cannot_be_a_base() {
      return Err(eyre!("Wiki base URL {} cannot carry paths", base_url));
    }

    let http = reqwest::Client::builder()
      .user_agent(concat!("zwiki/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  /// GET a resource path (e.g. `data/versions.json`) and parse the body as
  /// JSON.
  pub async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
    let url = self.base_url.join(path).map_err(|e| FetchError::Url {
      path: path.to_string(),
      source: e,
    })?;

    let response = self.http.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Unavailable {
        path: path.to_string(),
        status: status.as_u16(),
      });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Parse {
      path: path.to_string(),
      source: e,
    })
  }
}

/// Decode a cached or fetched JSON value into its typed shape.
pub fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, FetchError> {
  serde_json::from_value(value).map_err(|e| FetchError::Parse {
    path: path.to_string(),
    source: e,
  })
}
