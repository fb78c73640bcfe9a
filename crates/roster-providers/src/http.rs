//! Shared request plumbing: client construction and status mapping.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use roster_core::{ProviderError, provider::Lookup};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

const TIMEOUT: Duration = Duration::from_secs(30);

pub fn client() -> Result<Client> { Ok(Client::builder().timeout(TIMEOUT).build()?) }

/// Validate a configured base url and strip any trailing slash.
pub fn base_url(url: &str) -> Result<String> {
  let trimmed = url.trim().trim_end_matches('/');
  if trimmed.is_empty() {
    return Err(Error::BaseUrl { url: url.to_owned(), reason: "empty" });
  }
  if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
    return Err(Error::BaseUrl { url: url.to_owned(), reason: "expected an http(s) url" });
  }
  Ok(trimmed.to_owned())
}

/// A request that never got a response. Malformed requests are our fault
/// and will not improve on retry; everything else (connect, timeout, reset)
/// is treated as transient.
pub fn transport(err: reqwest::Error) -> ProviderError {
  let message = err.to_string();
  if err.is_builder() {
    ProviderError::Fatal { status: None, message }
  } else {
    ProviderError::Transient { status: None, message }
  }
}

/// Turn a non-success response into an error, keeping the body for the log.
pub async fn unexpected(resp: Response) -> ProviderError {
  let status = resp.status().as_u16();
  let body = resp.text().await.unwrap_or_default();
  ProviderError::from_status(status, body)
}

pub async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ProviderError> {
  let body = resp.bytes().await.map_err(transport)?;
  serde_json::from_slice(&body).map_err(|e| ProviderError::Payload(e.to_string()))
}

/// 200-range decodes, 404 is a confirmed absence, anything else is an error.
pub async fn lookup<T: DeserializeOwned>(resp: Response) -> Result<Lookup<T>, ProviderError> {
  match resp.status() {
    StatusCode::NOT_FOUND => Ok(Lookup::NotFound),
    status if status.is_success() => decode(resp).await.map(Lookup::Found),
    _ => Err(unexpected(resp).await),
  }
}
