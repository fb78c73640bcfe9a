//! Case-based watchlist provider.
//!
//! Subjects are registered as "entity validations"; screening results hang
//! off the validation id rather than the subject identifier.

use reqwest::{Client, RequestBuilder, StatusCode};
use roster_core::{
  ProviderError,
  identifier::Identifier,
  payload::{ScreeningPayload, WatchlistReport},
  provider::{CaseRef, CaseRegistry, Creation, Lookup, Provider, ScreeningSource},
  record::Record,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
  Result,
  http::{self, decode, lookup, transport, unexpected},
};

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistAConfig {
  pub base_url: String,
  pub token:    String,
  /// Country code sent when registering a subject.
  #[serde(default = "default_country")]
  pub country:  String,
}

fn default_country() -> String { "CL".to_owned() }

#[derive(Debug, Clone)]
pub struct WatchlistAClient {
  client:   Client,
  base_url: String,
  token:    String,
  country:  String,
}

impl WatchlistAClient {
  pub fn new(config: WatchlistAConfig) -> Result<Self> {
    Ok(Self {
      client:   http::client()?,
      base_url: http::base_url(&config.base_url)?,
      token:    config.token,
      country:  config.country,
    })
  }

  fn url(&self, path: &str) -> String { format!("{}/entity_validations{path}", self.base_url) }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    req.bearer_auth(&self.token).header("accept", "application/json")
  }
}

impl CaseRegistry for WatchlistAClient {
  /// `GET /entity_validations/by_tin/{id}`
  async fn find_case(&self, identifier: &Identifier) -> Result<Lookup<CaseRef>, ProviderError> {
    let url = self.url(&format!("/by_tin/{identifier}"));
    debug!(%identifier, %url, "looking up case");
    let resp = self.auth(self.client.get(&url)).send().await.map_err(transport)?;
    lookup(resp).await
  }

  /// `POST /entity_validations`
  async fn create_case(&self, identifier: &Identifier) -> Result<Creation, ProviderError> {
    let url = self.url("");
    let body = json!({
      "entity_validation": { "country": self.country, "tin": identifier.as_str() }
    });
    debug!(%identifier, %url, "creating case");
    let resp = self.auth(self.client.post(&url)).json(&body).send().await.map_err(transport)?;

    match resp.status() {
      StatusCode::UNPROCESSABLE_ENTITY => Ok(Creation::Rejected),
      status if status.is_success() => {
        let case: CaseRef = decode(resp).await?;
        Ok(Creation::Created(case.id))
      }
      _ => Err(unexpected(resp).await),
    }
  }
}

impl ScreeningSource for WatchlistAClient {
  fn provider(&self) -> Provider { Provider::WatchlistA }

  /// `GET /entity_validations/{case_id}/watchlists`
  async fn fetch(&self, record: &Record) -> Result<Lookup<ScreeningPayload>, ProviderError> {
    let Some(case_id) = record.case_id.as_deref() else {
      return Err(ProviderError::Fatal {
        status:  None,
        message: format!("{} has no case id", record.identifier),
      });
    };
    let url = self.url(&format!("/{case_id}/watchlists"));
    debug!(identifier = %record.identifier, %url, "fetching watchlists");
    let resp = self.auth(self.client.get(&url)).send().await.map_err(transport)?;
    let report = lookup::<WatchlistReport>(resp).await?;
    Ok(report.map(ScreeningPayload::Watchlists))
  }
}
