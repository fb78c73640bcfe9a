//! Identifier-keyed AML registry provider.

use reqwest::Client;
use roster_core::{
  ProviderError,
  payload::{AmlReport, ScreeningPayload},
  provider::{Lookup, Provider, ScreeningSource},
  record::Record,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
  Result,
  http::{self, lookup, transport},
};

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistBConfig {
  pub base_url: String,
  pub api_key:  String,
}

#[derive(Debug, Clone)]
pub struct WatchlistBClient {
  client:   Client,
  base_url: String,
  api_key:  String,
}

impl WatchlistBClient {
  pub fn new(config: WatchlistBConfig) -> Result<Self> {
    Ok(Self {
      client:   http::client()?,
      base_url: http::base_url(&config.base_url)?,
      api_key:  config.api_key,
    })
  }
}

impl ScreeningSource for WatchlistBClient {
  fn provider(&self) -> Provider { Provider::WatchlistB }

  /// `GET /getAMLResult?rut={compact identifier}`
  async fn fetch(&self, record: &Record) -> Result<Lookup<ScreeningPayload>, ProviderError> {
    let url = format!("{}/getAMLResult", self.base_url);
    let rut = record.identifier.compact();
    debug!(identifier = %record.identifier, %url, "fetching AML result");
    let resp = self
      .client
      .get(&url)
      .query(&[("rut", rut.as_str())])
      .header("authorization", self.api_key.as_str())
      .send()
      .await
      .map_err(transport)?;
    let report = lookup::<AmlReport>(resp).await?;
    Ok(report.map(ScreeningPayload::Aml))
  }
}

#[cfg(test)]
mod tests {
  use roster_core::identifier::Identifier;
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
  };

  use super::*;

  fn record() -> Record { Record::new(Identifier::parse("17.640.242-3").unwrap()) }

  async fn client(server: &MockServer) -> WatchlistBClient {
    WatchlistBClient::new(WatchlistBConfig { base_url: server.uri(), api_key: "k3y".into() })
      .unwrap()
  }

  #[tokio::test]
  async fn queries_by_compact_identifier_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/getAMLResult"))
      .and(query_param("rut", "176402423"))
      .and(header("authorization", "k3y"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "status": "OK",
        "results": {
          "pepResults": [{ "nombreCompleto": "Jane Doe", "categoriaPep": "PEP" }],
          "djResults": null
        }
      })))
      .expect(1)
      .mount(&server)
      .await;

    let payload = client(&server).await.fetch(&record()).await.unwrap();

    let Lookup::Found(ScreeningPayload::Aml(report)) = payload else {
      panic!("unexpected payload {payload:?}");
    };
    assert_eq!(report.results.pep.len(), 1);
    assert!(report.results.declarative.is_empty());
  }

  #[tokio::test]
  async fn not_found_and_server_error_are_distinguished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(404))
      .up_to_n_times(1)
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let c = client(&server).await;
    assert_eq!(c.fetch(&record()).await.unwrap(), Lookup::NotFound);
    assert!(c.fetch(&record()).await.unwrap_err().is_transient());
  }
}
