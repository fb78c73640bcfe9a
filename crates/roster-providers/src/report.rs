//! Credit-bureau report provider.
//!
//! Persons and corporations are separate products with separate
//! credentials. Each profile either carries a static bearer token or
//! client credentials exchanged for one on first use.

use reqwest::Client;
use roster_core::{
  ProviderError,
  identifier::{Identifier, SubjectKind},
  payload::{ContactReport, CorporationReport, PersonReport},
  provider::{Lookup, ReportSource},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{
  Error, Result,
  http::{self, decode, lookup, transport, unexpected},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
  /// Endpoint that accepts report requests.
  pub base_url:    String,
  #[serde(default)]
  pub token_url:   Option<String>,
  #[serde(default)]
  pub scope:       Option<String>,
  pub person:      ReportProfile,
  pub corporation: ReportProfile,
}

/// Credentials and product selection for one subject kind.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportProfile {
  #[serde(flatten)]
  pub auth:    ReportAuth,
  pub product: ProductData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReportAuth {
  /// A long-lived bearer token.
  Token { token: String },
  /// OAuth2 client credentials, sent as HTTP basic auth to `token_url`.
  Credentials { client_id: String, client_secret: String },
}

/// The product block sent with every report request; identifies the
/// billing account and report type. Configured in snake_case, sent in
/// camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ProductData {
  pub bill_to:       String,
  pub ship_to:       String,
  pub product_name:  String,
  pub product_orch:  String,
  #[serde(default = "default_configuration")]
  pub configuration: String,
  pub customer:      String,
  pub model:         String,
}

fn default_configuration() -> String { "Config".to_owned() }

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ReportClient {
  client:            Client,
  url:               String,
  token_url:         Option<String>,
  scope:             String,
  person:            ReportProfile,
  corporation:       ReportProfile,
  person_token:      OnceCell<String>,
  corporation_token: OnceCell<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
  #[serde(default)]
  access_token: Option<String>,
}

impl ReportClient {
  pub fn new(config: ReportConfig) -> Result<Self> {
    let uses_credentials = [&config.person, &config.corporation]
      .iter()
      .any(|p| matches!(p.auth, ReportAuth::Credentials { .. }));
    let token_url = config.token_url.as_deref().map(http::base_url).transpose()?;
    if uses_credentials && token_url.is_none() {
      return Err(Error::MissingTokenUrl);
    }

    Ok(Self {
      client: http::client()?,
      url: http::base_url(&config.base_url)?,
      token_url,
      scope: config.scope.unwrap_or_default(),
      person: config.person,
      corporation: config.corporation,
      person_token: OnceCell::new(),
      corporation_token: OnceCell::new(),
    })
  }

  fn profile(&self, kind: SubjectKind) -> (&ReportProfile, &OnceCell<String>) {
    match kind {
      SubjectKind::Person => (&self.person, &self.person_token),
      SubjectKind::Corporation => (&self.corporation, &self.corporation_token),
    }
  }

  /// The bearer token for `kind`, exchanging credentials on first use. A
  /// failed exchange is not cached.
  async fn token(&self, kind: SubjectKind) -> Result<&str, ProviderError> {
    let (profile, cell) = self.profile(kind);
    let token = cell
      .get_or_try_init(|| async {
        match &profile.auth {
          ReportAuth::Token { token } => Ok(token.clone()),
          ReportAuth::Credentials { client_id, client_secret } => {
            self.exchange(kind, client_id, client_secret).await
          }
        }
      })
      .await?;
    Ok(token.as_str())
  }

  async fn exchange(
    &self,
    kind: SubjectKind,
    client_id: &str,
    client_secret: &str,
  ) -> Result<String, ProviderError> {
    let Some(token_url) = self.token_url.as_deref() else {
      return Err(ProviderError::Fatal { status: None, message: "no token_url configured".into() });
    };
    let resp = self
      .client
      .post(token_url)
      .basic_auth(client_id, Some(client_secret))
      .form(&[("scope", self.scope.as_str()), ("grant_type", "client_credentials")])
      .send()
      .await
      .map_err(transport)?;
    if !resp.status().is_success() {
      return Err(unexpected(resp).await);
    }

    let body: TokenResponse = decode(resp).await?;
    let token = body
      .access_token
      .filter(|t| !t.is_empty())
      .ok_or_else(|| ProviderError::Payload("token response has no access_token".into()))?;
    info!(?kind, "obtained report token");
    Ok(token)
  }
}

impl ReportSource for ReportClient {
  async fn fetch_report(
    &self,
    identifier: &Identifier,
    kind: SubjectKind,
  ) -> Result<Lookup<ContactReport>, ProviderError> {
    let token = self.token(kind).await?;
    let (profile, _) = self.profile(kind);
    let body = json!({
      "applicants": {
        "primaryConsumer": {
          "personalInformation": { "chileanRut": identifier.compact() }
        }
      },
      "productData": profile.product,
    });

    debug!(%identifier, ?kind, "requesting report");
    let resp = self
      .client
      .post(&self.url)
      .bearer_auth(token)
      .json(&body)
      .send()
      .await
      .map_err(transport)?;

    Ok(match kind {
      SubjectKind::Person => lookup::<PersonReport>(resp).await?.map(ContactReport::Person),
      SubjectKind::Corporation => {
        lookup::<CorporationReport>(resp).await?.map(ContactReport::Corporation)
      }
    })
  }
}
