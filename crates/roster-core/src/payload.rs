//! Typed provider payloads.
//!
//! Every field a provider may omit is an explicit slot with a default, and a
//! JSON `null` decodes to that same default. Payloads are validated once
//! here, at the parsing boundary, so classification never has to re-check
//! for missing keys.

use serde::{Deserialize, Deserializer};

/// Decode `null` (or a missing key, with `#[serde(default)]`) as
/// `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A screening payload from either watchlist provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreeningPayload {
  Watchlists(WatchlistReport),
  Aml(AmlReport),
}

// ─── Watchlist A ─────────────────────────────────────────────────────────────

/// The watchlists attached to one entity validation (case).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WatchlistReport {
  #[serde(default, deserialize_with = "null_as_default")]
  pub watchlists: Vec<Watchlist>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Watchlist {
  #[serde(default)]
  pub id:                   Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub total_hits:           u64,
  /// Number of hits against blacklists proper; any positive value is a
  /// watchlist hit for the subject.
  #[serde(default, deserialize_with = "null_as_default")]
  pub total_blacklist_hits: u64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub total_matches:        u64,
  #[serde(default)]
  pub risk_level:           Option<String>,
  #[serde(default)]
  pub watchlistable_name:   Option<String>,
  #[serde(default)]
  pub source:               Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub hits:                 Vec<Hit>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Hit {
  #[serde(default)]
  pub id:           Option<String>,
  #[serde(default)]
  pub full_name:    Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub score:        f64,
  #[serde(default)]
  pub risk_level:   Option<String>,
  #[serde(default)]
  pub hit_type:     Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub list_matches: Vec<ListMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListMatch {
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub source:   Option<String>,
  #[serde(default)]
  pub listing:  Option<String>,
  #[serde(default)]
  pub program:  Option<String>,
  #[serde(default)]
  pub remarks:  Option<String>,
  #[serde(default)]
  pub country:  Option<String>,
}

impl ListMatch {
  /// A match is PEP-related when its category or program mentions `PEP`.
  pub fn mentions_pep(&self) -> bool {
    [&self.category, &self.program]
      .into_iter()
      .flatten()
      .any(|s| s.contains("PEP"))
  }

  pub fn mentions_sanctions(&self) -> bool {
    self
      .category
      .as_deref()
      .is_some_and(|c| c.to_ascii_lowercase().contains("sanction"))
  }
}

// ─── Watchlist B ─────────────────────────────────────────────────────────────

/// Envelope of the AML result endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AmlReport {
  #[serde(default)]
  pub status:  Option<String>,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub results: AmlResults,
}

/// One list per registry the provider searched. An empty list means no
/// match in that registry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AmlResults {
  #[serde(rename = "pepResults", default, deserialize_with = "null_as_default")]
  pub pep:                    Vec<RegistryEntry>,
  #[serde(rename = "pepHResults", default, deserialize_with = "null_as_default")]
  pub pep_historical:         Vec<RegistryEntry>,
  #[serde(rename = "pepCResults", default, deserialize_with = "null_as_default")]
  pub pep_candidate:          Vec<RegistryEntry>,
  /// Public officials.
  #[serde(rename = "fpResults", default, deserialize_with = "null_as_default")]
  pub public_official:        Vec<RegistryEntry>,
  #[serde(rename = "pjudResults", default, deserialize_with = "null_as_default")]
  pub judicial:               Vec<JudicialEntry>,
  #[serde(rename = "personResults", default, deserialize_with = "null_as_default")]
  pub person:                 Vec<RegistryEntry>,
  /// Declarative (affidavit) results, themselves split by sub-registry.
  #[serde(rename = "djResults", default, deserialize_with = "null_as_default")]
  pub declarative:            DeclarativeResults,
  #[serde(rename = "negativeResults", default, deserialize_with = "null_as_default")]
  pub negative:               Vec<RegistryEntry>,
  #[serde(rename = "vipResults", default, deserialize_with = "null_as_default")]
  pub vip:                    Vec<RegistryEntry>,
  #[serde(rename = "pepRelacionados", default, deserialize_with = "null_as_default")]
  pub pep_related:            Vec<RegistryEntry>,
  #[serde(rename = "pepHRelacionados", default, deserialize_with = "null_as_default")]
  pub pep_historical_related: Vec<RegistryEntry>,
  #[serde(default)]
  pub rut:                    Option<String>,
  #[serde(default)]
  pub name:                   Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeclarativeResults {
  #[serde(rename = "wlResults", default, deserialize_with = "null_as_default")]
  pub watchlist:     Vec<RegistryEntry>,
  /// Adverse-media entries.
  #[serde(rename = "ameResults", default, deserialize_with = "null_as_default")]
  pub adverse_media: Vec<RegistryEntry>,
  /// State-owned ("social") entities.
  #[serde(rename = "socResults", default, deserialize_with = "null_as_default")]
  pub state_owned:   Vec<RegistryEntry>,
}

impl DeclarativeResults {
  pub fn is_empty(&self) -> bool {
    self.watchlist.is_empty() && self.adverse_media.is_empty() && self.state_owned.is_empty()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RegistryEntry {
  #[serde(default)]
  pub id:          Option<String>,
  #[serde(default)]
  pub rut:         Option<String>,
  #[serde(rename = "nombreCompleto", default)]
  pub full_name:   Option<String>,
  #[serde(rename = "categoriaPep", default)]
  pub category:    Option<String>,
  #[serde(rename = "cargo", default)]
  pub position:    Option<String>,
  #[serde(rename = "institucionPublica", default)]
  pub institution: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JudicialEntry {
  #[serde(default)]
  pub id:      Option<String>,
  #[serde(default)]
  pub rut:     Option<String>,
  #[serde(rename = "nombre", default)]
  pub name:    Option<String>,
  #[serde(rename = "delito", default)]
  pub offence: Option<String>,
  #[serde(rename = "estado", default)]
  pub status:  Option<String>,
}

// ─── Credit-bureau report ────────────────────────────────────────────────────

/// A credit-bureau report. Persons and corporations use different products
/// with unrelated response shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactReport {
  Person(PersonReport),
  Corporation(CorporationReport),
}

impl ContactReport {
  /// Postal addresses, one display line each.
  pub fn addresses(&self) -> Vec<String> {
    match self {
      Self::Person(r) => r
        .platinum
        .envelope
        .response
        .behavior
        .contactability
        .addresses
        .entries
        .iter()
        .map(|a| {
          format!(
            "{} {}, {}, {}, {}",
            a.street, a.number, a.communes, a.city, a.region
          )
        })
        .collect(),
      Self::Corporation(r) => r
        .data
        .commercial_data
        .behavior
        .contactability
        .contacts_data_detail
        .addresses
        .commercial_addresses
        .iter()
        .map(|a| {
          format!(
            "{} - {} {}, {}, {}, {}",
            a.address_type, a.street, a.number, a.communes, a.city, a.region
          )
        })
        .collect(),
    }
  }

  pub fn phones(&self) -> Vec<String> {
    match self {
      Self::Person(r) => r
        .platinum
        .envelope
        .response
        .behavior
        .contactability
        .telephones
        .entries
        .iter()
        .filter_map(|t| match &t.telephone {
          serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
          serde_json::Value::Number(n) => Some(n.to_string()),
          _ => None,
        })
        .collect(),
      Self::Corporation(r) => r
        .data
        .commercial_data
        .behavior
        .contactability
        .contacts_data_detail
        .telephones
        .reference_data
        .iter()
        .map(|t| {
          format!(
            "{}: +{}-{}-{}",
            t.referency_desc_sub_type, t.cod_country, t.code_area, t.referency_desc
          )
        })
        .collect(),
    }
  }

  /// The first email on file, if any.
  pub fn email(&self) -> Option<String> {
    let email = match self {
      Self::Person(r) => r.platinum.envelope.response.behavior.other.email.clone(),
      Self::Corporation(r) => r
        .data
        .commercial_data
        .behavior
        .contactability
        .contacts_data_detail
        .emails
        .reference_data
        .first()
        .map(|e| e.referency_desc.clone())
        .unwrap_or_default(),
    };
    (!email.trim().is_empty()).then_some(email)
  }
}

// Person product ("platinum"). Keys are PascalCase below the envelope.

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonReport {
  #[serde(rename = "platinum360", default, deserialize_with = "null_as_default")]
  pub platinum: PlatinumEnvelope,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlatinumEnvelope {
  #[serde(
    rename = "getInformePlatinum360Response",
    default,
    deserialize_with = "null_as_default"
  )]
  pub envelope: PlatinumResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlatinumResponse {
  #[serde(default, deserialize_with = "null_as_default")]
  pub response: PlatinumBody,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatinumBody {
  #[serde(default, deserialize_with = "null_as_default")]
  pub behavior: PersonBehavior,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonBehavior {
  #[serde(default, deserialize_with = "null_as_default")]
  pub contactability: PersonContactability,
  #[serde(default, deserialize_with = "null_as_default")]
  pub other:          PersonOther,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonContactability {
  #[serde(default, deserialize_with = "null_as_default")]
  pub addresses:  PersonAddresses,
  #[serde(default, deserialize_with = "null_as_default")]
  pub telephones: PersonTelephones,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonAddresses {
  #[serde(rename = "AddressesType", default, deserialize_with = "null_as_default")]
  pub entries: Vec<PersonAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonAddress {
  #[serde(default, deserialize_with = "null_as_default")]
  pub street:   String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub number:   String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub communes: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub city:     String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub region:   String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonTelephones {
  #[serde(rename = "TelephonesType", default, deserialize_with = "null_as_default")]
  pub entries: Vec<PersonTelephone>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonTelephone {
  /// Sent as either a number or a string.
  #[serde(rename = "Telephone", default)]
  pub telephone: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonOther {
  #[serde(rename = "Email", default, deserialize_with = "null_as_default")]
  pub email: String,
}

// Corporation product. Keys are camelCase throughout.

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CorporationReport {
  #[serde(default, deserialize_with = "null_as_default")]
  pub data: CorporationData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporationData {
  #[serde(default, deserialize_with = "null_as_default")]
  pub commercial_data: CommercialData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommercialData {
  #[serde(default, deserialize_with = "null_as_default")]
  pub behavior: CorporationBehavior,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CorporationBehavior {
  #[serde(default, deserialize_with = "null_as_default")]
  pub contactability: CorporationContactability,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporationContactability {
  #[serde(default, deserialize_with = "null_as_default")]
  pub contacts_data_detail: ContactsDataDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContactsDataDetail {
  #[serde(default, deserialize_with = "null_as_default")]
  pub addresses:  CorporationAddresses,
  #[serde(default, deserialize_with = "null_as_default")]
  pub telephones: ReferenceList,
  #[serde(default, deserialize_with = "null_as_default")]
  pub emails:     ReferenceList,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporationAddresses {
  #[serde(default, deserialize_with = "null_as_default")]
  pub commercial_addresses: Vec<CorporationAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporationAddress {
  #[serde(default, deserialize_with = "null_as_default")]
  pub address_type: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub street:       String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub number:       String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub communes:     String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub city:         String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub region:       String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceList {
  #[serde(default, deserialize_with = "null_as_default")]
  pub reference_data: Vec<ReferenceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
  #[serde(default, deserialize_with = "null_as_default")]
  pub cod_country:             String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub code_area:               String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub referency_desc:          String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub referency_desc_sub_type: String,
}
