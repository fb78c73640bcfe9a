//! Provider capability traits and the outcome types they return.
//!
//! Each external provider implements the subset of capabilities it supports.
//! Implementations live in `roster-providers`; the stages in
//! `roster-pipeline` depend only on these traits.

use std::future::Future;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::{
  ProviderError,
  identifier::{Identifier, SubjectKind},
  payload::{ContactReport, ScreeningPayload},
  record::{Record, Risk},
};

// ─── Provider ────────────────────────────────────────────────────────────────

/// The external data providers the roster is screened against.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Provider {
  /// Credit-bureau report service.
  Report,
  /// Case-based watchlist service (entity validations with nested hits).
  WatchlistA,
  /// Identifier-keyed AML registry with flat category results.
  WatchlistB,
}

impl Provider {
  /// The risk flags this provider is responsible for.
  pub fn risks(self) -> &'static [Risk] {
    match self {
      Self::Report => &[],
      Self::WatchlistA => &[Risk::Pep, Risk::Watchlist],
      Self::WatchlistB => &[Risk::Pep, Risk::Watchlist, Risk::Judicial],
    }
  }

  /// Whether screening is keyed by a provider-side case id rather than by
  /// the subject identifier.
  pub fn requires_case(self) -> bool { matches!(self, Self::WatchlistA) }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of a read that may legitimately find nothing. A 404 maps to
/// `NotFound`; it is a business outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
  Found(T),
  NotFound,
}

impl<T> Lookup<T> {
  pub fn is_found(&self) -> bool { matches!(self, Self::Found(_)) }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
    match self {
      Self::Found(v) => Lookup::Found(f(v)),
      Self::NotFound => Lookup::NotFound,
    }
  }
}

/// Result of asking a provider to open a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Creation {
  /// Accepted. The id may be missing if the provider returned none.
  Created(Option<String>),
  /// The provider refused the request (e.g. 422).
  Rejected,
}

/// The slice of an existing case that case preparation cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaseRef {
  #[serde(default)]
  pub id: Option<String>,
}

// ─── Capabilities ────────────────────────────────────────────────────────────

/// A provider that keeps a persistent case per subject.
pub trait CaseRegistry: Send + Sync {
  /// Look up an existing case by subject identifier.
  fn find_case<'a>(
    &'a self,
    identifier: &'a Identifier,
  ) -> impl Future<Output = Result<Lookup<CaseRef>, ProviderError>> + Send + 'a;

  /// Open a new case for the subject.
  fn create_case<'a>(
    &'a self,
    identifier: &'a Identifier,
  ) -> impl Future<Output = Result<Creation, ProviderError>> + Send + 'a;
}

/// A provider that returns a screening payload for a record.
pub trait ScreeningSource: Send + Sync {
  fn provider(&self) -> Provider;

  /// Fetch the raw screening payload. Case-keyed providers read
  /// `record.case_id`; the others read `record.identifier`.
  fn fetch<'a>(
    &'a self,
    record: &'a Record,
  ) -> impl Future<Output = Result<Lookup<ScreeningPayload>, ProviderError>>
  + Send
  + 'a;
}

/// A provider of credit-bureau reports carrying contact data.
pub trait ReportSource: Send + Sync {
  fn fetch_report<'a>(
    &'a self,
    identifier: &'a Identifier,
    kind: SubjectKind,
  ) -> impl Future<Output = Result<Lookup<ContactReport>, ProviderError>> + Send + 'a;
}
