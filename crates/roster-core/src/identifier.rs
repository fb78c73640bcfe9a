//! Subject identifiers (national tax numbers) and the subject kind derived
//! from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Numeric bodies above this value belong to legal entities.
const CORPORATION_THRESHOLD: u64 = 50_000_000;

/// Whether a subject is a natural person or a legal entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
  Person,
  Corporation,
}

/// Longest numeric body accepted, in digits.
const MAX_BODY_DIGITS: usize = 9;

/// A normalized tax identifier, e.g. `76431161-2`.
///
/// Every accepted spelling of a tax number maps to one canonical form: the
/// numeric body without leading zeros, a dash, and the upper-cased check
/// digit. Dots and inner spaces are stripped. When the input has no dash its
/// last character is taken as the check digit, so `176402423` and
/// `17.640.242-3` are the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
  pub fn parse(raw: &str) -> Result<Self> {
    let cleaned: String = raw
      .trim()
      .chars()
      .filter(|c| !matches!(c, '.' | ' '))
      .map(|c| c.to_ascii_uppercase())
      .collect();

    if cleaned.is_empty() {
      return Err(Error::EmptyIdentifier);
    }
    let invalid = || Error::InvalidIdentifier(raw.to_owned());

    let (body, check) = match cleaned.split_once('-') {
      Some((body, check)) => (body, check),
      None => cleaned.split_at(cleaned.len() - cleaned.chars().last().map_or(0, char::len_utf8)),
    };
    let body = body.trim_start_matches('0');

    if body.is_empty()
      || body.len() > MAX_BODY_DIGITS
      || !body.chars().all(|c| c.is_ascii_digit())
    {
      return Err(invalid());
    }
    let mut check_chars = check.chars();
    match (check_chars.next(), check_chars.next()) {
      (Some(c), None) if c.is_ascii_digit() || c == 'K' => {}
      _ => return Err(invalid()),
    }

    Ok(Self(format!("{body}-{check}")))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The identifier without its dash, as identifier-keyed providers expect.
  pub fn compact(&self) -> String { self.0.replace('-', "") }

  /// The numeric part before the check digit.
  pub fn body(&self) -> &str {
    self.0.split_once('-').map_or(self.0.as_str(), |(body, _)| body)
  }

  /// Derive the subject kind from the numeric body.
  pub fn kind(&self) -> SubjectKind {
    match self.body().parse::<u64>() {
      Ok(number) if number <= CORPORATION_THRESHOLD => SubjectKind::Person,
      _ => SubjectKind::Corporation,
    }
  }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
