//! One verdict covering one or more offences and a single
//! punishment.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, offence::Offence, punishment::Punishment};

/// Caller-supplied identifier of a conviction.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConvictionId(pub String);

impl fmt::Display for ConvictionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ConvictionId {
  fn from(value: &str) -> Self { Self(value.to_string()) }
}

/// A prior conviction. Never removed while a consolidation operation refers
/// to it (see [`crate::docket::Docket::remove_conviction`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conviction {
  pub id:             ConvictionId,
  #[serde(default)]
  pub verdict_date:   Option<NaiveDate>,
  /// Date the verdict entered into legal force.
  #[serde(default)]
  pub effective_date: Option<NaiveDate>,
  /// Offences committed before the 2013 amendment carry shorter
  /// expungement terms for serious categories.
  #[serde(default)]
  pub pre2013:        bool,
  /// Non-empty, in the order the verdict lists them.
  pub offences:       Vec<Offence>,
  #[serde(default)]
  pub punishment:     Punishment,
}

impl Conviction {
  /// Build a conviction; rejects an empty id or offence list.
  pub fn new(
    id: impl Into<String>,
    offences: Vec<Offence>,
    punishment: Punishment,
  ) -> Result<Self> {
    let id = ConvictionId(id.into());
    if id.0.is_empty() {
      return Err(Error::EmptyId("conviction"));
    }
    if offences.is_empty() {
      return Err(Error::EmptyConviction(id));
    }
    Ok(Self {
      id,
      verdict_date: None,
      effective_date: None,
      pre2013: false,
      offences,
      punishment,
    })
  }

  pub fn with_verdict_date(mut self, date: NaiveDate) -> Self {
    self.verdict_date = Some(date);
    self
  }

  pub fn with_effective_date(mut self, date: NaiveDate) -> Self {
    self.effective_date = Some(date);
    self
  }

  pub fn pre_2013(mut self) -> Self {
    self.pre2013 = true;
    self
  }
}
