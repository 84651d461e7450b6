//! The sentence attached to a conviction or to a consolidation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of a main or additional punishment.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PunishmentKind {
  Fine,
  DeprivationOfRight,
  CompulsoryWork,
  CorrectionalWork,
  MilitaryServiceRestriction,
  RestrictionOfLiberty,
  ForcedLabour,
  MilitaryDisciplinaryUnit,
  #[default]
  Imprisonment,
  LifeImprisonment,
}

impl PunishmentKind {
  pub fn is_imprisonment(self) -> bool {
    matches!(self, Self::Imprisonment | Self::LifeImprisonment)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Fine => "fine",
      Self::DeprivationOfRight => "deprivation of the right to hold office",
      Self::CompulsoryWork => "compulsory work",
      Self::CorrectionalWork => "correctional work",
      Self::MilitaryServiceRestriction => "restriction in military service",
      Self::RestrictionOfLiberty => "restriction of liberty",
      Self::ForcedLabour => "forced labour",
      Self::MilitaryDisciplinaryUnit => "military disciplinary unit",
      Self::Imprisonment => "imprisonment",
      Self::LifeImprisonment => "life imprisonment",
    }
  }
}

impl fmt::Display for PunishmentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A sentence. Owned exclusively by one conviction or one consolidation
/// operation; never shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Punishment {
  pub main_kind:                 PunishmentKind,
  /// The main punishment was (or is being) actually served.
  pub actually_served:           bool,
  /// Conditional (suspended) sentence.
  pub suspended:                 bool,
  pub suspension_cancelled:      Option<NaiveDate>,
  /// Execution of the sentence was deferred.
  pub deferment:                 bool,
  pub deferment_cancelled:       Option<NaiveDate>,
  /// Release on parole.
  pub parole:                    Option<NaiveDate>,
  pub main_served_through:       Option<NaiveDate>,
  pub additional_kind:           Option<PunishmentKind>,
  pub additional_served_through: Option<NaiveDate>,
}

impl Default for Punishment {
  fn default() -> Self { Self::new(PunishmentKind::Imprisonment) }
}

impl Punishment {
  /// An actually-served main punishment with no dates recorded yet.
  pub fn new(main_kind: PunishmentKind) -> Self {
    Self {
      main_kind,
      actually_served: true,
      suspended: false,
      suspension_cancelled: None,
      deferment: false,
      deferment_cancelled: None,
      parole: None,
      main_served_through: None,
      additional_kind: None,
      additional_served_through: None,
    }
  }

  /// Actually-served imprisonment, served through `date`.
  pub fn imprisonment(served_through: NaiveDate) -> Self {
    Self::new(PunishmentKind::Imprisonment).served_through(served_through)
  }

  pub fn served_through(mut self, date: NaiveDate) -> Self {
    self.main_served_through = Some(date);
    self
  }

  pub fn paroled(mut self, date: NaiveDate) -> Self {
    self.parole = Some(date);
    self
  }

  /// Mark the main punishment as suspended (conditional).
  pub fn suspended(mut self) -> Self {
    self.suspended = true;
    self.actually_served = false;
    self
  }

  pub fn suspension_cancelled_on(mut self, date: NaiveDate) -> Self {
    self.suspension_cancelled = Some(date);
    self
  }

  pub fn deferred(mut self) -> Self {
    self.deferment = true;
    self
  }

  pub fn deferment_cancelled_on(mut self, date: NaiveDate) -> Self {
    self.deferment_cancelled = Some(date);
    self
  }

  pub fn with_additional(mut self, kind: PunishmentKind, served_through: NaiveDate) -> Self {
    self.additional_kind = Some(kind);
    self.additional_served_through = Some(served_through);
    self
  }

  pub fn is_imprisonment(&self) -> bool { self.main_kind.is_imprisonment() }

  /// Suspended and the suspension was never cancelled.
  pub fn is_in_suspension(&self) -> bool { self.suspended && !self.suspension_is_cancelled() }

  /// Imprisonment that was actually served. A suspended sentence counts
  /// only once its suspension is cancelled.
  pub fn is_real_imprisonment(&self) -> bool {
    let served = if self.suspended {
      self.suspension_is_cancelled()
    } else {
      self.actually_served
    };
    self.is_imprisonment() && served
  }

  /// The date the punishment counts as served: parole if granted, otherwise
  /// the main served-through date; a later additional-punishment date
  /// overrides either. `None` when nothing is recorded.
  pub fn served_date(&self) -> Option<NaiveDate> {
    // `None` orders before any `Some`, so `max` keeps whichever is recorded.
    self
      .parole
      .or(self.main_served_through)
      .max(self.additional_served_through)
  }

  pub fn suspension_is_cancelled(&self) -> bool { self.suspension_cancelled.is_some() }

  pub fn deferment_is_cancelled(&self) -> bool { self.deferment_cancelled.is_some() }
}
