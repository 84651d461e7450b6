//! Calendar arithmetic for statutory terms.
//!
//! Dates are exchanged as `YYYY-MM-DD` text, which orders the same way
//! lexicographically as it does chronologically. Internally everything is a
//! [`NaiveDate`].

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The on-the-wire date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse `YYYY-MM-DD` text.
pub fn parse(text: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
    .map_err(|_| Error::InvalidDate(text.to_string()))
}

/// Render a date as `YYYY-MM-DD`.
pub fn format(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

/// Add calendar months. A day that does not exist in the target month is
/// clamped to that month's last day (31 Jan + 1 month = 28/29 Feb).
/// Saturates at [`NaiveDate::MAX`].
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
  date
    .checked_add_months(Months::new(months))
    .unwrap_or(NaiveDate::MAX)
}

/// Add calendar years; 29 Feb maps to 28 Feb in a non-leap target year.
/// The result never rolls over into the following month, so a term that
/// starts on a leap day ends no later than its anniversary month.
pub fn add_years(date: NaiveDate, years: u32) -> NaiveDate {
  add_months(date, years.saturating_mul(12))
}

/// Length of a statutory term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "count", rename_all = "lowercase")]
pub enum Term {
  Months(u32),
  Years(u32),
}

impl Term {
  /// The date on which a term starting at `start` ends.
  pub fn after(self, start: NaiveDate) -> NaiveDate {
    match self {
      Self::Months(n) => add_months(start, n),
      Self::Years(n) => add_years(start, n),
    }
  }
}

impl std::fmt::Display for Term {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Months(1) => write!(f, "1 month"),
      Self::Months(n) => write!(f, "{n} months"),
      Self::Years(1) => write!(f, "1 year"),
      Self::Years(n) => write!(f, "{n} years"),
    }
  }
}
