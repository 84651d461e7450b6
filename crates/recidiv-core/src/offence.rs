//! Offences: the acts a person is (or was) convicted of, and the new acts
//! under evaluation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Caller-supplied identifier of an offence.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OffenceId(pub String);

impl fmt::Display for OffenceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for OffenceId {
  fn from(value: &str) -> Self { Self(value.to_string()) }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Statutory gravity of an offence. Variants are declared in ascending order
/// so the derived `Ord` is the severity order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
  Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
  Minor,
  #[default]
  Medium,
  Serious,
  EspeciallySerious,
}

impl Category {
  /// Serious or especially serious.
  pub fn is_severe(self) -> bool { self >= Self::Serious }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Minor => "minor",
      Self::Medium => "medium",
      Self::Serious => "serious",
      Self::EspeciallySerious => "especially serious",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Form of guilt.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MensRea {
  #[default]
  Intentional,
  Negligent,
}

// ─── Article reference ───────────────────────────────────────────────────────

/// A reference into the criminal code: article, optional part, optional
/// point. Validated against an [`crate::catalogue::ArticleCatalogue`]; never
/// interpreted by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleRef {
  pub article: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub part:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub point:   Option<String>,
}

impl ArticleRef {
  pub fn new(article: impl Into<String>) -> Self {
    Self { article: article.into(), part: None, point: None }
  }

  pub fn part(mut self, part: impl Into<String>) -> Self {
    self.part = Some(part.into());
    self
  }

  pub fn point(mut self, point: impl Into<String>) -> Self {
    self.point = Some(point.into());
    self
  }

  pub fn is_empty(&self) -> bool { self.article.is_empty() }
}

impl fmt::Display for ArticleRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.article.is_empty() {
      return f.write_str("(no article)");
    }
    write!(f, "art. {}", self.article)?;
    if let Some(part) = &self.part {
      write!(f, " pt. {part}")?;
    }
    if let Some(point) = &self.point {
      write!(f, " cl. {point}")?;
    }
    Ok(())
  }
}

// ─── Offence ─────────────────────────────────────────────────────────────────

/// A single offence. Either owned by a [`crate::conviction::Conviction`] or
/// standing alone as a new offence under evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offence {
  pub id:       OffenceId,
  pub date:     NaiveDate,
  #[serde(default)]
  pub article:  ArticleRef,
  pub category: Category,
  #[serde(default)]
  pub mens_rea: MensRea,
  /// Committed before the age of eighteen.
  #[serde(default)]
  pub juvenile: bool,
}

impl Offence {
  /// An intentional adult offence with no article reference.
  pub fn new(id: impl Into<String>, date: NaiveDate, category: Category) -> Self {
    Self {
      id: OffenceId(id.into()),
      date,
      article: ArticleRef::default(),
      category,
      mens_rea: MensRea::Intentional,
      juvenile: false,
    }
  }

  pub fn with_article(mut self, article: ArticleRef) -> Self {
    self.article = article;
    self
  }

  pub fn negligent(mut self) -> Self {
    self.mens_rea = MensRea::Negligent;
    self
  }

  pub fn juvenile(mut self) -> Self {
    self.juvenile = true;
    self
  }

  pub fn is_intentional(&self) -> bool { self.mens_rea == MensRea::Intentional }
}
