//! Case files: the records of one person, read from JSON or TOML.

use std::{fs, path::Path};

use anyhow::{Context as _, bail};
use recidiv_core::{
  catalogue::{ArticleCatalogue, StaticCatalogue},
  consolidation::ConsolidationOperation,
  conviction::Conviction,
  docket::Docket,
  offence::Offence,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CaseFile {
  pub new_offences: Vec<Offence>,
  pub convictions:  Vec<Conviction>,
  pub operations:   Vec<ConsolidationOperation>,
}

impl CaseFile {
  /// Read a case file; the format follows the extension (`.json` or
  /// `.toml`).
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = fs::read_to_string(path)
      .with_context(|| format!("reading case file {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
      Some("json") => serde_json::from_str(&raw)
        .with_context(|| format!("parsing JSON case file {}", path.display())),
      Some("toml") => toml::from_str(&raw)
        .with_context(|| format!("parsing TOML case file {}", path.display())),
      _ => bail!("unsupported case file {}: expected .json or .toml", path.display()),
    }
  }

  /// Check every offence's article reference against `catalogue`.
  pub fn validate_articles(&self, catalogue: &impl ArticleCatalogue) -> anyhow::Result<()> {
    let prior = self.convictions.iter().flat_map(|c| &c.offences);
    for offence in self.new_offences.iter().chain(prior) {
      catalogue
        .validate_reference(&offence.article)
        .with_context(|| format!("offence {}", offence.id))?;
    }
    Ok(())
  }

  pub fn into_docket(self) -> anyhow::Result<Docket> {
    Docket::from_parts(self.new_offences, self.convictions, self.operations)
      .context("invalid case records")
  }
}

pub fn load_catalogue(path: &Path) -> anyhow::Result<StaticCatalogue> {
  let raw = fs::read_to_string(path)
    .with_context(|| format!("reading article catalogue {}", path.display()))?;
  serde_json::from_str(&raw)
    .with_context(|| format!("parsing article catalogue {}", path.display()))
}
