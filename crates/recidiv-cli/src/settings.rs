//! Layered settings: `recidiv.toml` (optional), then `RECIDIV_*` environment
//! variables. Command-line flags are applied on top in `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::ValueEnum;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
  #[default]
  Text,
  Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub format:      Format,
  /// Article catalogue (JSON list of articles) used to validate references.
  pub catalogue:   Option<PathBuf>,
  /// Print the case fingerprint in the report header.
  pub fingerprint: bool,
}

impl Default for Settings {
  fn default() -> Self { Self { format: Format::Text, catalogue: None, fingerprint: true } }
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("RECIDIV"))
      .build()
      .context("failed to read settings")?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}
