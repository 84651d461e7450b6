//! `recidiv` — assess a case file for recidivism.
//!
//! # Usage
//!
//! ```
//! recidiv case.toml
//! recidiv case.json --format json --catalogue articles.json
//! RUST_LOG=recidiv_core=debug recidiv case.toml
//! ```
//!
//! The report goes to stdout; logs go to stderr.

mod case;
mod report;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use case::CaseFile;
use clap::Parser;
use report::Report;
use settings::{Format, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "recidiv", version, about = "Recidivism classification for prior-conviction records")]
struct Args {
  /// Case file (`.json` or `.toml`) with new offences, convictions and
  /// consolidation operations.
  #[arg(value_name = "CASE")]
  case: PathBuf,

  /// Path to the TOML settings file.
  #[arg(short, long, value_name = "FILE", default_value = "recidiv.toml")]
  config: PathBuf,

  /// Output format (overrides settings).
  #[arg(short, long, value_enum, env = "RECIDIV_FORMAT")]
  format: Option<Format>,

  /// Article catalogue used to validate offence references.
  #[arg(long, value_name = "FILE", env = "RECIDIV_CATALOGUE")]
  catalogue: Option<PathBuf>,

  /// Leave the case fingerprint out of the report.
  #[arg(long)]
  no_fingerprint: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // CLI flags override the settings file and environment.
  let mut settings = Settings::load(&args.config)?;
  if let Some(format) = args.format {
    settings.format = format;
  }
  if args.catalogue.is_some() {
    settings.catalogue = args.catalogue;
  }
  if args.no_fingerprint {
    settings.fingerprint = false;
  }

  let case = CaseFile::load(&args.case)?;
  if let Some(path) = &settings.catalogue {
    let catalogue = case::load_catalogue(path)?;
    case.validate_articles(&catalogue)?;
    tracing::info!(articles = catalogue.len(), "article references validated");
  }

  let docket = case.into_docket()?;
  let assessments = docket.assess().context("assessing case")?;
  tracing::info!(
    convictions = docket.convictions().len(),
    operations = docket.operations().len(),
    offences = assessments.len(),
    "case assessed"
  );

  let fingerprint = settings
    .fingerprint
    .then(|| report::fingerprint(&docket))
    .transpose()?;
  let report = Report { fingerprint, assessments: &assessments };

  match settings.format {
    Format::Text => print!("{}", report.to_text()),
    Format::Json => println!("{}", report.to_json()?),
  }

  Ok(())
}
