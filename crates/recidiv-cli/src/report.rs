//! Report rendering and the case fingerprint.

use std::fmt::Write as _;

use anyhow::Context as _;
use recidiv_core::{
  assessment::{Assessment, AuditEntry},
  date,
  docket::Docket,
  expungement::Expungement,
};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the canonical JSON encoding of the docket, hex encoded.
///
/// Stable: the same records in the same order give the same fingerprint.
pub fn fingerprint(docket: &Docket) -> anyhow::Result<String> {
  let canonical = serde_json::to_vec(docket).context("encoding case for fingerprint")?;
  let hash = Sha256::digest(&canonical);
  Ok(hex::encode(hash))
}

#[derive(Debug, Serialize)]
pub struct Report<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fingerprint: Option<String>,
  pub assessments: &'a [Assessment],
}

impl Report<'_> {
  pub fn to_json(&self) -> anyhow::Result<String> {
    serde_json::to_string_pretty(self).context("encoding report")
  }

  pub fn to_text(&self) -> String {
    let mut out = String::new();
    if let Some(fingerprint) = &self.fingerprint {
      let _ = writeln!(out, "Case fingerprint: {fingerprint}");
    }
    if self.assessments.is_empty() {
      out.push_str("No new offences to assess.\n");
    }
    for assessment in self.assessments {
      out.push('\n');
      render_assessment(&mut out, assessment);
    }
    out
  }
}

fn render_assessment(out: &mut String, a: &Assessment) {
  let _ = writeln!(out, "New offence {} of {}", a.offence, date::format(a.offence_date));
  let _ = writeln!(out, "  Classification: {} (rule {})", a.classification, a.rule.number());
  let _ = writeln!(out, "  Justification:  {}", a.justification);
  if a.needs_review() {
    out.push_str("  Review required: some counted records have no served date.\n");
  }
  out.push_str("  Records:\n");
  for entry in &a.audit {
    render_entry(out, entry);
  }
}

fn render_entry(out: &mut String, e: &AuditEntry) {
  let mark = if e.eligible { '+' } else { '-' };
  let _ = writeln!(out, "    [{mark}] {} ({})", e.label, e.node);
  let _ = writeln!(out, "        expungement: {}", expungement_text(&e.expungement));
  let _ = writeln!(out, "        {}", e.reason);
  let _ = writeln!(out, "        role: {}", e.role.describe());
}

fn expungement_text(expungement: &Expungement) -> String {
  match expungement {
    Expungement::On { date: on, .. } => date::format(*on),
    Expungement::Undetermined => "undetermined".to_string(),
    Expungement::GovernedBy { node } => format!("governed by {node}"),
  }
}

#[cfg(test)]
mod tests {
  use recidiv_core::{
    conviction::Conviction,
    date::parse,
    offence::{Category, Offence},
    punishment::Punishment,
  };

  use super::*;

  fn docket() -> Docket {
    let mut docket = Docket::new();
    docket
      .add_conviction(
        Conviction::new(
          "c1",
          vec![Offence::new("c1-1", parse("2014-01-01").unwrap(), Category::Serious)],
          Punishment::imprisonment(parse("2015-01-01").unwrap()),
        )
        .unwrap()
        .with_verdict_date(parse("2014-06-01").unwrap()),
      )
      .unwrap();
    docket
      .add_new_offence(Offence::new("n1", parse("2020-01-01").unwrap(), Category::Serious))
      .unwrap();
    docket
  }

  #[test]
  fn fingerprint_is_stable_and_sensitive() {
    let a = docket();
    assert_eq!(fingerprint(&a).unwrap(), fingerprint(&a.clone()).unwrap());
    assert_eq!(fingerprint(&a).unwrap().len(), 64);

    let mut b = a.clone();
    b.add_new_offence(Offence::new("n2", parse("2021-01-01").unwrap(), Category::Medium))
      .unwrap();
    assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
  }

  #[test]
  fn text_report_lists_classification_and_records() {
    let docket = docket();
    let assessments = docket.assess().unwrap();
    let report = Report { fingerprint: Some("abc".into()), assessments: &assessments };
    let text = report.to_text();

    assert!(text.starts_with("Case fingerprint: abc\n"));
    assert!(text.contains("New offence n1 of 2020-01-01"));
    assert!(text.contains("dangerous recidivism (rule 7)"));
    assert!(text.contains("[+] Verdict #1 of 2014-06-01 (conviction:c1)"));
    assert!(text.contains("expungement: 2023-01-01"));
  }

  #[test]
  fn json_report_omits_missing_fingerprint() {
    let docket = docket();
    let assessments = docket.assess().unwrap();
    let json = Report { fingerprint: None, assessments: &assessments }.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value.get("fingerprint").is_none());
    assert_eq!(value["assessments"][0]["classification"], "dangerous");
    assert_eq!(value["assessments"][0]["eligible"][0], "conviction:c1");
  }
}
