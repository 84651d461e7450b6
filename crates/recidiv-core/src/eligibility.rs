//! Whether a prior node counts toward recidivism on the date
//! of a new offence.
//!
//! Conditions are checked in a fixed order and the first failure is the one
//! reported, so every rejected node carries exactly one reason.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
  consolidation::OperationId,
  conviction::ConvictionId,
  date,
  expungement::{Expungement, effective_punishment, expungement},
  graph::{NodeGraph, NodeId},
  offence::{Category, MensRea},
  punishment::Punishment,
};

/// Why a node does not count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
  /// The node is not part of the graph.
  UnknownNode,
  /// Absorbed into a later consolidation; its root is evaluated instead.
  Absorbed { by: OperationId },
  /// The record was spent on or before the new offence.
  Expunged { on: NaiveDate },
  Juvenile,
  Negligent,
  MinorCategory,
  /// A suspended sentence that was never cancelled. `conviction` names the
  /// underlying conviction when the node is a consolidation result.
  SuspensionNotCancelled { conviction: Option<ConvictionId> },
  DefermentNotCancelled { conviction: Option<ConvictionId> },
}

impl fmt::Display for Rejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnknownNode => f.write_str("Not part of the consolidation graph."),
      Self::Absorbed { by } => {
        write!(f, "Absorbed into later consolidation {by}; evaluated through its result.")
      }
      Self::Expunged { on } => write!(
        f,
        "Record expunged on {} (on or before the date of the new offence).",
        date::format(*on)
      ),
      Self::Juvenile => f.write_str("Not counted: offence committed under the age of 18."),
      Self::Negligent => f.write_str("Not counted: negligent offence."),
      Self::MinorCategory => f.write_str("Not counted: offence of minor gravity."),
      Self::SuspensionNotCancelled { conviction: None } => {
        f.write_str("Not counted: suspended sentence not cancelled.")
      }
      Self::SuspensionNotCancelled { conviction: Some(id) } => {
        write!(f, "Not counted: suspended sentence of conviction {id} not cancelled.")
      }
      Self::DefermentNotCancelled { conviction: None } => {
        f.write_str("Not counted: deferment not cancelled.")
      }
      Self::DefermentNotCancelled { conviction: Some(id) } => {
        write!(f, "Not counted: deferment of conviction {id} not cancelled.")
      }
    }
  }
}

/// The outcome of evaluating one node against one new-offence date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
  pub expungement:  Expungement,
  /// `None` when the node counts.
  pub rejection:    Option<Rejection>,
  /// Counts only because its expungement date could not be determined.
  pub needs_review: bool,
}

impl Eligibility {
  pub fn is_eligible(&self) -> bool { self.rejection.is_none() }

  fn rejected(expungement: Expungement, rejection: Rejection) -> Self {
    Self { expungement, rejection: Some(rejection), needs_review: false }
  }
}

/// Evaluate `id` for a new offence committed on `day`.
pub fn evaluate(graph: &NodeGraph, id: &NodeId, day: NaiveDate) -> Eligibility {
  let expungement = expungement(graph, id);

  let Some(source) = effective_punishment(graph, id) else {
    return Eligibility::rejected(expungement, Rejection::UnknownNode);
  };
  if let Some(by) = graph.consumed_by(id) {
    let by = by.clone();
    return Eligibility::rejected(expungement, Rejection::Absorbed { by });
  }

  if !expungement.is_active_on(day) {
    let on = expungement.date().unwrap_or(day);
    return Eligibility::rejected(expungement, Rejection::Expunged { on });
  }

  let offences = graph.underlying_offences(id);
  if offences.iter().any(|o| o.juvenile) {
    return Eligibility::rejected(expungement, Rejection::Juvenile);
  }
  if offences.iter().any(|o| o.mens_rea == MensRea::Negligent) {
    return Eligibility::rejected(expungement, Rejection::Negligent);
  }
  if offences.iter().any(|o| o.category == Category::Minor) {
    return Eligibility::rejected(expungement, Rejection::MinorCategory);
  }

  if let Some(rejection) = suspension_rejection(graph, id, source.punishment()) {
    return Eligibility::rejected(expungement, rejection);
  }
  if let Some(rejection) = deferment_rejection(graph, id, source.punishment()) {
    return Eligibility::rejected(expungement, rejection);
  }

  let needs_review = expungement.is_undetermined();
  if needs_review {
    warn!(node = %id, "no served date recorded; treating the record as active");
  }
  Eligibility { expungement, rejection: None, needs_review }
}

/// The node's own sentence must not be in suspension, and neither may any
/// underlying conviction's unless a revocation absorbed it.
fn suspension_rejection(
  graph: &NodeGraph,
  id: &NodeId,
  effective: &Punishment,
) -> Option<Rejection> {
  if effective.is_in_suspension() {
    return Some(Rejection::SuspensionNotCancelled { conviction: None });
  }
  graph
    .underlying_convictions(id)
    .into_iter()
    .find(|c| {
      c.punishment.is_in_suspension()
        && !graph
          .absorbing_chain(&NodeId::Conviction(c.id.clone()))
          .iter()
          .any(|op| op.basis.revokes_suspension())
    })
    .map(|c| Rejection::SuspensionNotCancelled { conviction: Some(c.id.clone()) })
}

fn deferment_rejection(
  graph: &NodeGraph,
  id: &NodeId,
  effective: &Punishment,
) -> Option<Rejection> {
  if effective.deferment && !effective.deferment_is_cancelled() {
    return Some(Rejection::DefermentNotCancelled { conviction: None });
  }
  graph
    .underlying_convictions(id)
    .into_iter()
    .find(|c| {
      c.punishment.deferment
        && !c.punishment.deferment_is_cancelled()
        && !graph
          .absorbing_chain(&NodeId::Conviction(c.id.clone()))
          .iter()
          .any(|op| op.basis.revokes_deferment())
    })
    .map(|c| Rejection::DefermentNotCancelled { conviction: Some(c.id.clone()) })
}
