//! The auditable verdict for one new offence.
//!
//! Never stored, always derived: an assessment is recomputed from the graph
//! whenever any conviction, operation or offence changes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  classifier::{Classification, Prior, Rule, classify},
  consolidation::{LegalBasis, OperationId},
  eligibility::{Rejection, evaluate},
  expungement::{Expungement, effective_punishment},
  graph::{Node, NodeGraph, NodeId},
  offence::{Offence, OffenceId},
};

/// Where a node sits in the consolidation chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChainRole {
  /// A conviction not absorbed by any operation.
  RootConviction,
  /// The result of an operation not absorbed by a later one.
  RootConsolidation { basis: LegalBasis },
  /// Absorbed by `by`; `root` is the node evaluated in its place.
  Absorbed {
    by:    OperationId,
    basis: LegalBasis,
    root:  NodeId,
  },
}

impl ChainRole {
  pub fn describe(&self) -> String {
    match self {
      Self::RootConviction => "independent conviction".to_string(),
      Self::RootConsolidation { basis } => {
        format!("consolidation result ({}), evaluated for recidivism", basis.citation())
      }
      Self::Absorbed { by, basis, root } => format!(
        "absorbed by operation {by} ({}); counted through {root}",
        basis.citation()
      ),
    }
  }
}

/// One line of the per-node audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub node:         NodeId,
  pub label:        String,
  pub expungement:  Expungement,
  pub eligible:     bool,
  pub rejection:    Option<Rejection>,
  /// Display text for the accept/reject decision.
  pub reason:       String,
  pub role:         ChainRole,
  pub needs_review: bool,
}

/// The recidivism assessment for a single new offence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
  pub offence:        OffenceId,
  pub offence_date:   NaiveDate,
  pub classification: Classification,
  pub rule:           Rule,
  pub justification:  String,
  /// Root nodes that count, in graph order.
  pub eligible:       Vec<NodeId>,
  /// Every node of the graph, in graph order.
  pub audit:          Vec<AuditEntry>,
}

impl Assessment {
  /// Some counted node has an undetermined expungement date.
  pub fn needs_review(&self) -> bool { self.audit.iter().any(|e| e.needs_review) }
}

/// The offence that represents `id` before the classifier: the most severe
/// underlying offence, the first one in declared order on ties.
pub fn representative_offence<'g>(graph: &'g NodeGraph, id: &NodeId) -> Option<&'g Offence> {
  graph
    .underlying_offences(id)
    .into_iter()
    .reduce(|best, o| if o.category > best.category { o } else { best })
}

fn chain_role(graph: &NodeGraph, id: &NodeId) -> ChainRole {
  if let Some(op) = graph.consuming_operation(id) {
    return ChainRole::Absorbed {
      by:    op.id.clone(),
      basis: op.basis,
      root:  graph.governing_root(id),
    };
  }
  match graph.node(id) {
    Some(Node::Virtual(op)) => ChainRole::RootConsolidation { basis: op.basis },
    _ => ChainRole::RootConviction,
  }
}

/// Assess one new offence against a graph.
pub fn assess(graph: &NodeGraph, offence: &Offence) -> Assessment {
  let mut audit = Vec::with_capacity(graph.len());
  let mut eligible = Vec::new();
  let mut priors = Vec::new();

  for id in graph.node_ids() {
    let outcome = evaluate(graph, id, offence.date);
    if outcome.is_eligible()
      && let (Some(rep), Some(source)) =
        (representative_offence(graph, id), effective_punishment(graph, id))
    {
      priors.push(Prior { offence: rep, punishment: source.punishment() });
      eligible.push(id.clone());
    }

    let reason = match &outcome.rejection {
      Some(rejection) => rejection.to_string(),
      None if outcome.needs_review => {
        "Counted; expungement date undetermined, human review required.".to_string()
      }
      None => "Counted.".to_string(),
    };
    audit.push(AuditEntry {
      node: id.clone(),
      label: graph.label(id),
      eligible: outcome.is_eligible(),
      expungement: outcome.expungement,
      rejection: outcome.rejection,
      reason,
      role: chain_role(graph, id),
      needs_review: outcome.needs_review,
    });
  }

  let rule = classify(offence, &priors);
  debug!(
    offence = %offence.id,
    eligible = eligible.len(),
    rule = rule.number(),
    "assessed new offence"
  );

  Assessment {
    offence: offence.id.clone(),
    offence_date: offence.date,
    classification: rule.classification(),
    rule,
    justification: rule.justification().to_string(),
    eligible,
    audit,
  }
}

/// Assess each new offence in order against the same graph.
pub fn assess_all(graph: &NodeGraph, offences: &[Offence]) -> Vec<Assessment> {
  offences.iter().map(|o| assess(graph, o)).collect()
}
