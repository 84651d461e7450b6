//! Consolidation operations, the statutory mechanisms that merge two or more
//! sentences into one controlling sentence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{graph::NodeId, punishment::Punishment};

/// Caller-supplied identifier of a consolidation operation.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OperationId(pub String);

impl fmt::Display for OperationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for OperationId {
  fn from(value: &str) -> Self { Self(value.to_string()) }
}

/// The statutory basis on which sentences are merged.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum LegalBasis {
  /// Cumulative sentencing for several offences (part 5 of art. 69).
  #[default]
  Cumulative,
  /// Cumulative sentencing across verdicts after a suspended sentence is
  /// revoked (art. 70).
  SuspensionRevocation,
  /// As above, with the deferment revoked as well (arts. 70 and 74).
  SuspensionAndDefermentRevocation,
}

impl LegalBasis {
  /// Short statutory citation.
  pub fn citation(self) -> &'static str {
    match self {
      Self::Cumulative => "part 5 of art. 69",
      Self::SuspensionRevocation => "art. 70",
      Self::SuspensionAndDefermentRevocation => "arts. 70 and 74",
    }
  }

  /// Absorption under this basis cancels the absorbed suspended sentence.
  pub fn revokes_suspension(self) -> bool {
    matches!(self, Self::SuspensionRevocation | Self::SuspensionAndDefermentRevocation)
  }

  /// Absorption under this basis cancels the absorbed deferment.
  pub fn revokes_deferment(self) -> bool {
    matches!(self, Self::SuspensionAndDefermentRevocation)
  }
}

impl fmt::Display for LegalBasis {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.citation()) }
}

/// Merges `children` into one result node whose controlling sentence is
/// `merged_punishment`. `primary` must be one of `children`; the result node
/// inherits its verdict date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationOperation {
  pub id:                OperationId,
  #[serde(default)]
  pub basis:             LegalBasis,
  pub children:          Vec<NodeId>,
  pub primary:           NodeId,
  #[serde(default)]
  pub merged_punishment: Punishment,
}

impl ConsolidationOperation {
  pub fn new(
    id: impl Into<String>,
    basis: LegalBasis,
    children: Vec<NodeId>,
    primary: NodeId,
    merged_punishment: Punishment,
  ) -> Self {
    Self {
      id: OperationId(id.into()),
      basis,
      children,
      primary,
      merged_punishment,
    }
  }

  /// The id of the virtual node this operation produces.
  pub fn result_node(&self) -> NodeId { NodeId::Operation(self.id.clone()) }
}
