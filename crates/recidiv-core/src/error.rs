//! Error types for `recidiv-core`.

use thiserror::Error;

use crate::{
  consolidation::OperationId, conviction::ConvictionId, graph::NodeId,
  offence::OffenceId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  // ── Graph structure ─────────────────────────────────────────────────────
  #[error("operation {operation} references unknown node {node}")]
  UnknownNode { operation: OperationId, node: NodeId },

  #[error("operation {0} must merge at least two nodes")]
  TooFewChildren(OperationId),

  #[error("operation {operation}: primary node {primary} is not among its children")]
  PrimaryNotAmongChildren { operation: OperationId, primary: NodeId },

  #[error("operation {operation} lists node {node} more than once")]
  DuplicateChild { operation: OperationId, node: NodeId },

  #[error("node {node} is already consumed by operation {consumed_by}")]
  AlreadyConsumed { node: NodeId, consumed_by: OperationId },

  #[error("consolidation cycle through node {0}")]
  Cycle(NodeId),

  #[error("malformed node id {0:?}: expected conviction:<id> or merge:<id>")]
  MalformedNodeId(String),

  // ── Records ─────────────────────────────────────────────────────────────
  #[error("{0} id must not be empty")]
  EmptyId(&'static str),

  #[error("duplicate conviction id: {0}")]
  DuplicateConviction(ConvictionId),

  #[error("duplicate operation id: {0}")]
  DuplicateOperation(OperationId),

  #[error("duplicate offence id: {0}")]
  DuplicateOffence(OffenceId),

  #[error("conviction {0} has no offences")]
  EmptyConviction(ConvictionId),

  #[error("conviction not found: {0}")]
  ConvictionNotFound(ConvictionId),

  #[error("operation not found: {0}")]
  OperationNotFound(OperationId),

  #[error("offence not found: {0}")]
  OffenceNotFound(OffenceId),

  #[error("conviction {conviction} is still referenced by operation {operation}")]
  ConvictionInUse { conviction: ConvictionId, operation: OperationId },

  #[error("operation {operation} is consumed by later operation {consumed_by}")]
  OperationInUse { operation: OperationId, consumed_by: OperationId },

  // ── Dates ───────────────────────────────────────────────────────────────
  #[error("invalid date {0:?}: expected YYYY-MM-DD")]
  InvalidDate(String),

  // ── Article catalogue ───────────────────────────────────────────────────
  #[error("unknown article: {0}")]
  UnknownArticle(String),

  #[error("article {article} has no part {part}")]
  UnknownPart { article: String, part: String },

  #[error("article {article} part {part} has no point {point}")]
  UnknownPoint { article: String, part: String, point: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
