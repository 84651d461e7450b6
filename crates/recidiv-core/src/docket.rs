//! The editable case record.
//!
//! Holds new offences, convictions and consolidation operations, and keeps
//! them in a state from which a valid [`NodeGraph`] can always be built.
//! Every mutation that could break the graph is checked before it is
//! applied, so a rejected edit leaves the docket unchanged.

use serde::Serialize;
use tracing::debug;

use crate::{
  assessment::{Assessment, assess_all},
  consolidation::{ConsolidationOperation, OperationId},
  conviction::{Conviction, ConvictionId},
  error::{Error, Result},
  graph::{NodeGraph, NodeId},
  offence::{Offence, OffenceId},
  punishment::Punishment,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Docket {
  new_offences: Vec<Offence>,
  convictions:  Vec<Conviction>,
  operations:   Vec<ConsolidationOperation>,
}

impl Docket {
  pub fn new() -> Self { Self::default() }

  /// Build a docket from loose records, validating each as it is added.
  /// Operations may be listed in any order.
  pub fn from_parts(
    new_offences: Vec<Offence>,
    convictions: Vec<Conviction>,
    operations: Vec<ConsolidationOperation>,
  ) -> Result<Self> {
    let mut docket = Self::new();
    for offence in new_offences {
      docket.add_new_offence(offence)?;
    }
    for conviction in convictions {
      docket.add_conviction(conviction)?;
    }
    // Validated as a whole: an operation may consume a result declared later.
    NodeGraph::build(docket.convictions.clone(), operations.clone())?;
    docket.operations = operations;
    Ok(docket)
  }

  pub fn new_offences(&self) -> &[Offence] { &self.new_offences }

  pub fn convictions(&self) -> &[Conviction] { &self.convictions }

  pub fn operations(&self) -> &[ConsolidationOperation] { &self.operations }

  // ── New offences ──────────────────────────────────────────────────────

  pub fn add_new_offence(&mut self, offence: Offence) -> Result<()> {
    if offence.id.0.is_empty() {
      return Err(Error::EmptyId("offence"));
    }
    if self.new_offences.iter().any(|o| o.id == offence.id) {
      return Err(Error::DuplicateOffence(offence.id));
    }
    self.new_offences.push(offence);
    Ok(())
  }

  pub fn remove_new_offence(&mut self, id: &OffenceId) -> Result<Offence> {
    let index = self
      .new_offences
      .iter()
      .position(|o| o.id == *id)
      .ok_or_else(|| Error::OffenceNotFound(id.clone()))?;
    Ok(self.new_offences.remove(index))
  }

  // ── Convictions ───────────────────────────────────────────────────────

  pub fn add_conviction(&mut self, conviction: Conviction) -> Result<()> {
    if conviction.id.0.is_empty() {
      return Err(Error::EmptyId("conviction"));
    }
    if conviction.offences.is_empty() {
      return Err(Error::EmptyConviction(conviction.id));
    }
    if self.convictions.iter().any(|c| c.id == conviction.id) {
      return Err(Error::DuplicateConviction(conviction.id));
    }
    self.convictions.push(conviction);
    Ok(())
  }

  /// Remove a conviction. Rejected while any operation lists it as a child.
  pub fn remove_conviction(&mut self, id: &ConvictionId) -> Result<Conviction> {
    let index = self
      .convictions
      .iter()
      .position(|c| c.id == *id)
      .ok_or_else(|| Error::ConvictionNotFound(id.clone()))?;
    let node = NodeId::Conviction(id.clone());
    if let Some(op) = self.operations.iter().find(|op| op.children.contains(&node)) {
      return Err(Error::ConvictionInUse {
        conviction: id.clone(),
        operation:  op.id.clone(),
      });
    }
    Ok(self.convictions.remove(index))
  }

  // ── Operations ────────────────────────────────────────────────────────

  /// Add an operation, validating the graph it would produce.
  pub fn add_operation(&mut self, operation: ConsolidationOperation) -> Result<()> {
    let mut operations = self.operations.clone();
    operations.push(operation);
    NodeGraph::build(self.convictions.clone(), operations.clone())?;
    self.operations = operations;
    debug!(operations = self.operations.len(), "added consolidation operation");
    Ok(())
  }

  /// An operation can be removed unless a later operation consumes its
  /// result.
  pub fn can_remove_operation(&self, id: &OperationId) -> bool {
    self.operations.iter().any(|op| op.id == *id) && self.consumer_of(id).is_none()
  }

  pub fn remove_operation(&mut self, id: &OperationId) -> Result<ConsolidationOperation> {
    let index = self
      .operations
      .iter()
      .position(|op| op.id == *id)
      .ok_or_else(|| Error::OperationNotFound(id.clone()))?;
    if let Some(consumer) = self.consumer_of(id) {
      return Err(Error::OperationInUse {
        operation:   id.clone(),
        consumed_by: consumer.clone(),
      });
    }
    Ok(self.operations.remove(index))
  }

  pub fn set_merged_punishment(&mut self, id: &OperationId, punishment: Punishment) -> Result<()> {
    let op = self
      .operations
      .iter_mut()
      .find(|op| op.id == *id)
      .ok_or_else(|| Error::OperationNotFound(id.clone()))?;
    op.merged_punishment = punishment;
    Ok(())
  }

  fn consumer_of(&self, id: &OperationId) -> Option<&OperationId> {
    let node = NodeId::Operation(id.clone());
    self
      .operations
      .iter()
      .find(|op| op.children.contains(&node))
      .map(|op| &op.id)
  }

  // ── Derived ───────────────────────────────────────────────────────────

  /// Build the consolidation graph for the current records.
  pub fn graph(&self) -> Result<NodeGraph> {
    NodeGraph::build(self.convictions.clone(), self.operations.clone())
  }

  /// Assess every new offence, in order.
  pub fn assess(&self) -> Result<Vec<Assessment>> {
    let graph = self.graph()?;
    Ok(assess_all(&graph, &self.new_offences))
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{consolidation::LegalBasis, date::parse, offence::Category};

  fn d(s: &str) -> NaiveDate { parse(s).unwrap() }

  fn conviction(id: &str) -> Conviction {
    Conviction::new(
      id,
      vec![Offence::new(format!("{id}-1"), d("2014-01-01"), Category::Serious)],
      Punishment::imprisonment(d("2016-01-01")),
    )
    .unwrap()
  }

  fn merge(id: &str, children: &[NodeId]) -> ConsolidationOperation {
    ConsolidationOperation::new(
      id,
      LegalBasis::Cumulative,
      children.to_vec(),
      children[0].clone(),
      Punishment::imprisonment(d("2017-01-01")),
    )
  }

  fn docket() -> Docket {
    let mut docket = Docket::new();
    for id in ["a", "b", "c"] {
      docket.add_conviction(conviction(id)).unwrap();
    }
    docket
  }

  #[test]
  fn duplicate_records_are_rejected() {
    let mut docket = docket();
    assert_eq!(
      docket.add_conviction(conviction("a")),
      Err(Error::DuplicateConviction("a".into()))
    );

    let offence = Offence::new("n", d("2020-01-01"), Category::Medium);
    docket.add_new_offence(offence.clone()).unwrap();
    assert_eq!(docket.add_new_offence(offence), Err(Error::DuplicateOffence("n".into())));
  }

  #[test]
  fn empty_ids_are_rejected() {
    let mut docket = docket();
    let before = docket.clone();

    let mut unnamed = conviction("d");
    unnamed.id = ConvictionId(String::new());
    assert_eq!(docket.add_conviction(unnamed), Err(Error::EmptyId("conviction")));
    assert_eq!(
      docket.add_new_offence(Offence::new("", d("2020-01-01"), Category::Medium)),
      Err(Error::EmptyId("offence"))
    );
    assert_eq!(
      docket.add_operation(merge("", &[NodeId::conviction("a"), NodeId::conviction("b")])),
      Err(Error::EmptyId("operation"))
    );
    assert_eq!(docket, before);
  }

  #[test]
  fn invalid_operation_leaves_docket_unchanged() {
    let mut docket = docket();
    docket
      .add_operation(merge("x", &[NodeId::conviction("a"), NodeId::conviction("b")]))
      .unwrap();
    let before = docket.clone();

    let err = docket
      .add_operation(merge("y", &[NodeId::conviction("a"), NodeId::conviction("c")]))
      .unwrap_err();
    assert!(matches!(err, Error::AlreadyConsumed { .. }));
    assert_eq!(docket, before);
  }

  #[test]
  fn referenced_conviction_cannot_be_removed() {
    let mut docket = docket();
    docket
      .add_operation(merge("x", &[NodeId::conviction("a"), NodeId::conviction("b")]))
      .unwrap();
    assert!(matches!(
      docket.remove_conviction(&"a".into()),
      Err(Error::ConvictionInUse { .. })
    ));
    assert_eq!(docket.remove_conviction(&"c".into()).unwrap().id, ConvictionId::from("c"));
  }

  #[test]
  fn consumed_operation_cannot_be_removed() {
    let mut docket = docket();
    docket
      .add_operation(merge("x", &[NodeId::conviction("a"), NodeId::conviction("b")]))
      .unwrap();
    docket
      .add_operation(merge("y", &[NodeId::operation("x"), NodeId::conviction("c")]))
      .unwrap();

    assert!(!docket.can_remove_operation(&"x".into()));
    assert!(docket.can_remove_operation(&"y".into()));
    assert!(!docket.can_remove_operation(&"missing".into()));
    assert_eq!(
      docket.remove_operation(&"x".into()),
      Err(Error::OperationInUse { operation: "x".into(), consumed_by: "y".into() })
    );

    docket.remove_operation(&"y".into()).unwrap();
    docket.remove_operation(&"x".into()).unwrap();
    assert_eq!(docket.graph().unwrap().roots().len(), 3);
  }

  #[test]
  fn from_parts_accepts_forward_references() {
    let docket = Docket::from_parts(
      vec![],
      vec![conviction("a"), conviction("b"), conviction("c")],
      vec![
        merge("y", &[NodeId::operation("x"), NodeId::conviction("c")]),
        merge("x", &[NodeId::conviction("a"), NodeId::conviction("b")]),
      ],
    )
    .unwrap();
    let graph = docket.graph().unwrap();
    assert_eq!(graph.roots(), vec![&NodeId::operation("y")]);
  }

  #[test]
  fn merged_punishment_feeds_the_assessment() {
    let mut docket = docket();
    docket
      .add_operation(merge("x", &[NodeId::conviction("a"), NodeId::conviction("b")]))
      .unwrap();
    docket.remove_conviction(&"c".into()).unwrap();
    docket
      .add_new_offence(Offence::new("n", d("2020-01-01"), Category::Serious))
      .unwrap();
    assert_eq!(docket.assess().unwrap()[0].eligible, vec![NodeId::operation("x")]);

    // Served long ago: the merged record is spent before the new offence.
    docket
      .set_merged_punishment(&"x".into(), Punishment::imprisonment(d("2009-01-01")))
      .unwrap();
    assert!(docket.assess().unwrap()[0].eligible.is_empty());
    assert_eq!(
      docket.set_merged_punishment(&"nope".into(), Punishment::default()),
      Err(Error::OperationNotFound("nope".into()))
    );
  }
}
