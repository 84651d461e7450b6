//! The consolidation graph.
//!
//! Every conviction becomes a *base* node and every consolidation operation
//! a *virtual* node standing for its merged result. An operation *consumes*
//! its children; a node consumed by nothing is a *root*. Only roots are
//! evaluated for recidivism.
//!
//! The graph is an arena: records live in two vectors and every relation is
//! an id lookup, so a graph can be rebuilt, cloned and shared freely. It is
//! validated once at construction and immutable afterwards.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Result,
  consolidation::{ConsolidationOperation, OperationId},
  conviction::{Conviction, ConvictionId},
  date,
  offence::{Category, Offence},
};

// ─── Node identity ───────────────────────────────────────────────────────────

/// Address of a node. Textual form is `conviction:<id>` or `merge:<id>`.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum NodeId {
  Conviction(ConvictionId),
  Operation(OperationId),
}

impl NodeId {
  pub fn conviction(id: impl Into<String>) -> Self {
    Self::Conviction(ConvictionId(id.into()))
  }

  pub fn operation(id: impl Into<String>) -> Self {
    Self::Operation(OperationId(id.into()))
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Conviction(id) => write!(f, "conviction:{id}"),
      Self::Operation(id) => write!(f, "merge:{id}"),
    }
  }
}

impl FromStr for NodeId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.split_once(':') {
      Some(("conviction", id)) if !id.is_empty() => Ok(Self::conviction(id)),
      Some(("merge", id)) if !id.is_empty() => Ok(Self::operation(id)),
      _ => Err(Error::MalformedNodeId(s.to_string())),
    }
  }
}

impl TryFrom<String> for NodeId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { value.parse() }
}

impl From<NodeId> for String {
  fn from(value: NodeId) -> Self { value.to_string() }
}

// ─── Node view ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
  /// Wraps a conviction.
  Base,
  /// Stands for a consolidation operation's result.
  Virtual,
}

impl NodeId {
  pub fn kind(&self) -> NodeKind {
    match self {
      Self::Conviction(_) => NodeKind::Base,
      Self::Operation(_) => NodeKind::Virtual,
    }
  }
}

/// A borrowed view of a node's underlying record.
#[derive(Debug, Clone, Copy)]
pub enum Node<'g> {
  Base(&'g Conviction),
  Virtual(&'g ConsolidationOperation),
}

impl Node<'_> {
  pub fn kind(&self) -> NodeKind {
    match self {
      Self::Base(_) => NodeKind::Base,
      Self::Virtual(_) => NodeKind::Virtual,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
  Base(usize),
  Virtual(usize),
}

// ─── Graph ───────────────────────────────────────────────────────────────────

/// A validated consolidation graph.
#[derive(Debug, Clone)]
pub struct NodeGraph {
  convictions: Vec<Conviction>,
  operations:  Vec<ConsolidationOperation>,
  slots:       HashMap<NodeId, Slot>,
  /// Declaration order: convictions first, then operations.
  order:       Vec<NodeId>,
  consumed_by: HashMap<NodeId, OperationId>,
}

impl NodeGraph {
  /// Build and validate a graph. Operations may appear in any order, and
  /// may reference results of operations declared after them.
  ///
  /// Rejects: empty or duplicate ids, convictions without offences,
  /// operations with fewer than two children, unknown or repeated children,
  /// a primary that is not a child, a node consumed twice, and cycles.
  pub fn build(
    convictions: Vec<Conviction>,
    operations: Vec<ConsolidationOperation>,
  ) -> Result<Self> {
    let mut slots = HashMap::with_capacity(convictions.len() + operations.len());
    let mut order = Vec::with_capacity(convictions.len() + operations.len());

    for (i, c) in convictions.iter().enumerate() {
      if c.id.0.is_empty() {
        return Err(Error::EmptyId("conviction"));
      }
      if c.offences.is_empty() {
        return Err(Error::EmptyConviction(c.id.clone()));
      }
      let id = NodeId::Conviction(c.id.clone());
      if slots.insert(id.clone(), Slot::Base(i)).is_some() {
        return Err(Error::DuplicateConviction(c.id.clone()));
      }
      order.push(id);
    }

    for (i, op) in operations.iter().enumerate() {
      if op.id.0.is_empty() {
        return Err(Error::EmptyId("operation"));
      }
      let id = op.result_node();
      if slots.insert(id.clone(), Slot::Virtual(i)).is_some() {
        return Err(Error::DuplicateOperation(op.id.clone()));
      }
      order.push(id);
    }

    let mut consumed_by: HashMap<NodeId, OperationId> = HashMap::new();
    for op in &operations {
      if op.children.len() < 2 {
        return Err(Error::TooFewChildren(op.id.clone()));
      }
      for (i, child) in op.children.iter().enumerate() {
        if !slots.contains_key(child) {
          return Err(Error::UnknownNode {
            operation: op.id.clone(),
            node:      child.clone(),
          });
        }
        if op.children[..i].contains(child) {
          return Err(Error::DuplicateChild {
            operation: op.id.clone(),
            node:      child.clone(),
          });
        }
        if *child == op.result_node() {
          return Err(Error::Cycle(child.clone()));
        }
        if let Some(existing) = consumed_by.get(child) {
          return Err(Error::AlreadyConsumed {
            node:        child.clone(),
            consumed_by: existing.clone(),
          });
        }
        consumed_by.insert(child.clone(), op.id.clone());
      }
      if !op.children.contains(&op.primary) {
        return Err(Error::PrimaryNotAmongChildren {
          operation: op.id.clone(),
          primary:   op.primary.clone(),
        });
      }
    }

    // Each node has at most one consumer, so a cycle shows up as a consumer
    // chain that returns to a node it already passed.
    for start in &order {
      let mut seen = vec![start];
      let mut cursor = start;
      while let Some(op_id) = consumed_by.get(cursor) {
        let next = slots
          .get_key_value(&NodeId::Operation(op_id.clone()))
          .map(|(k, _)| k)
          .ok_or_else(|| Error::OperationNotFound(op_id.clone()))?;
        if seen.contains(&next) {
          return Err(Error::Cycle(next.clone()));
        }
        seen.push(next);
        cursor = next;
      }
    }

    let graph = Self { convictions, operations, slots, order, consumed_by };
    debug!(
      nodes = graph.order.len(),
      roots = graph.roots().len(),
      "built consolidation graph"
    );
    Ok(graph)
  }

  // ── Records ───────────────────────────────────────────────────────────

  pub fn convictions(&self) -> &[Conviction] { &self.convictions }

  pub fn operations(&self) -> &[ConsolidationOperation] { &self.operations }

  pub fn conviction(&self, id: &ConvictionId) -> Option<&Conviction> {
    match self.node(&NodeId::Conviction(id.clone()))? {
      Node::Base(c) => Some(c),
      Node::Virtual(_) => None,
    }
  }

  pub fn operation(&self, id: &OperationId) -> Option<&ConsolidationOperation> {
    match self.node(&NodeId::Operation(id.clone()))? {
      Node::Virtual(op) => Some(op),
      Node::Base(_) => None,
    }
  }

  // ── Nodes ─────────────────────────────────────────────────────────────

  pub fn node(&self, id: &NodeId) -> Option<Node<'_>> {
    match *self.slots.get(id)? {
      Slot::Base(i) => Some(Node::Base(&self.convictions[i])),
      Slot::Virtual(i) => Some(Node::Virtual(&self.operations[i])),
    }
  }

  pub fn contains(&self, id: &NodeId) -> bool { self.slots.contains_key(id) }

  /// All node ids in declaration order.
  pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> { self.order.iter() }

  pub fn len(&self) -> usize { self.order.len() }

  pub fn is_empty(&self) -> bool { self.order.is_empty() }

  // ── Consumption ───────────────────────────────────────────────────────

  /// The full consumed-by index.
  pub fn consumed_by_index(&self) -> &HashMap<NodeId, OperationId> { &self.consumed_by }

  pub fn consumed_by(&self, id: &NodeId) -> Option<&OperationId> { self.consumed_by.get(id) }

  /// The operation that directly absorbs `id`, if any.
  pub fn consuming_operation(&self, id: &NodeId) -> Option<&ConsolidationOperation> {
    self.operation(self.consumed_by(id)?)
  }

  pub fn is_root(&self, id: &NodeId) -> bool {
    self.contains(id) && !self.consumed_by.contains_key(id)
  }

  /// Nodes absent from the consumed-by index, in declaration order.
  pub fn roots(&self) -> Vec<&NodeId> {
    self
      .order
      .iter()
      .filter(|id| !self.consumed_by.contains_key(*id))
      .collect()
  }

  /// The chain of operations absorbing `id`, innermost first, ending at the
  /// operation whose result is a root. Empty for a root.
  pub fn absorbing_chain(&self, id: &NodeId) -> Vec<&ConsolidationOperation> {
    let mut chain = Vec::new();
    let mut cursor = id.clone();
    while let Some(op) = self.consuming_operation(&cursor) {
      chain.push(op);
      cursor = op.result_node();
    }
    chain
  }

  /// The root that stands for `id` in recidivism evaluation.
  pub fn governing_root(&self, id: &NodeId) -> NodeId {
    self
      .absorbing_chain(id)
      .last()
      .map_or_else(|| id.clone(), |op| op.result_node())
  }

  // ── Traversal ─────────────────────────────────────────────────────────

  /// The convictions feeding `id`: itself for a base node, otherwise the
  /// concatenation over children in declared order. Empty for an unknown id.
  pub fn underlying_convictions(&self, id: &NodeId) -> Vec<&Conviction> {
    let mut out = Vec::new();
    self.collect_convictions(id, &mut out);
    out
  }

  fn collect_convictions<'g>(&'g self, id: &NodeId, out: &mut Vec<&'g Conviction>) {
    match self.node(id) {
      Some(Node::Base(c)) => out.push(c),
      Some(Node::Virtual(op)) => {
        for child in &op.children {
          self.collect_convictions(child, out);
        }
      }
      None => {}
    }
  }

  /// Offences of every underlying conviction, flattened in order.
  pub fn underlying_offences(&self, id: &NodeId) -> Vec<&Offence> {
    self
      .underlying_convictions(id)
      .into_iter()
      .flat_map(|c| c.offences.iter())
      .collect()
  }

  /// Most severe category among the underlying offences; medium if there
  /// are none.
  pub fn max_category(&self, id: &NodeId) -> Category {
    self
      .underlying_offences(id)
      .iter()
      .map(|o| o.category)
      .max()
      .unwrap_or(Category::Medium)
  }

  /// True if any underlying conviction predates the 2013 amendment.
  pub fn any_pre2013(&self, id: &NodeId) -> bool {
    self.underlying_convictions(id).iter().any(|c| c.pre2013)
  }

  /// Own verdict date for a base node; the primary child's, recursively,
  /// for a virtual node.
  pub fn verdict_date(&self, id: &NodeId) -> Option<NaiveDate> {
    let mut cursor = id;
    loop {
      match self.node(cursor)? {
        Node::Base(c) => return c.verdict_date,
        Node::Virtual(op) => cursor = &op.primary,
      }
    }
  }

  /// Human-readable label used in the audit trail.
  pub fn label(&self, id: &NodeId) -> String {
    match self.node(id) {
      None => format!("unknown node {id}"),
      Some(Node::Base(c)) => {
        let n = self
          .slots
          .get(id)
          .map_or(0, |slot| match slot {
            Slot::Base(i) | Slot::Virtual(i) => i + 1,
          });
        match c.verdict_date {
          Some(day) => format!("Verdict #{n} of {}", date::format(day)),
          None => format!("Verdict #{n}"),
        }
      }
      Some(Node::Virtual(op)) => format!(
        "Consolidated ({}), primary: {}",
        op.basis.citation(),
        self.label(&op.primary)
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    consolidation::LegalBasis, date::parse, punishment::Punishment,
  };

  fn d(s: &str) -> NaiveDate { parse(s).unwrap() }

  fn conviction(id: &str, category: Category) -> Conviction {
    Conviction::new(
      id,
      vec![Offence::new(format!("{id}-o1"), d("2015-01-01"), category)],
      Punishment::imprisonment(d("2018-01-01")),
    )
    .unwrap()
    .with_verdict_date(d("2015-02-01"))
  }

  fn op(id: &str, children: &[NodeId], primary: NodeId) -> ConsolidationOperation {
    ConsolidationOperation::new(
      id,
      LegalBasis::Cumulative,
      children.to_vec(),
      primary,
      Punishment::imprisonment(d("2020-01-01")),
    )
  }

  fn c(id: &str) -> NodeId { NodeId::conviction(id) }
  fn m(id: &str) -> NodeId { NodeId::operation(id) }

  #[test]
  fn node_id_text_form() {
    assert_eq!(c("a").to_string(), "conviction:a");
    assert_eq!("merge:x".parse::<NodeId>().unwrap(), m("x"));
    assert!("x".parse::<NodeId>().is_err());
    assert!("merge:".parse::<NodeId>().is_err());
    let json = serde_json::to_string(&m("x")).unwrap();
    assert_eq!(json, "\"merge:x\"");
  }

  #[test]
  fn base_nodes_are_roots() {
    let g = NodeGraph::build(
      vec![conviction("a", Category::Medium), conviction("b", Category::Serious)],
      vec![],
    )
    .unwrap();
    assert_eq!(g.roots(), vec![&c("a"), &c("b")]);
    assert_eq!(g.len(), 2);
  }

  #[test]
  fn operation_consumes_children() {
    let g = NodeGraph::build(
      vec![conviction("a", Category::Medium), conviction("b", Category::Serious)],
      vec![op("x", &[c("a"), c("b")], c("a"))],
    )
    .unwrap();
    assert_eq!(g.roots(), vec![&m("x")]);
    assert_eq!(g.node(&m("x")).map(|n| n.kind()), Some(NodeKind::Virtual));
    assert_eq!(c("a").kind(), NodeKind::Base);
    assert_eq!(g.consumed_by(&c("a")), Some(&OperationId::from("x")));
    assert_eq!(g.max_category(&m("x")), Category::Serious);
    assert_eq!(g.verdict_date(&m("x")), Some(d("2015-02-01")));
    let ids: Vec<_> = g.underlying_convictions(&m("x")).iter().map(|c| c.id.0.clone()).collect();
    assert_eq!(ids, vec!["a", "b"]);
  }

  #[test]
  fn chains_resolve_in_any_declaration_order() {
    let g = NodeGraph::build(
      vec![
        conviction("a", Category::Medium),
        conviction("b", Category::Medium),
        conviction("c", Category::EspeciallySerious),
      ],
      vec![
        op("outer", &[m("inner"), c("c")], c("c")),
        op("inner", &[c("a"), c("b")], c("b")),
      ],
    )
    .unwrap();
    assert_eq!(g.roots(), vec![&m("outer")]);
    assert_eq!(g.underlying_convictions(&m("outer")).len(), 3);
    assert_eq!(g.max_category(&m("inner")), Category::Medium);
    assert_eq!(g.max_category(&m("outer")), Category::EspeciallySerious);
    assert_eq!(g.governing_root(&c("a")), m("outer"));
    assert_eq!(g.absorbing_chain(&c("a")).len(), 2);
  }

  #[test]
  fn rejects_unknown_child() {
    let err = NodeGraph::build(
      vec![conviction("a", Category::Medium)],
      vec![op("x", &[c("a"), c("ghost")], c("a"))],
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownNode { node, .. } if node == c("ghost")));
  }

  #[test]
  fn rejects_single_child() {
    let err = NodeGraph::build(
      vec![conviction("a", Category::Medium)],
      vec![op("x", &[c("a")], c("a"))],
    )
    .unwrap_err();
    assert_eq!(err, Error::TooFewChildren("x".into()));
  }

  #[test]
  fn rejects_primary_outside_children() {
    let err = NodeGraph::build(
      vec![
        conviction("a", Category::Medium),
        conviction("b", Category::Medium),
        conviction("z", Category::Medium),
      ],
      vec![op("x", &[c("a"), c("b")], c("z"))],
    )
    .unwrap_err();
    assert!(matches!(err, Error::PrimaryNotAmongChildren { .. }));
  }

  #[test]
  fn rejects_empty_ids() {
    let mut unnamed = conviction("a", Category::Medium);
    unnamed.id = ConvictionId(String::new());
    let err = NodeGraph::build(vec![unnamed], vec![]).unwrap_err();
    assert_eq!(err, Error::EmptyId("conviction"));

    let err = NodeGraph::build(
      vec![conviction("a", Category::Medium), conviction("b", Category::Medium)],
      vec![op("", &[c("a"), c("b")], c("a"))],
    )
    .unwrap_err();
    assert_eq!(err, Error::EmptyId("operation"));
  }

  #[test]
  fn rejects_reconsumption() {
    let err = NodeGraph::build(
      vec![
        conviction("a", Category::Medium),
        conviction("b", Category::Medium),
        conviction("c", Category::Medium),
      ],
      vec![
        op("x", &[c("a"), c("b")], c("a")),
        op("y", &[c("a"), c("c")], c("c")),
      ],
    )
    .unwrap_err();
    assert!(matches!(err, Error::AlreadyConsumed { node, .. } if node == c("a")));
  }

  #[test]
  fn rejects_cycle() {
    let err = NodeGraph::build(
      vec![conviction("a", Category::Medium), conviction("b", Category::Medium)],
      vec![
        op("x", &[m("y"), c("a")], c("a")),
        op("y", &[m("x"), c("b")], c("b")),
      ],
    )
    .unwrap_err();
    assert!(matches!(err, Error::Cycle(_)));
  }

  #[test]
  fn rejects_self_reference() {
    let err = NodeGraph::build(
      vec![conviction("a", Category::Medium)],
      vec![op("x", &[m("x"), c("a")], c("a"))],
    )
    .unwrap_err();
    assert_eq!(err, Error::Cycle(m("x")));
  }

  #[test]
  fn rejects_duplicate_ids() {
    let err = NodeGraph::build(
      vec![conviction("a", Category::Medium), conviction("a", Category::Minor)],
      vec![],
    )
    .unwrap_err();
    assert_eq!(err, Error::DuplicateConviction("a".into()));
  }

  #[test]
  fn labels() {
    let g = NodeGraph::build(
      vec![conviction("a", Category::Medium), conviction("b", Category::Medium)],
      vec![op("x", &[c("a"), c("b")], c("b"))],
    )
    .unwrap();
    assert_eq!(g.label(&c("a")), "Verdict #1 of 2015-02-01");
    assert_eq!(
      g.label(&m("x")),
      "Consolidated (part 5 of art. 69), primary: Verdict #2 of 2015-02-01"
    );
  }
}
