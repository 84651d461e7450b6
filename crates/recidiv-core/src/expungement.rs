//! Expungement: the date a node's record is legally spent.
//!
//! The calculation itself ([`calculate`]) only needs a punishment, a set of
//! offences and the pre-2013 flag. Which punishment and which offences
//! apply to a node is decided once, by [`effective_punishment`]:
//!
//! | node                                   | clock (punishment)      | term (offences)   |
//! |----------------------------------------|-------------------------|-------------------|
//! | unabsorbed conviction                  | own                     | own               |
//! | consolidation result                   | merged                  | whole chain       |
//! | absorbed by a revocation               | absorbing operation's   | own               |
//! | absorbed by cumulative sentencing      | none, see result node   | none              |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  consolidation::ConsolidationOperation,
  date::Term,
  graph::{Node, NodeGraph, NodeId},
  offence::{Category, Offence},
  punishment::Punishment,
};

// ─── Result types ────────────────────────────────────────────────────────────

/// Which statutory term produced an expungement date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TermRule {
  /// Offence committed as a minor.
  Juvenile { term: Term },
  /// Suspended sentence: spent when the probation ends.
  Suspended,
  NonImprisonment { term: Term },
  Imprisonment {
    category: Category,
    pre2013:  bool,
    term:     Term,
  },
}

impl TermRule {
  pub fn term(self) -> Option<Term> {
    match self {
      Self::Juvenile { term }
      | Self::NonImprisonment { term }
      | Self::Imprisonment { term, .. } => Some(term),
      Self::Suspended => None,
    }
  }
}

/// The computed expungement status of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Expungement {
  /// The record is spent on `date`.
  On {
    date:   NaiveDate,
    /// The date the term started running from.
    served: NaiveDate,
    rule:   TermRule,
  },
  /// No served-through date recorded; the record is treated as active.
  Undetermined,
  /// Absorbed by cumulative sentencing; only `node`'s date matters.
  GovernedBy { node: NodeId },
}

impl Expungement {
  pub fn date(&self) -> Option<NaiveDate> {
    match self {
      Self::On { date, .. } => Some(*date),
      Self::Undetermined | Self::GovernedBy { .. } => None,
    }
  }

  /// Whether the record still counts on `day`: the day is strictly before
  /// the expungement date, or no date could be determined.
  pub fn is_active_on(&self, day: NaiveDate) -> bool {
    match self {
      Self::On { date, .. } => day < *date,
      Self::Undetermined | Self::GovernedBy { .. } => true,
    }
  }

  pub fn is_undetermined(&self) -> bool { matches!(self, Self::Undetermined) }
}

// ─── Effective punishment ────────────────────────────────────────────────────

/// Where a node's expungement clock comes from.
#[derive(Debug, Clone, Copy)]
pub enum DateSource<'g> {
  /// Unabsorbed conviction: its own sentence.
  Own(&'g Punishment),
  /// Consolidation result: the operation's merged sentence.
  Merged(&'g ConsolidationOperation),
  /// Absorbed under a revocation basis: the operation's sentence starts the
  /// clock, the node's own offences set the term.
  Hybrid(&'g ConsolidationOperation),
  /// Absorbed under cumulative sentencing.
  Governed(&'g ConsolidationOperation),
}

impl<'g> DateSource<'g> {
  /// The punishment that governs the node.
  pub fn punishment(self) -> &'g Punishment {
    match self {
      Self::Own(p) => p,
      Self::Merged(op) | Self::Hybrid(op) | Self::Governed(op) => &op.merged_punishment,
    }
  }
}

/// Resolve the date source of `id`. `None` for an unknown node.
pub fn effective_punishment<'g>(graph: &'g NodeGraph, id: &NodeId) -> Option<DateSource<'g>> {
  let node = graph.node(id)?;
  if let Some(op) = graph.consuming_operation(id) {
    return Some(if op.basis.revokes_suspension() {
      DateSource::Hybrid(op)
    } else {
      DateSource::Governed(op)
    });
  }
  Some(match node {
    Node::Base(c) => DateSource::Own(&c.punishment),
    Node::Virtual(op) => DateSource::Merged(op),
  })
}

// ─── Calculation ─────────────────────────────────────────────────────────────

/// Expungement term for an offence set sentenced to `punishment`. Juvenile
/// offences take priority over every other branch.
pub fn term_rule(punishment: &Punishment, offences: &[&Offence], pre2013: bool) -> TermRule {
  let category = offences
    .iter()
    .map(|o| o.category)
    .max()
    .unwrap_or(Category::Medium);

  if offences.iter().any(|o| o.juvenile) {
    let term = if !punishment.is_imprisonment() {
      Term::Months(6)
    } else if category.is_severe() {
      Term::Years(3)
    } else {
      Term::Years(1)
    };
    return TermRule::Juvenile { term };
  }

  if punishment.is_in_suspension() {
    return TermRule::Suspended;
  }

  if !punishment.is_imprisonment() {
    return TermRule::NonImprisonment { term: Term::Years(1) };
  }

  let years = match category {
    Category::Minor | Category::Medium => 3,
    Category::Serious if pre2013 => 6,
    Category::Serious => 8,
    Category::EspeciallySerious if pre2013 => 8,
    Category::EspeciallySerious => 10,
  };
  TermRule::Imprisonment { category, pre2013, term: Term::Years(years) }
}

/// Apply the decision list: served date first, then the term rule.
pub fn calculate(punishment: &Punishment, offences: &[&Offence], pre2013: bool) -> Expungement {
  let Some(served) = punishment.served_date() else {
    return Expungement::Undetermined;
  };
  let rule = term_rule(punishment, offences, pre2013);
  let date = rule.term().map_or(served, |term| term.after(served));
  Expungement::On { date, served, rule }
}

/// Date for a node absorbed under a revocation: the absorbing operation's
/// merged sentence supplies the served date, while the node keeps its own
/// category and pre-2013 flag.
pub fn hybrid_expungement(
  graph: &NodeGraph,
  id: &NodeId,
  operation: &ConsolidationOperation,
) -> Expungement {
  let offences = graph.underlying_offences(id);
  calculate(&operation.merged_punishment, &offences, graph.any_pre2013(id))
}

/// Expungement of any node. Unknown nodes are undetermined.
pub fn expungement(graph: &NodeGraph, id: &NodeId) -> Expungement {
  let Some(source) = effective_punishment(graph, id) else {
    return Expungement::Undetermined;
  };
  match source {
    DateSource::Own(_) | DateSource::Merged(_) => calculate(
      source.punishment(),
      &graph.underlying_offences(id),
      graph.any_pre2013(id),
    ),
    DateSource::Hybrid(op) => hybrid_expungement(graph, id, op),
    DateSource::Governed(op) => Expungement::GovernedBy { node: op.result_node() },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    consolidation::LegalBasis,
    conviction::Conviction,
    date::parse,
    punishment::PunishmentKind,
  };

  fn d(s: &str) -> NaiveDate { parse(s).unwrap() }

  fn offence(category: Category) -> Offence {
    Offence::new("o", d("2010-01-01"), category)
  }

  #[test]
  fn imprisonment_terms_by_category() {
    let p = Punishment::imprisonment(d("2015-01-01"));
    let cases = [
      (Category::Minor, false, "2018-01-01"),
      (Category::Medium, false, "2018-01-01"),
      (Category::Serious, false, "2023-01-01"),
      (Category::Serious, true, "2021-01-01"),
      (Category::EspeciallySerious, false, "2025-01-01"),
      (Category::EspeciallySerious, true, "2023-01-01"),
    ];
    for (category, pre2013, expected) in cases {
      let o = offence(category);
      assert_eq!(
        calculate(&p, &[&o], pre2013).date(),
        Some(d(expected)),
        "{category:?} pre2013={pre2013}"
      );
    }
  }

  #[test]
  fn missing_served_date_is_undetermined() {
    let o = offence(Category::Serious);
    let p = Punishment::new(PunishmentKind::Imprisonment);
    assert_eq!(calculate(&p, &[&o], false), Expungement::Undetermined);
  }

  #[test]
  fn juvenile_terms() {
    let non_custodial = Punishment::new(PunishmentKind::CorrectionalWork).served_through(d("2015-01-01"));
    let custodial = Punishment::imprisonment(d("2015-01-01"));
    let severe = offence(Category::Serious).juvenile();
    let medium = offence(Category::Medium).juvenile();

    assert_eq!(calculate(&non_custodial, &[&severe], false).date(), Some(d("2015-07-01")));
    assert_eq!(calculate(&custodial, &[&severe], false).date(), Some(d("2018-01-01")));
    assert_eq!(calculate(&custodial, &[&medium], false).date(), Some(d("2016-01-01")));
  }

  #[test]
  fn juvenile_outranks_suspension() {
    let p = Punishment::imprisonment(d("2015-01-01")).suspended();
    let o = offence(Category::Medium).juvenile();
    let e = calculate(&p, &[&o], false);
    assert!(matches!(e, Expungement::On { rule: TermRule::Juvenile { .. }, .. }));
  }

  #[test]
  fn suspended_spent_at_probation_end() {
    let p = Punishment::imprisonment(d("2018-01-01")).suspended();
    let o = offence(Category::Serious);
    let e = calculate(&p, &[&o], false);
    assert_eq!(e.date(), Some(d("2018-01-01")));
    assert!(matches!(e, Expungement::On { rule: TermRule::Suspended, .. }));
  }

  #[test]
  fn cancelled_suspension_runs_full_term() {
    let p = Punishment::imprisonment(d("2018-01-01"))
      .suspended()
      .suspension_cancelled_on(d("2016-01-01"));
    let o = offence(Category::Serious);
    assert_eq!(calculate(&p, &[&o], false).date(), Some(d("2026-01-01")));
  }

  #[test]
  fn non_imprisonment_one_year() {
    let p = Punishment::new(PunishmentKind::Fine).served_through(d("2019-03-15"));
    let o = offence(Category::EspeciallySerious);
    assert_eq!(calculate(&p, &[&o], false).date(), Some(d("2020-03-15")));
  }

  #[test]
  fn later_served_never_expunges_earlier() {
    let o = offence(Category::Serious);
    let mut previous = None;
    for day in ["2015-01-01", "2015-02-28", "2016-02-29", "2016-03-01", "2020-12-31"] {
      let e = calculate(&Punishment::imprisonment(d(day)), &[&o], false).date();
      assert!(e >= previous);
      previous = e;
    }
  }

  #[test]
  fn active_on_is_strict() {
    let e = Expungement::On {
      date:   d("2023-01-01"),
      served: d("2015-01-01"),
      rule:   TermRule::Suspended,
    };
    assert!(e.is_active_on(d("2022-12-31")));
    assert!(!e.is_active_on(d("2023-01-01")));
    assert!(Expungement::Undetermined.is_active_on(d("2100-01-01")));
  }

  fn two_convictions(basis: LegalBasis) -> NodeGraph {
    let suspended = Conviction::new(
      "s",
      vec![Offence::new("s1", d("2014-06-01"), Category::Serious)],
      Punishment::imprisonment(d("2018-01-01")).suspended(),
    )
    .unwrap();
    let real = Conviction::new(
      "r",
      vec![Offence::new("r1", d("2015-04-01"), Category::Medium)],
      Punishment::imprisonment(d("2017-01-01")),
    )
    .unwrap();
    let op = ConsolidationOperation::new(
      "op",
      basis,
      vec![NodeId::conviction("s"), NodeId::conviction("r")],
      NodeId::conviction("r"),
      Punishment::imprisonment(d("2019-01-01")),
    );
    NodeGraph::build(vec![suspended, real], vec![op]).unwrap()
  }

  #[test]
  fn revocation_uses_operation_clock_and_own_term() {
    let g = two_convictions(LegalBasis::SuspensionRevocation);
    // Serious, own term 8 years, from the merged served date.
    assert_eq!(expungement(&g, &NodeId::conviction("s")).date(), Some(d("2027-01-01")));
    // Medium, own term 3 years, same clock.
    assert_eq!(expungement(&g, &NodeId::conviction("r")).date(), Some(d("2022-01-01")));
    // Result node: max category across both.
    assert_eq!(expungement(&g, &NodeId::operation("op")).date(), Some(d("2027-01-01")));
  }

  #[test]
  fn cumulative_children_defer_to_result() {
    let g = two_convictions(LegalBasis::Cumulative);
    assert_eq!(
      expungement(&g, &NodeId::conviction("s")),
      Expungement::GovernedBy { node: NodeId::operation("op") }
    );
    assert!(matches!(
      effective_punishment(&g, &NodeId::operation("op")),
      Some(DateSource::Merged(_))
    ));
  }
}
