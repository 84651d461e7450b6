//! The recidivism decision tree (art. 18 of the Criminal Code).
//!
//! Rules are tried in statutory priority order; the first that matches
//! decides. The classifier is total: it never fails, and absent data falls
//! through to "no recidivism" or "simple".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  offence::{Category, MensRea, Offence},
  punishment::Punishment,
};

/// Kind of recidivism.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
  None,
  Simple,
  Dangerous,
  EspeciallyDangerous,
}

impl Classification {
  pub fn is_recidivism(self) -> bool { self != Self::None }

  pub fn label(self) -> &'static str {
    match self {
      Self::None => "no recidivism",
      Self::Simple => "simple recidivism",
      Self::Dangerous => "dangerous recidivism",
      Self::EspeciallyDangerous => "especially dangerous recidivism",
    }
  }
}

impl fmt::Display for Classification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// The branch of the decision tree that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
  NegligentNewOffence,
  NoEligiblePriors,
  SeriousAfterTwoSeriousImprisonments,
  EspeciallySeriousAfterSevereImprisonment,
  SeriousAfterTwoMediumImprisonments,
  SeriousAfterSeverePrior,
  ActiveIntentionalPrior,
}

impl Rule {
  /// Position in the decision list.
  pub fn number(self) -> u8 {
    match self {
      Self::NegligentNewOffence => 1,
      Self::NoEligiblePriors => 2,
      Self::SeriousAfterTwoSeriousImprisonments => 4,
      Self::EspeciallySeriousAfterSevereImprisonment => 5,
      Self::SeriousAfterTwoMediumImprisonments => 6,
      Self::SeriousAfterSeverePrior => 7,
      Self::ActiveIntentionalPrior => 8,
    }
  }

  pub fn classification(self) -> Classification {
    match self {
      Self::NegligentNewOffence | Self::NoEligiblePriors => Classification::None,
      Self::SeriousAfterTwoSeriousImprisonments
      | Self::EspeciallySeriousAfterSevereImprisonment => {
        Classification::EspeciallyDangerous
      }
      Self::SeriousAfterTwoMediumImprisonments | Self::SeriousAfterSeverePrior => {
        Classification::Dangerous
      }
      Self::ActiveIntentionalPrior => Classification::Simple,
    }
  }

  /// Fixed statutory justification.
  pub fn justification(self) -> &'static str {
    match self {
      Self::NegligentNewOffence => {
        "The new offence was committed through negligence (part 1 of art. 18)."
      }
      Self::NoEligiblePriors => {
        "No active conviction for an intentional offence of medium or greater \
         gravity (part 1 of art. 18)."
      }
      Self::SeriousAfterTwoSeriousImprisonments => {
        "Serious offence after two or more convictions for serious intentional \
         offences with real imprisonment (cl. a, part 3 of art. 18)."
      }
      Self::EspeciallySeriousAfterSevereImprisonment => {
        "Especially serious offence after two convictions for serious offences \
         or a conviction for an especially serious offence with real \
         imprisonment (cl. b, part 3 of art. 18)."
      }
      Self::SeriousAfterTwoMediumImprisonments => {
        "Serious offence after two or more convictions for intentional offences \
         of medium gravity with real imprisonment (cl. a, part 2 of art. 18)."
      }
      Self::SeriousAfterSeverePrior => {
        "Serious offence after a conviction for a serious or especially serious \
         intentional offence (cl. b, part 2 of art. 18)."
      }
      Self::ActiveIntentionalPrior => {
        "Active conviction for an intentional offence (part 1 of art. 18)."
      }
    }
  }
}

/// One eligible prior node, reduced to its representative offence and its
/// effective punishment.
#[derive(Debug, Clone, Copy)]
pub struct Prior<'a> {
  pub offence:    &'a Offence,
  pub punishment: &'a Punishment,
}

impl Prior<'_> {
  fn category(&self) -> Category { self.offence.category }

  fn real_imprisonment(&self) -> bool { self.punishment.is_real_imprisonment() }
}

/// Apply the decision tree to a new offence and its eligible priors.
pub fn classify(new_offence: &Offence, priors: &[Prior<'_>]) -> Rule {
  if new_offence.mens_rea == MensRea::Negligent {
    return Rule::NegligentNewOffence;
  }
  if priors.is_empty() {
    return Rule::NoEligiblePriors;
  }

  let count = |pred: fn(&Prior<'_>) -> bool| priors.iter().filter(|p| pred(*p)).count();
  let severe = count(|p| p.category().is_severe());
  let medium = count(|p| p.category() == Category::Medium);
  let real = count(|p| p.real_imprisonment());
  let heavy = count(|p| p.category() == Category::Serious && p.real_imprisonment());
  let severe_real = count(|p| p.category().is_severe() && p.real_imprisonment());

  match new_offence.category {
    Category::Serious if heavy >= 2 => Rule::SeriousAfterTwoSeriousImprisonments,
    Category::EspeciallySerious if heavy >= 2 || severe_real >= 1 => {
      Rule::EspeciallySeriousAfterSevereImprisonment
    }
    Category::Serious if medium >= 2 && real >= 2 => Rule::SeriousAfterTwoMediumImprisonments,
    Category::Serious if severe >= 1 => Rule::SeriousAfterSeverePrior,
    _ => Rule::ActiveIntentionalPrior,
  }
}
