//! Compatibility and disambiguation strategies.
//!
//! Every attribute registered in a schema carries one [`CompatibilityRule`]
//! (is a candidate value acceptable for a requested value?) and one
//! [`DisambiguationRule`] (which of several acceptable values are preferred?).
//! Rules are plain trait objects so that callers can plug in their own.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::types::AttributeValue;

/// Decides whether a candidate value satisfies a requested value.
pub trait CompatibilityRule: fmt::Debug + Send + Sync {
  fn is_compatible(&self, candidate: &AttributeValue, requested: &AttributeValue) -> bool;

  /// Whether the rule relies on values being ordered.
  fn requires_ordering(&self) -> bool {
    false
  }
}

/// Picks the preferred values among those carried by the remaining candidates.
///
/// `candidates` is never empty. Returning every value means "no preference".
pub trait DisambiguationRule: fmt::Debug + Send + Sync {
  fn best_values(
    &self,
    requested: Option<&AttributeValue>,
    candidates: &BTreeSet<AttributeValue>,
  ) -> BTreeSet<AttributeValue>;

  fn requires_ordering(&self) -> bool {
    false
  }

  /// Whether the rule can ever narrow a candidate set.
  fn is_trivial(&self) -> bool {
    false
  }
}

/// Values are compatible only when equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualityRule;

impl CompatibilityRule for EqualityRule {
  fn is_compatible(&self, candidate: &AttributeValue, requested: &AttributeValue) -> bool {
    candidate == requested
  }
}

/// Compatible when the candidate is not above the request,
/// e.g. a library targeting runtime level 11 runs on level 17.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtMostRule;

impl CompatibilityRule for AtMostRule {
  fn is_compatible(&self, candidate: &AttributeValue, requested: &AttributeValue) -> bool {
    candidate <= requested
  }

  fn requires_ordering(&self) -> bool {
    true
  }
}

/// Compatible when the candidate is not below the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtLeastRule;

impl CompatibilityRule for AtLeastRule {
  fn is_compatible(&self, candidate: &AttributeValue, requested: &AttributeValue) -> bool {
    candidate >= requested
  }

  fn requires_ordering(&self) -> bool {
    true
  }
}

/// Equality plus an explicit list of accepted candidate values per request.
#[derive(Debug, Clone, Default)]
pub struct CompatibleValuesRule {
  accepted: BTreeMap<AttributeValue, BTreeSet<AttributeValue>>,
}

impl CompatibleValuesRule {
  pub fn new() -> Self {
    Self::default()
  }

  /// Accept `candidate` when `requested` is asked for.
  pub fn accept(mut self, requested: impl Into<AttributeValue>, candidate: impl Into<AttributeValue>) -> Self {
    self.accepted.entry(requested.into()).or_default().insert(candidate.into());
    self
  }
}

impl CompatibilityRule for CompatibleValuesRule {
  fn is_compatible(&self, candidate: &AttributeValue, requested: &AttributeValue) -> bool {
    candidate == requested
      || self
        .accepted
        .get(requested)
        .is_some_and(|accepted| accepted.contains(candidate))
  }
}

/// Never narrows: every value is as good as any other.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreference;

impl DisambiguationRule for NoPreference {
  fn best_values(
    &self,
    _requested: Option<&AttributeValue>,
    candidates: &BTreeSet<AttributeValue>,
  ) -> BTreeSet<AttributeValue> {
    candidates.clone()
  }

  fn is_trivial(&self) -> bool {
    true
  }
}

/// An exact match for the requested value wins; otherwise no preference.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferRequested;

impl DisambiguationRule for PreferRequested {
  fn best_values(
    &self,
    requested: Option<&AttributeValue>,
    candidates: &BTreeSet<AttributeValue>,
  ) -> BTreeSet<AttributeValue> {
    exact_match(requested, candidates).unwrap_or_else(|| candidates.clone())
  }
}

/// An exact match wins; otherwise the highest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferHighest;

impl DisambiguationRule for PreferHighest {
  fn best_values(
    &self,
    requested: Option<&AttributeValue>,
    candidates: &BTreeSet<AttributeValue>,
  ) -> BTreeSet<AttributeValue> {
    exact_match(requested, candidates)
      .or_else(|| candidates.last().map(|v| BTreeSet::from([v.clone()])))
      .unwrap_or_default()
  }

  fn requires_ordering(&self) -> bool {
    true
  }
}

/// An exact match wins; otherwise the lowest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferLowest;

impl DisambiguationRule for PreferLowest {
  fn best_values(
    &self,
    requested: Option<&AttributeValue>,
    candidates: &BTreeSet<AttributeValue>,
  ) -> BTreeSet<AttributeValue> {
    exact_match(requested, candidates)
      .or_else(|| candidates.first().map(|v| BTreeSet::from([v.clone()])))
      .unwrap_or_default()
  }

  fn requires_ordering(&self) -> bool {
    true
  }
}

/// An exact match wins; otherwise the first value of a preference list that
/// is present. Values outside the list are never preferred over listed ones.
#[derive(Debug, Clone, Default)]
pub struct PreferOrdered {
  order: Vec<AttributeValue>,
}

impl PreferOrdered {
  pub fn new<I, V>(order: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<AttributeValue>,
  {
    Self {
      order: order.into_iter().map(Into::into).collect(),
    }
  }

  pub fn order(&self) -> &[AttributeValue] {
    &self.order
  }
}

impl DisambiguationRule for PreferOrdered {
  fn best_values(
    &self,
    requested: Option<&AttributeValue>,
    candidates: &BTreeSet<AttributeValue>,
  ) -> BTreeSet<AttributeValue> {
    exact_match(requested, candidates)
      .or_else(|| {
        self
          .order
          .iter()
          .find(|v| candidates.contains(*v))
          .map(|v| BTreeSet::from([v.clone()]))
      })
      .unwrap_or_else(|| candidates.clone())
  }
}

fn exact_match(
  requested: Option<&AttributeValue>,
  candidates: &BTreeSet<AttributeValue>,
) -> Option<BTreeSet<AttributeValue>> {
  requested
    .filter(|r| candidates.contains(*r))
    .map(|r| BTreeSet::from([r.clone()]))
}
