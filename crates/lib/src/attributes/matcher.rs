//! Attribute matching and disambiguation.
//!
//! # Algorithm Overview
//!
//! 1. Keep every candidate whose attributes are compatible with the request
//! 2. Zero or one survivor is returned as is
//! 3. Otherwise walk the schema precedence; for each attribute, ask its
//!    disambiguation rule which of the values carried by the survivors are
//!    best and drop survivors carrying any other value
//! 4. Stop as soon as one survivor is left and return what remains
//!
//! An empty result means "no match" and more than one means "ambiguous";
//! neither is an error here. Errors are reserved for configuration bugs such
//! as requesting an attribute the schema does not know.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use super::schema::{AttributeRegistration, AttributeSchema};
use super::types::{
  Attribute, AttributeEntry, AttributeError, AttributeSet, AttributeType, AttributeValue, MatchingCandidate,
};

/// Programmer errors detected while matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
  #[error("attribute '{name}' is not registered in the schema")]
  UnregisteredAttribute { name: String },

  #[error("attribute '{attribute}' is registered as {expected} but used as {found}")]
  TypeMismatch {
    attribute: String,
    expected: AttributeType,
    found: AttributeType,
  },

  #[error(transparent)]
  Value(#[from] AttributeError),
}

/// How one requested attribute fared against one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingDescription {
  pub requested: AttributeEntry,
  pub found: Option<AttributeEntry>,
  pub is_match: bool,
}

impl fmt::Display for MatchingDescription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let verdict = if self.is_match { "compatible" } else { "incompatible" };
    match &self.found {
      Some(found) => write!(
        f,
        "{}: requested '{}', found '{}' ({})",
        self.requested.attribute, self.requested.value, found.value, verdict
      ),
      None => write!(
        f,
        "{}: requested '{}', not provided ({})",
        self.requested.attribute, self.requested.value, verdict
      ),
    }
  }
}

/// Stateless matcher over a frozen schema.
///
/// Cloning is cheap; clones share the schema.
#[derive(Debug, Clone)]
pub struct AttributeMatcher {
  schema: Arc<AttributeSchema>,
}

impl AttributeMatcher {
  pub fn new(schema: AttributeSchema) -> Self {
    Self {
      schema: Arc::new(schema),
    }
  }

  pub fn from_shared(schema: Arc<AttributeSchema>) -> Self {
    Self { schema }
  }

  pub fn schema(&self) -> &AttributeSchema {
    &self.schema
  }

  /// True when every requested attribute is either absent from the candidate
  /// (and not mandatory) or accepted by its compatibility rule.
  pub fn is_matching_candidate(&self, candidate: &AttributeSet, requested: &AttributeSet) -> Result<bool, MatchError> {
    for entry in requested.entries() {
      let registration = self.registration_for(&entry.attribute)?;
      match self.value_in(candidate, registration)? {
        None => {
          if registration.is_mandatory() {
            return Ok(false);
          }
        }
        Some(value) => {
          if !registration.compatibility_rule().is_compatible(value, &entry.value) {
            return Ok(false);
          }
        }
      }
    }
    Ok(true)
  }

  /// True when every attribute present in both sets is compatible in at
  /// least one direction. Attributes unique to either side are ignored, and
  /// shared attributes the schema does not know are compared for equality.
  pub fn are_mutually_compatible(&self, first: &AttributeSet, second: &AttributeSet) -> Result<bool, MatchError> {
    for entry in first.entries() {
      let Some(other) = second.entry(entry.attribute.name()) else {
        continue;
      };

      let compatible = match self.schema.registration(entry.attribute.name()) {
        Some(registration) => {
          let a = self.value_in(first, registration)?;
          let b = self.value_in(second, registration)?;
          match (a, b) {
            (Some(a), Some(b)) => {
              let rule = registration.compatibility_rule();
              rule.is_compatible(a, b) || rule.is_compatible(b, a)
            }
            _ => true,
          }
        }
        None => entry.attribute == other.attribute && entry.value == other.value,
      };

      if !compatible {
        return Ok(false);
      }
    }
    Ok(true)
  }

  /// Apply one attribute's compatibility rule directly.
  pub fn is_matching_value(
    &self,
    attribute: &Attribute,
    candidate: &AttributeValue,
    requested: &AttributeValue,
  ) -> Result<bool, MatchError> {
    let registration = self.registration_for(attribute)?;
    attribute.check_value(candidate)?;
    attribute.check_value(requested)?;
    Ok(registration.compatibility_rule().is_compatible(candidate, requested))
  }

  /// Select the compatible candidates and disambiguate them.
  ///
  /// The returned references keep the input order.
  pub fn match_multiple_candidates<'c, C>(
    &self,
    candidates: &'c [C],
    requested: &AttributeSet,
  ) -> Result<Vec<&'c C>, MatchError>
  where
    C: MatchingCandidate,
  {
    for entry in requested.entries() {
      self.registration_for(&entry.attribute)?;
    }

    let mut matches = Vec::new();
    for candidate in candidates {
      if self.is_matching_candidate(candidate.attributes(), requested)? {
        matches.push(candidate);
      }
    }
    debug!(
      candidates = candidates.len(),
      compatible = matches.len(),
      "filtered compatible candidates"
    );

    if matches.len() <= 1 {
      return Ok(matches);
    }
    self.disambiguate(matches, requested)
  }

  /// One description per requested attribute. Never fails: unknown
  /// attributes fall back to equality and type conflicts count as mismatches.
  pub fn describe_matching(&self, candidate: &AttributeSet, requested: &AttributeSet) -> Vec<MatchingDescription> {
    requested
      .entries()
      .iter()
      .map(|entry| {
        let found = candidate.entry(entry.attribute.name()).cloned();
        let registration = self.schema.registration(entry.attribute.name());
        let is_match = match (&found, registration) {
          (None, Some(registration)) => !registration.is_mandatory(),
          (None, None) => true,
          (Some(found), Some(registration)) => {
            found.attribute == *registration.attribute()
              && entry.attribute == *registration.attribute()
              && registration.compatibility_rule().is_compatible(&found.value, &entry.value)
          }
          (Some(found), None) => found.attribute == entry.attribute && found.value == entry.value,
        };
        MatchingDescription {
          requested: entry.clone(),
          found,
          is_match,
        }
      })
      .collect()
  }

  fn disambiguate<'c, C>(&self, mut remaining: Vec<&'c C>, requested: &AttributeSet) -> Result<Vec<&'c C>, MatchError>
  where
    C: MatchingCandidate,
  {
    for attribute in self.schema.precedence() {
      if remaining.len() <= 1 {
        break;
      }

      let registration = self.registration_for(attribute)?;
      let rule = registration.disambiguation_rule();
      if rule.is_trivial() {
        continue;
      }

      let mut values = BTreeSet::new();
      for candidate in &remaining {
        if let Some(value) = self.value_in(candidate.attributes(), registration)? {
          values.insert(value.clone());
        }
      }
      if values.is_empty() {
        continue;
      }

      // Values the rule invents cannot select anything.
      let best: BTreeSet<AttributeValue> = rule
        .best_values(requested.get(attribute), &values)
        .into_iter()
        .filter(|value| values.contains(value))
        .collect();
      trace!(attribute = %attribute, values = values.len(), best = best.len(), "disambiguation round");
      if best.is_empty() || best.len() == values.len() {
        continue;
      }

      remaining.retain(|candidate| match candidate.attributes().get(attribute) {
        Some(value) => best.contains(value),
        None => true,
      });
      debug!(attribute = %attribute, remaining = remaining.len(), "narrowed candidates");
    }

    Ok(remaining)
  }

  fn registration_for(&self, attribute: &Attribute) -> Result<&AttributeRegistration, MatchError> {
    let registration = self
      .schema
      .registration(attribute.name())
      .ok_or_else(|| MatchError::UnregisteredAttribute {
        name: attribute.name().to_string(),
      })?;
    check_type(registration, attribute.value_type())?;
    Ok(registration)
  }

  fn value_in<'s>(
    &self,
    set: &'s AttributeSet,
    registration: &AttributeRegistration,
  ) -> Result<Option<&'s AttributeValue>, MatchError> {
    match set.entry(registration.attribute().name()) {
      None => Ok(None),
      Some(entry) => {
        check_type(registration, entry.attribute.value_type())?;
        Ok(Some(&entry.value))
      }
    }
  }
}

fn check_type(registration: &AttributeRegistration, found: AttributeType) -> Result<(), MatchError> {
  let expected = registration.attribute().value_type();
  if expected == found {
    Ok(())
  } else {
    Err(MatchError::TypeMismatch {
      attribute: registration.attribute().name().to_string(),
      expected,
      found,
    })
  }
}
