//! Attribute schema: registered attributes, their rules and their precedence.
//!
//! A schema is configured once through a [`SchemaBuilder`] and then frozen
//! into an immutable [`AttributeSchema`]. Matching only ever sees the frozen
//! form, so it can be shared freely across threads.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use super::rules::{CompatibilityRule, DisambiguationRule, EqualityRule, NoPreference};
use super::types::{Attribute, AttributeType};

/// Errors raised while freezing a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
  #[error("attribute '{name}' is registered more than once")]
  DuplicateAttribute { name: String },

  #[error("no attribute precedence was configured")]
  MissingPrecedence,

  #[error("precedence lists attribute '{name}' which is not registered with that type")]
  UnknownPrecedenceAttribute { name: String },

  #[error("precedence lists attribute '{name}' more than once")]
  DuplicatePrecedence { name: String },

  #[error("attribute '{name}' of type {value_type} has no ordering, but its {rule} rule needs one")]
  UnorderedType {
    name: String,
    value_type: AttributeType,
    rule: &'static str,
  },
}

/// One attribute together with the rules that apply to it.
#[derive(Debug, Clone)]
pub struct AttributeRegistration {
  attribute: Attribute,
  mandatory: bool,
  compatibility: Arc<dyn CompatibilityRule>,
  disambiguation: Arc<dyn DisambiguationRule>,
}

impl AttributeRegistration {
  /// Register `attribute` with equality compatibility and no disambiguation.
  pub fn new(attribute: Attribute) -> Self {
    Self {
      attribute,
      mandatory: false,
      compatibility: Arc::new(EqualityRule),
      disambiguation: Arc::new(NoPreference),
    }
  }

  /// Candidates lacking a mandatory attribute never match a request for it.
  pub fn mandatory(mut self) -> Self {
    self.mandatory = true;
    self
  }

  pub fn compatibility(mut self, rule: impl CompatibilityRule + 'static) -> Self {
    self.compatibility = Arc::new(rule);
    self
  }

  pub fn disambiguation(mut self, rule: impl DisambiguationRule + 'static) -> Self {
    self.disambiguation = Arc::new(rule);
    self
  }

  pub fn attribute(&self) -> &Attribute {
    &self.attribute
  }

  pub fn is_mandatory(&self) -> bool {
    self.mandatory
  }

  pub fn compatibility_rule(&self) -> &dyn CompatibilityRule {
    self.compatibility.as_ref()
  }

  pub fn disambiguation_rule(&self) -> &dyn DisambiguationRule {
    self.disambiguation.as_ref()
  }
}

/// Mutable configuration phase of a schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
  registrations: Vec<AttributeRegistration>,
  precedence: Option<Vec<Attribute>>,
}

impl SchemaBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(mut self, registration: AttributeRegistration) -> Self {
    self.registrations.push(registration);
    self
  }

  /// Set the order in which attributes are used to disambiguate candidates.
  ///
  /// This is required; an empty list is allowed and disables disambiguation.
  pub fn precedence<I>(mut self, attributes: I) -> Self
  where
    I: IntoIterator<Item = Attribute>,
  {
    self.precedence = Some(attributes.into_iter().collect());
    self
  }

  /// Validate the configuration and freeze it.
  pub fn build(self) -> Result<AttributeSchema, SchemaError> {
    let mut registrations = BTreeMap::new();
    for registration in self.registrations {
      let name = registration.attribute.name().to_string();
      check_ordering(&registration)?;
      if registrations.insert(name.clone(), registration).is_some() {
        return Err(SchemaError::DuplicateAttribute { name });
      }
    }

    let precedence = self.precedence.ok_or(SchemaError::MissingPrecedence)?;
    let mut seen = HashSet::new();
    for attribute in &precedence {
      let registered = registrations
        .get(attribute.name())
        .is_some_and(|r: &AttributeRegistration| r.attribute == *attribute);
      if !registered {
        return Err(SchemaError::UnknownPrecedenceAttribute {
          name: attribute.name().to_string(),
        });
      }
      if !seen.insert(attribute.name()) {
        return Err(SchemaError::DuplicatePrecedence {
          name: attribute.name().to_string(),
        });
      }
    }

    for (name, registration) in &registrations {
      if !registration.disambiguation.is_trivial() && !seen.contains(name.as_str()) {
        warn!(attribute = %name, "disambiguation rule is never applied: attribute is missing from precedence");
      }
    }

    Ok(AttributeSchema {
      registrations,
      precedence,
    })
  }
}

fn check_ordering(registration: &AttributeRegistration) -> Result<(), SchemaError> {
  let value_type = registration.attribute.value_type();
  if value_type.is_ordered() {
    return Ok(());
  }
  let rule = if registration.compatibility.requires_ordering() {
    "compatibility"
  } else if registration.disambiguation.requires_ordering() {
    "disambiguation"
  } else {
    return Ok(());
  };
  Err(SchemaError::UnorderedType {
    name: registration.attribute.name().to_string(),
    value_type,
    rule,
  })
}

/// A frozen attribute schema.
#[derive(Debug, Clone)]
pub struct AttributeSchema {
  registrations: BTreeMap<String, AttributeRegistration>,
  precedence: Vec<Attribute>,
}

impl AttributeSchema {
  pub fn builder() -> SchemaBuilder {
    SchemaBuilder::new()
  }

  /// Look up the registered attribute with this name.
  pub fn attribute(&self, name: &str) -> Option<&Attribute> {
    self.registrations.get(name).map(|r| &r.attribute)
  }

  pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
    self.registrations.values().map(|r| &r.attribute)
  }

  pub fn registration(&self, name: &str) -> Option<&AttributeRegistration> {
    self.registrations.get(name)
  }

  pub fn precedence(&self) -> &[Attribute] {
    &self.precedence
  }

  pub fn is_mandatory(&self, name: &str) -> bool {
    self.registrations.get(name).is_some_and(|r| r.mandatory)
  }

  pub fn compatibility_rule(&self, name: &str) -> Option<&dyn CompatibilityRule> {
    self.registrations.get(name).map(|r| r.compatibility_rule())
  }

  pub fn disambiguation_rule(&self, name: &str) -> Option<&dyn DisambiguationRule> {
    self.registrations.get(name).map(|r| r.disambiguation_rule())
  }
}
