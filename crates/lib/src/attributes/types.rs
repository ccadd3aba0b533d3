//! Attribute, value and attribute set types.
//!
//! An [`Attribute`] is a named, typed classification key. An [`AttributeSet`]
//! maps attributes to values and is immutable once built. Sets are kept in a
//! canonical order (by attribute name) so that equality and hashing only
//! depend on their entries.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The type of values an attribute accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
  String,
  Boolean,
  Integer,
  Version,
}

impl AttributeType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::String => "string",
      Self::Boolean => "boolean",
      Self::Integer => "integer",
      Self::Version => "version",
    }
  }

  /// Whether values of this type have a meaningful "higher/lower" ordering.
  pub fn is_ordered(&self) -> bool {
    !matches!(self, Self::Boolean)
  }
}

impl fmt::Display for AttributeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A typed attribute value.
///
/// Values of the same type are totally ordered; versions use semantic
/// version precedence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
  String(String),
  Boolean(bool),
  Integer(i64),
  Version(semver::Version),
}

impl AttributeValue {
  pub fn value_type(&self) -> AttributeType {
    match self {
      Self::String(_) => AttributeType::String,
      Self::Boolean(_) => AttributeType::Boolean,
      Self::Integer(_) => AttributeType::Integer,
      Self::Version(_) => AttributeType::Version,
    }
  }
}

impl fmt::Display for AttributeValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::String(s) => write!(f, "{}", s),
      Self::Boolean(b) => write!(f, "{}", b),
      Self::Integer(i) => write!(f, "{}", i),
      Self::Version(v) => write!(f, "{}", v),
    }
  }
}

impl From<&str> for AttributeValue {
  fn from(value: &str) -> Self {
    Self::String(value.to_string())
  }
}

impl From<String> for AttributeValue {
  fn from(value: String) -> Self {
    Self::String(value)
  }
}

impl From<bool> for AttributeValue {
  fn from(value: bool) -> Self {
    Self::Boolean(value)
  }
}

impl From<i64> for AttributeValue {
  fn from(value: i64) -> Self {
    Self::Integer(value)
  }
}

impl From<semver::Version> for AttributeValue {
  fn from(value: semver::Version) -> Self {
    Self::Version(value)
  }
}

/// A named, typed classification key.
///
/// Two attributes are equal when both name and type are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attribute {
  name: Arc<str>,
  value_type: AttributeType,
}

impl Attribute {
  pub fn new(name: &str, value_type: AttributeType) -> Self {
    Self {
      name: Arc::from(name),
      value_type,
    }
  }

  pub fn string(name: &str) -> Self {
    Self::new(name, AttributeType::String)
  }

  pub fn boolean(name: &str) -> Self {
    Self::new(name, AttributeType::Boolean)
  }

  pub fn integer(name: &str) -> Self {
    Self::new(name, AttributeType::Integer)
  }

  pub fn version(name: &str) -> Self {
    Self::new(name, AttributeType::Version)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn value_type(&self) -> AttributeType {
    self.value_type
  }

  /// Check that `value` has this attribute's type.
  pub fn check_value(&self, value: &AttributeValue) -> Result<(), AttributeError> {
    if value.value_type() == self.value_type {
      Ok(())
    } else {
      Err(AttributeError::TypeMismatch {
        attribute: self.name.to_string(),
        expected: self.value_type,
        found: value.value_type(),
        value: value.to_string(),
      })
    }
  }
}

impl fmt::Display for Attribute {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// Errors raised while building attribute sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
  #[error("value '{value}' of type {found} does not fit attribute '{attribute}' of type {expected}")]
  TypeMismatch {
    attribute: String,
    expected: AttributeType,
    found: AttributeType,
    value: String,
  },

  #[error("attribute '{name}' is already present with type {existing}, cannot add it as {requested}")]
  ConflictingType {
    name: String,
    existing: AttributeType,
    requested: AttributeType,
  },
}

/// A resolved (attribute, value) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeEntry {
  pub attribute: Attribute,
  pub value: AttributeValue,
}

impl fmt::Display for AttributeEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}={}", self.attribute, self.value)
  }
}

/// An immutable mapping from attributes to values.
///
/// Attribute names are unique within a set. Entries are kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributeSet {
  entries: Vec<AttributeEntry>,
}

impl AttributeSet {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn builder() -> AttributeSetBuilder {
    AttributeSetBuilder::default()
  }

  /// Build a set from `(attribute, value)` pairs.
  pub fn of<I, V>(pairs: I) -> Result<Self, AttributeError>
  where
    I: IntoIterator<Item = (Attribute, V)>,
    V: Into<AttributeValue>,
  {
    let mut builder = Self::builder();
    for (attribute, value) in pairs {
      builder = builder.with(attribute, value)?;
    }
    Ok(builder.build())
  }

  /// Look up the value for exactly this attribute (name and type).
  pub fn get(&self, attribute: &Attribute) -> Option<&AttributeValue> {
    self
      .entry(attribute.name())
      .filter(|e| e.attribute == *attribute)
      .map(|e| &e.value)
  }

  /// Look up an entry by attribute name.
  pub fn entry(&self, name: &str) -> Option<&AttributeEntry> {
    self
      .entries
      .binary_search_by(|e| e.attribute.name().cmp(name))
      .ok()
      .map(|idx| &self.entries[idx])
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entry(name).is_some()
  }

  pub fn entries(&self) -> &[AttributeEntry] {
    &self.entries
  }

  pub fn keys(&self) -> impl Iterator<Item = &Attribute> {
    self.entries.iter().map(|e| &e.attribute)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Union of both sets; values from `other` win on shared attributes.
  pub fn merge(&self, other: &AttributeSet) -> Result<AttributeSet, AttributeError> {
    let mut builder = AttributeSetBuilder {
      entries: self.entries.clone(),
    };
    for entry in &other.entries {
      builder = builder.with(entry.attribute.clone(), entry.value.clone())?;
    }
    Ok(builder.build())
  }
}

impl fmt::Display for AttributeSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, entry) in self.entries.iter().enumerate() {
      if i > 0 {
        write!(f, ", ")?;
      }
      write!(f, "{}", entry)?;
    }
    write!(f, "}}")
  }
}

/// Mutable staging area for an [`AttributeSet`].
#[derive(Debug, Default)]
pub struct AttributeSetBuilder {
  entries: Vec<AttributeEntry>,
}

impl AttributeSetBuilder {
  /// Add or replace the value for `attribute`.
  pub fn with(mut self, attribute: Attribute, value: impl Into<AttributeValue>) -> Result<Self, AttributeError> {
    let value = value.into();
    attribute.check_value(&value)?;

    match self
      .entries
      .binary_search_by(|e| e.attribute.name().cmp(attribute.name()))
    {
      Ok(idx) => {
        let existing = &self.entries[idx].attribute;
        if existing.value_type() != attribute.value_type() {
          return Err(AttributeError::ConflictingType {
            name: attribute.name().to_string(),
            existing: existing.value_type(),
            requested: attribute.value_type(),
          });
        }
        self.entries[idx].value = value;
      }
      Err(idx) => self.entries.insert(idx, AttributeEntry { attribute, value }),
    }
    Ok(self)
  }

  pub fn build(self) -> AttributeSet {
    AttributeSet { entries: self.entries }
  }
}

/// Anything that exposes an attribute set for matching.
pub trait MatchingCandidate {
  fn attributes(&self) -> &AttributeSet;
}

impl MatchingCandidate for AttributeSet {
  fn attributes(&self) -> &AttributeSet {
    self
  }
}

impl<T: MatchingCandidate + ?Sized> MatchingCandidate for &T {
  fn attributes(&self) -> &AttributeSet {
    (**self).attributes()
  }
}
