//! Components, variants and the identity given to a selected variant.

pub mod select;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attributes::{AttributeSet, MatchingCandidate};

pub use select::{ComponentFilter, ResolutionError, VariantSelector};

/// Identity of the component owning a set of variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ComponentIdentifier {
  /// Produced by another project of this build.
  Project { path: String },
  /// Produced by an external dependency.
  Module {
    group: String,
    name: String,
    version: String,
  },
}

impl ComponentIdentifier {
  pub fn project(path: &str) -> Self {
    Self::Project { path: path.to_string() }
  }

  pub fn module(group: &str, name: &str, version: &str) -> Self {
    Self::Module {
      group: group.to_string(),
      name: name.to_string(),
      version: version.to_string(),
    }
  }

  pub fn is_project(&self) -> bool {
    matches!(self, Self::Project { .. })
  }
}

impl fmt::Display for ComponentIdentifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Project { path } => write!(f, "project {}", path),
      Self::Module { group, name, version } => write!(f, "{}:{}:{}", group, name, version),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid component identifier '{input}': expected project:<path> or module:<group>:<name>:<version>")]
pub struct ComponentParseError {
  pub input: String,
}

impl FromStr for ComponentIdentifier {
  type Err = ComponentParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || ComponentParseError { input: s.to_string() };
    match s.split_once(':') {
      Some(("project", path)) if !path.is_empty() => Ok(Self::project(path)),
      Some(("module", rest)) => {
        let parts: Vec<&str> = rest.split(':').collect();
        match parts.as_slice() {
          [group, name, version] if parts.iter().all(|p| !p.is_empty()) => Ok(Self::module(group, name, version)),
          _ => Err(invalid()),
        }
      }
      _ => Err(invalid()),
    }
  }
}

/// Identity of a selected variant: owning component plus display name.
///
/// Created once, when a variant wins selection. Usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantIdentifier {
  component: ComponentIdentifier,
  display_name: String,
}

impl VariantIdentifier {
  pub fn new(component: ComponentIdentifier, display_name: &str) -> Self {
    Self {
      component,
      display_name: display_name.to_string(),
    }
  }

  pub fn component(&self) -> &ComponentIdentifier {
    &self.component
  }

  pub fn display_name(&self) -> &str {
    &self.display_name
  }
}

impl fmt::Display for VariantIdentifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "variant '{}' of {}", self.display_name, self.component)
  }
}

/// A candidate variant offered by a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
  pub component: ComponentIdentifier,
  pub name: String,
  pub attributes: AttributeSet,
}

impl Variant {
  pub fn new(component: ComponentIdentifier, name: &str, attributes: AttributeSet) -> Self {
    Self {
      component,
      name: name.to_string(),
      attributes,
    }
  }

  pub fn identifier(&self) -> VariantIdentifier {
    VariantIdentifier::new(self.component.clone(), &self.name)
  }
}

impl MatchingCandidate for Variant {
  fn attributes(&self) -> &AttributeSet {
    &self.attributes
  }
}
