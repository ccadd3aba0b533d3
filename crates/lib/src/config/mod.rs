//! TOML configuration for schemas and match requests.
//!
//! A schema document lists attributes with their type and rules plus the
//! disambiguation precedence:
//!
//! ```toml
//! precedence = ["os", "arch"]
//!
//! [[attributes]]
//! name = "os"
//! type = "string"
//! disambiguation = { rule = "prefer-requested" }
//! ```
//!
//! A match request document is a schema document with a `[request]` table
//! and `[[candidates]]`.

mod request;
mod schema;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::attributes::{Attribute, AttributeError, AttributeType, AttributeValue, SchemaError};
use crate::variant::ComponentParseError;

pub use request::{CandidateConfig, MatchRequest, MatchRequestConfig};
pub use schema::{AttributeConfig, CompatibilityConfig, DisambiguationConfig, SchemaConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid configuration: {0}")]
  Syntax(#[from] toml::de::Error),

  #[error(transparent)]
  Schema(#[from] SchemaError),

  #[error("invalid value for attribute '{attribute}': expected {expected}, found {found}")]
  InvalidValue {
    attribute: String,
    expected: String,
    found: String,
  },

  #[error("candidate '{name}': {source}")]
  Component {
    name: String,
    #[source]
    source: ComponentParseError,
  },

  #[error(transparent)]
  Attribute(#[from] AttributeError),
}

fn read(path: &Path) -> Result<String, ConfigError> {
  fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })
}

/// Convert a TOML value into a value of `attribute`'s type.
pub(crate) fn coerce(attribute: &Attribute, value: &toml::Value) -> Result<AttributeValue, ConfigError> {
  match (attribute.value_type(), value) {
    (AttributeType::String, toml::Value::String(s)) => Ok(AttributeValue::String(s.clone())),
    (AttributeType::Boolean, toml::Value::Boolean(b)) => Ok(AttributeValue::Boolean(*b)),
    (AttributeType::Integer, toml::Value::Integer(i)) => Ok(AttributeValue::Integer(*i)),
    (AttributeType::Version, toml::Value::String(s)) => parse_version(attribute, s),
    (expected, other) => Err(ConfigError::InvalidValue {
      attribute: attribute.name().to_string(),
      expected: expected.to_string(),
      found: format!("{} {}", other.type_str(), other),
    }),
  }
}

/// Convert a TOML table key into a value of `attribute`'s type.
pub(crate) fn coerce_key(attribute: &Attribute, key: &str) -> Result<AttributeValue, ConfigError> {
  let invalid = || ConfigError::InvalidValue {
    attribute: attribute.name().to_string(),
    expected: attribute.value_type().to_string(),
    found: format!("'{}'", key),
  };
  match attribute.value_type() {
    AttributeType::String => Ok(AttributeValue::String(key.to_string())),
    AttributeType::Boolean => key.parse().map(AttributeValue::Boolean).map_err(|_| invalid()),
    AttributeType::Integer => key.parse().map(AttributeValue::Integer).map_err(|_| invalid()),
    AttributeType::Version => parse_version(attribute, key),
  }
}

fn parse_version(attribute: &Attribute, value: &str) -> Result<AttributeValue, ConfigError> {
  semver::Version::parse(value)
    .map(AttributeValue::Version)
    .map_err(|e| ConfigError::InvalidValue {
      attribute: attribute.name().to_string(),
      expected: "a semantic version".to_string(),
      found: format!("'{}' ({})", value, e),
    })
}

/// The type a TOML value would have as an attribute value, if any.
pub(crate) fn infer_type(value: &toml::Value) -> Option<AttributeType> {
  match value {
    toml::Value::String(_) => Some(AttributeType::String),
    toml::Value::Boolean(_) => Some(AttributeType::Boolean),
    toml::Value::Integer(_) => Some(AttributeType::Integer),
    _ => None,
  }
}
