use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::attributes::{Attribute, AttributeSchema, AttributeSet};
use crate::variant::{ComponentFilter, ComponentIdentifier, Variant};

use super::{ConfigError, SchemaConfig, coerce, infer_type, read};

/// Match request document: a schema plus the request and its candidates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchRequestConfig {
  #[serde(flatten)]
  pub schema: SchemaConfig,
  #[serde(default)]
  pub filter: ComponentFilter,
  #[serde(default)]
  pub request: BTreeMap<String, toml::Value>,
  #[serde(default)]
  pub candidates: Vec<CandidateConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateConfig {
  /// `project:<path>` or `module:<group>:<name>:<version>`.
  pub component: String,
  pub name: String,
  #[serde(default)]
  pub attributes: BTreeMap<String, toml::Value>,
}

/// A match request ready to run.
#[derive(Debug, Clone)]
pub struct MatchRequest {
  pub schema: AttributeSchema,
  pub filter: ComponentFilter,
  pub requested: AttributeSet,
  pub candidates: Vec<Variant>,
}

impl MatchRequestConfig {
  pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_toml(&read(path)?)
  }

  /// Freeze the schema and type every value against it.
  ///
  /// Attributes the schema does not register take the type of their TOML
  /// value, so unregistered request attributes surface as matching errors.
  pub fn resolve(&self) -> Result<MatchRequest, ConfigError> {
    let schema = self.schema.build()?;
    let requested = attribute_set(&schema, &self.request)?;
    let candidates = self
      .candidates
      .iter()
      .map(|candidate| {
        let component = candidate
          .component
          .parse::<ComponentIdentifier>()
          .map_err(|source| ConfigError::Component {
            name: candidate.name.clone(),
            source,
          })?;
        let attributes = attribute_set(&schema, &candidate.attributes)?;
        Ok(Variant::new(component, &candidate.name, attributes))
      })
      .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(MatchRequest {
      schema,
      filter: self.filter,
      requested,
      candidates,
    })
  }
}

fn attribute_set(
  schema: &AttributeSchema,
  values: &BTreeMap<String, toml::Value>,
) -> Result<AttributeSet, ConfigError> {
  let mut builder = AttributeSet::builder();
  for (name, value) in values {
    let attribute = match schema.attribute(name) {
      Some(attribute) => attribute.clone(),
      None => match infer_type(value) {
        Some(value_type) => Attribute::new(name, value_type),
        None => {
          return Err(ConfigError::InvalidValue {
            attribute: name.clone(),
            expected: "a string, boolean or integer".to_string(),
            found: format!("{} {}", value.type_str(), value),
          });
        }
      },
    };
    let value = coerce(&attribute, value)?;
    builder = builder.with(attribute, value)?;
  }
  Ok(builder.build())
}
