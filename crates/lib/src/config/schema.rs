use std::collections::BTreeMap;

use serde::Deserialize;

use crate::attributes::{
  AtLeastRule, AtMostRule, Attribute, AttributeRegistration, AttributeSchema, AttributeType, CompatibleValuesRule,
  PreferHighest, PreferLowest, PreferOrdered, PreferRequested, SchemaBuilder, SchemaError,
};

use super::{ConfigError, coerce, coerce_key, read};

/// Schema document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
  /// Required; an absent list is reported when the schema is built.
  #[serde(default)]
  pub precedence: Option<Vec<String>>,
  #[serde(default)]
  pub attributes: Vec<AttributeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeConfig {
  pub name: String,
  #[serde(rename = "type")]
  pub value_type: AttributeType,
  #[serde(default)]
  pub mandatory: bool,
  #[serde(default)]
  pub compatibility: CompatibilityConfig,
  #[serde(default)]
  pub disambiguation: DisambiguationConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum CompatibilityConfig {
  #[default]
  Equality,
  AtMost,
  AtLeast,
  /// Requested value (as a table key) to the candidate values it accepts.
  CompatibleValues { values: BTreeMap<String, Vec<toml::Value>> },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum DisambiguationConfig {
  #[default]
  None,
  PreferRequested,
  Highest,
  Lowest,
  Ordered { order: Vec<toml::Value> },
}

impl SchemaConfig {
  pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }

  pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
    Self::from_toml(&read(path)?)
  }

  /// Translate the document into the configuration phase of a schema.
  pub fn to_builder(&self) -> Result<SchemaBuilder, ConfigError> {
    let mut builder = SchemaBuilder::new();
    let mut declared = BTreeMap::new();
    for config in &self.attributes {
      let registration = config.to_registration()?;
      declared.insert(config.name.as_str(), registration.attribute().clone());
      builder = builder.register(registration);
    }

    if let Some(names) = &self.precedence {
      let precedence = names
        .iter()
        .map(|name| {
          declared
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| SchemaError::UnknownPrecedenceAttribute { name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;
      builder = builder.precedence(precedence);
    }
    Ok(builder)
  }

  pub fn build(&self) -> Result<AttributeSchema, ConfigError> {
    Ok(self.to_builder()?.build()?)
  }
}

impl AttributeConfig {
  fn to_registration(&self) -> Result<AttributeRegistration, ConfigError> {
    let attribute = Attribute::new(&self.name, self.value_type);
    let mut registration = AttributeRegistration::new(attribute.clone());
    if self.mandatory {
      registration = registration.mandatory();
    }

    registration = match &self.compatibility {
      CompatibilityConfig::Equality => registration,
      CompatibilityConfig::AtMost => registration.compatibility(AtMostRule),
      CompatibilityConfig::AtLeast => registration.compatibility(AtLeastRule),
      CompatibilityConfig::CompatibleValues { values } => {
        let mut rule = CompatibleValuesRule::new();
        for (requested, accepted) in values {
          let requested = coerce_key(&attribute, requested)?;
          for candidate in accepted {
            rule = rule.accept(requested.clone(), coerce(&attribute, candidate)?);
          }
        }
        registration.compatibility(rule)
      }
    };

    registration = match &self.disambiguation {
      DisambiguationConfig::None => registration,
      DisambiguationConfig::PreferRequested => registration.disambiguation(PreferRequested),
      DisambiguationConfig::Highest => registration.disambiguation(PreferHighest),
      DisambiguationConfig::Lowest => registration.disambiguation(PreferLowest),
      DisambiguationConfig::Ordered { order } => {
        let order = order
          .iter()
          .map(|v| coerce(&attribute, v))
          .collect::<Result<Vec<_>, _>>()?;
        registration.disambiguation(PreferOrdered::new(order))
      }
    };
    Ok(registration)
  }
}
