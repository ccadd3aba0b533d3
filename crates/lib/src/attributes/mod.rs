//! Attribute-based variant matching.
//!
//! This module provides:
//! - [`AttributeSet`]: immutable typed attribute maps carried by candidates and requests
//! - [`AttributeSchema`]: frozen registry of per-attribute rules and the disambiguation precedence
//! - [`AttributeMatcher`]: the stateless filter-then-disambiguate algorithm

pub mod matcher;
pub mod rules;
pub mod schema;
pub mod types;

pub use matcher::{AttributeMatcher, MatchError, MatchingDescription};
pub use rules::{
  AtLeastRule, AtMostRule, CompatibilityRule, CompatibleValuesRule, DisambiguationRule, EqualityRule, NoPreference,
  PreferHighest, PreferLowest, PreferOrdered, PreferRequested,
};
pub use schema::{AttributeRegistration, AttributeSchema, SchemaBuilder, SchemaError};
pub use types::{
  Attribute, AttributeEntry, AttributeError, AttributeSet, AttributeSetBuilder, AttributeType, AttributeValue,
  MatchingCandidate,
};
