//! Variant selection on top of the attribute matcher.
//!
//! The matcher reports "no match" and "ambiguous" through the size of its
//! result. This is where those outcomes become resolution failures, with one
//! matching description per candidate to explain them.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::attributes::{AttributeMatcher, AttributeSet, MatchError, MatchingDescription};

use super::{ComponentIdentifier, Variant, VariantIdentifier};

/// Which components may provide the selected variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentFilter {
  #[default]
  Any,
  /// Only variants built by projects of this build.
  ProjectsOnly,
  /// Only variants of external modules.
  ExternalOnly,
}

impl ComponentFilter {
  pub fn accepts(&self, component: &ComponentIdentifier) -> bool {
    match self {
      Self::Any => true,
      Self::ProjectsOnly => component.is_project(),
      Self::ExternalOnly => !component.is_project(),
    }
  }
}

/// Why one candidate did or did not fit the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReport {
  pub variant: VariantIdentifier,
  pub attributes: AttributeSet,
  pub descriptions: Vec<MatchingDescription>,
}

/// Failure to pick exactly one variant.
#[derive(Debug, Error)]
pub enum ResolutionError {
  #[error("no variant matches {requested}{}", format_reports(.candidates))]
  NoMatchingVariant {
    requested: AttributeSet,
    candidates: Vec<CandidateReport>,
  },

  #[error("{} variants match {requested} and none is preferred{}", .candidates.len(), format_reports(.candidates))]
  AmbiguousVariants {
    requested: AttributeSet,
    candidates: Vec<CandidateReport>,
  },

  #[error(transparent)]
  Match(#[from] MatchError),
}

fn format_reports(reports: &[CandidateReport]) -> String {
  let mut out = String::new();
  for report in reports {
    let _ = write!(out, "\n  - {} {}", report.variant, report.attributes);
    for description in &report.descriptions {
      let _ = write!(out, "\n      {}", description);
    }
  }
  out
}

/// Picks the single variant satisfying a request.
#[derive(Debug, Clone)]
pub struct VariantSelector {
  matcher: AttributeMatcher,
  filter: ComponentFilter,
}

impl VariantSelector {
  pub fn new(matcher: AttributeMatcher) -> Self {
    Self {
      matcher,
      filter: ComponentFilter::Any,
    }
  }

  pub fn with_filter(mut self, filter: ComponentFilter) -> Self {
    self.filter = filter;
    self
  }

  pub fn matcher(&self) -> &AttributeMatcher {
    &self.matcher
  }

  /// Select one variant or explain why none could be selected.
  pub fn select(&self, candidates: &[Variant], requested: &AttributeSet) -> Result<VariantIdentifier, ResolutionError> {
    let eligible: Vec<&Variant> = candidates
      .iter()
      .filter(|v| self.filter.accepts(&v.component))
      .collect();

    let matches = self.matcher.match_multiple_candidates(&eligible, requested)?;
    match matches.as_slice() {
      [] => Err(ResolutionError::NoMatchingVariant {
        requested: requested.clone(),
        candidates: self.reports(eligible.iter().copied(), requested),
      }),
      [selected] => {
        let id = selected.identifier();
        debug!(variant = %id, "selected variant");
        Ok(id)
      }
      _ => Err(ResolutionError::AmbiguousVariants {
        requested: requested.clone(),
        candidates: self.reports(matches.iter().map(|v| **v), requested),
      }),
    }
  }

  fn reports<'v>(&self, variants: impl Iterator<Item = &'v Variant>, requested: &AttributeSet) -> Vec<CandidateReport> {
    variants
      .map(|variant| CandidateReport {
        variant: variant.identifier(),
        attributes: variant.attributes.clone(),
        descriptions: self.matcher.describe_matching(&variant.attributes, requested),
      })
      .collect()
  }
}
