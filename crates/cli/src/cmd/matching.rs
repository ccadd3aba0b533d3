//! Implementation of the `stratum match` command.
//!
//! Loads a match request document and selects the single variant that
//! satisfies the request.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use stratum_lib::attributes::AttributeMatcher;
use stratum_lib::config::MatchRequestConfig;
use stratum_lib::variant::{VariantIdentifier, VariantSelector};

use crate::output::{OutputFormat, print_json, print_stat, print_success};

#[derive(Serialize)]
struct MatchOutput<'a> {
  requested: String,
  selected: &'a VariantIdentifier,
}

pub fn cmd_match(file: &Path, format: OutputFormat) -> Result<()> {
  let request = MatchRequestConfig::load(file)
    .and_then(|config| config.resolve())
    .with_context(|| format!("Failed to load match request: {}", file.display()))?;
  debug!(candidates = request.candidates.len(), "loaded match request");

  let selector = VariantSelector::new(AttributeMatcher::new(request.schema)).with_filter(request.filter);
  let selected = selector.select(&request.candidates, &request.requested)?;

  if format.is_json() {
    print_json(&MatchOutput {
      requested: request.requested.to_string(),
      selected: &selected,
    })?;
  } else {
    print_success(&format!("Selected {}", selected));
    print_stat("Requested", &request.requested.to_string());
  }
  Ok(())
}
