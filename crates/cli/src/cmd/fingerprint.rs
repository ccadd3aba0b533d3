//! Implementation of the `stratum fingerprint` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use stratum_lib::fingerprint::{ClasspathFingerprinter, FileCollectionFingerprinter, NormalizerId, NormalizerRegistry};
use stratum_lib::snapshot::{FileCollectionSnapshotter, FsSnapshotter};

use super::resolve_path;
use crate::output::{OutputFormat, print_json, print_success, symbols, truncate_hash};

#[derive(Serialize)]
struct EntryOutput<'a> {
  root: &'a PathBuf,
  identity: &'a str,
  hash: &'a str,
}

#[derive(Serialize)]
struct FingerprintOutput<'a> {
  normalizer: NormalizerId,
  hash: &'a str,
  entries: Vec<EntryOutput<'a>>,
}

pub fn cmd_fingerprint(
  paths: &[PathBuf],
  normalizer: NormalizerId,
  ignore: &[String],
  format: OutputFormat,
) -> Result<()> {
  let fingerprinter = fingerprinter_for(normalizer, ignore)?;
  let roots: Vec<PathBuf> = paths.iter().map(|p| resolve_path(p)).collect();

  let snapshot = FsSnapshotter::new()
    .snapshot(&roots)
    .context("Failed to snapshot files")?;
  let fingerprint = fingerprinter.fingerprint(&snapshot, None);

  if format.is_json() {
    let entries = fingerprint
      .entries()
      .iter()
      .map(|e| EntryOutput {
        root: &roots[e.root],
        identity: &e.identity,
        hash: e.content_hash.as_str(),
      })
      .collect();
    return print_json(&FingerprintOutput {
      normalizer,
      hash: fingerprint.hash().as_str(),
      entries,
    });
  }

  for entry in fingerprint.entries() {
    let identity = if entry.identity.is_empty() {
      roots[entry.root].display().to_string()
    } else {
      entry.identity.clone()
    };
    println!(
      "  {} {} {}",
      truncate_hash(entry.content_hash.as_str()),
      symbols::ARROW,
      identity
    );
  }
  print_success(&format!(
    "{} fingerprint of {} file(s): {}",
    normalizer,
    fingerprint.len(),
    fingerprint.hash()
  ));
  Ok(())
}

fn fingerprinter_for(normalizer: NormalizerId, ignore: &[String]) -> Result<Arc<dyn FileCollectionFingerprinter>> {
  if ignore.is_empty() {
    return Ok(NormalizerRegistry::with_defaults().get(normalizer)?);
  }
  let base = match normalizer {
    NormalizerId::Classpath => ClasspathFingerprinter::runtime(),
    NormalizerId::CompileClasspath => ClasspathFingerprinter::compile(),
    other => bail!("--ignore only applies to the classpath normalizers, not {}", other),
  };
  Ok(Arc::new(base.with_ignore_patterns(ignore.iter().cloned())?))
}
