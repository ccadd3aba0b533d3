//! Implementation of the `stratum hash` command.
//!
//! Hashes a class path: the paths given on the command line followed by the
//! entries of `--classpath`, in that order.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use stratum_lib::classpath::{ClassPath, ClasspathHasher, DefaultClasspathHasher};

use super::resolve_path;
use crate::output::{OutputFormat, print_json, print_stat, print_success};

#[derive(Serialize)]
struct HashOutput {
  hash: String,
  entries: Vec<PathBuf>,
}

pub fn cmd_hash(paths: &[PathBuf], classpath: Option<&str>, format: OutputFormat) -> Result<()> {
  let mut resolved = ClassPath::new(paths.iter().map(|p| resolve_path(p)));
  if let Some(list) = classpath {
    let extra = ClassPath::from_env_str(list);
    resolved = resolved.plus(&ClassPath::new(extra.iter().map(resolve_path)));
  }
  if resolved.is_empty() {
    bail!("No class path entries given");
  }

  let hash = DefaultClasspathHasher::with_defaults()
    .hash(&resolved)
    .context("Failed to hash class path")?;

  if format.is_json() {
    print_json(&HashOutput {
      hash: hash.to_string(),
      entries: resolved.as_files().to_vec(),
    })?;
  } else {
    print_success(&format!("Class path hash: {}", hash));
    print_stat("Entries", &resolved.len().to_string());
  }
  Ok(())
}
