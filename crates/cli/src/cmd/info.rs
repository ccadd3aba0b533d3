//! Implementation of the `stratum info` command.

use anyhow::{Context, Result};
use stratum_lib::fingerprint::NormalizerRegistry;
use stratum_lib::platform::Platform;

use crate::output::{print_info, print_stat};

pub fn cmd_info() -> Result<()> {
  println!("System:");
  match Platform::current() {
    Some(platform) => {
      print_stat("Platform", &platform.triple());
      let attributes = platform.attributes().context("Failed to describe platform attributes")?;
      print_stat("Attributes", &attributes.to_string());
    }
    None => print_info("Could not detect platform."),
  }

  println!();
  println!("Normalizers:");
  for normalizer in NormalizerRegistry::with_defaults().normalizers() {
    println!("  {}", normalizer);
  }
  Ok(())
}
