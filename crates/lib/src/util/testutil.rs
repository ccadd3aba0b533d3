//! Test utilities for stratum-lib.
//!
//! Helpers for laying out small file trees on disk.

use std::fs;
use std::path::Path;

/// Write each `(relative path, content)` pair under `root`, creating parent
/// directories as needed.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
  for (relative, content) in files {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
  }
}
