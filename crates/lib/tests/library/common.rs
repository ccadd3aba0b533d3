//! Shared helpers for library integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use stratum_lib::attributes::{
  Attribute, AttributeMatcher, AttributeRegistration, AttributeSet, PreferHighest, PreferRequested, SchemaBuilder,
};
use tempfile::TempDir;

/// A temporary directory tree.
pub struct Tree {
  pub temp: TempDir,
}

impl Tree {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Write a file relative to the tree root, creating parents.
  pub fn write(&self, relative: &str, content: &str) -> PathBuf {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }
}

pub fn os() -> Attribute {
  Attribute::string("os")
}

pub fn arch() -> Attribute {
  Attribute::string("arch")
}

pub fn flavor() -> Attribute {
  Attribute::string("flavor")
}

pub fn api() -> Attribute {
  Attribute::version("api")
}

/// os and arch prefer the requested value, api prefers the highest version,
/// flavor has no rule at all.
pub fn native_matcher() -> AttributeMatcher {
  let schema = SchemaBuilder::new()
    .register(AttributeRegistration::new(os()).disambiguation(PreferRequested))
    .register(AttributeRegistration::new(arch()).disambiguation(PreferRequested))
    .register(AttributeRegistration::new(api()).disambiguation(PreferHighest))
    .register(AttributeRegistration::new(flavor()))
    .precedence([os(), arch(), api(), flavor()])
    .build()
    .unwrap();
  AttributeMatcher::new(schema)
}

pub fn platform(os_value: &str, arch_value: &str) -> AttributeSet {
  AttributeSet::of([(os(), os_value), (arch(), arch_value)]).unwrap()
}
