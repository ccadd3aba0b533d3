//! Class paths and their identity hash.
//!
//! A class path is an ordered list of locations. Its hash is the summary
//! hash of a class path fingerprint over a snapshot of those locations, so
//! identical files in identical order hash identically and any change in
//! content, membership or order changes the hash.

use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::fingerprint::{ClasspathFingerprinter, FileCollectionFingerprinter, FingerprintError};
use crate::snapshot::{FileCollectionSnapshotter, FsSnapshotter};
use crate::util::hash::ContentHash;

/// Ordered sequence of file-system locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClassPath {
  entries: Vec<PathBuf>,
}

impl ClassPath {
  pub fn new<I, P>(entries: I) -> Self
  where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
  {
    Self {
      entries: entries.into_iter().map(Into::into).collect(),
    }
  }

  pub fn empty() -> Self {
    Self::default()
  }

  /// Parse a platform path list, such as the value of `CLASSPATH`.
  ///
  /// Empty elements are skipped.
  pub fn from_env_str(value: impl AsRef<OsStr>) -> Self {
    Self::new(env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()))
  }

  /// A new class path with `other` appended.
  pub fn plus(&self, other: &ClassPath) -> Self {
    let mut entries = self.entries.clone();
    entries.extend(other.entries.iter().cloned());
    Self { entries }
  }

  pub fn iter(&self) -> impl Iterator<Item = &Path> {
    self.entries.iter().map(PathBuf::as_path)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn as_files(&self) -> &[PathBuf] {
    &self.entries
  }
}

impl fmt::Display for ClassPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match env::join_paths(&self.entries) {
      Ok(joined) => write!(f, "{}", joined.to_string_lossy()),
      Err(_) => {
        let parts: Vec<_> = self.entries.iter().map(|p| p.display().to_string()).collect();
        write!(f, "{}", parts.join(", "))
      }
    }
  }
}

/// Computes the identity hash of a class path.
pub trait ClasspathHasher: Send + Sync {
  fn hash(&self, classpath: &ClassPath) -> Result<ContentHash, FingerprintError>;
}

/// Snapshots the class path and fingerprints it.
#[derive(Debug, Clone)]
pub struct DefaultClasspathHasher {
  snapshotter: Arc<dyn FileCollectionSnapshotter>,
  fingerprinter: Arc<dyn FileCollectionFingerprinter>,
}

impl DefaultClasspathHasher {
  pub fn new(
    snapshotter: Arc<dyn FileCollectionSnapshotter>,
    fingerprinter: Arc<dyn FileCollectionFingerprinter>,
  ) -> Self {
    Self {
      snapshotter,
      fingerprinter,
    }
  }

  /// File-system snapshots with runtime class path semantics.
  pub fn with_defaults() -> Self {
    Self::new(Arc::new(FsSnapshotter::new()), Arc::new(ClasspathFingerprinter::runtime()))
  }
}

impl ClasspathHasher for DefaultClasspathHasher {
  fn hash(&self, classpath: &ClassPath) -> Result<ContentHash, FingerprintError> {
    let snapshot = self.snapshotter.snapshot(classpath.as_files())?;
    let fingerprint = self.fingerprinter.fingerprint(&snapshot, None);
    info!(
      entries = classpath.len(),
      files = fingerprint.len(),
      hash = %fingerprint.hash().short(),
      "hashed class path"
    );
    Ok(fingerprint.hash().clone())
  }
}
