//! Normalized, hashed identities of file collections.
//!
//! A fingerprinter turns a [`FileSystemSnapshot`](crate::snapshot::FileSystemSnapshot)
//! into a [`Fingerprint`]: each file gets an identity chosen by the
//! normalizer and is paired with its content hash, entries are put into a
//! canonical order, and everything is folded into one summary hash.

mod fingerprinter;
mod normalizer;
mod registry;
mod types;

use thiserror::Error;

use crate::snapshot::SnapshotError;

pub use fingerprinter::{ClasspathFingerprinter, FileCollectionFingerprinter, PathFingerprinter};
pub use normalizer::NormalizerId;
pub use registry::{NormalizerRegistry, NormalizerRegistryBuilder};
pub use types::{Fingerprint, FingerprintChange, FingerprintEntry};

/// Errors from configuring fingerprinters or producing fingerprints.
#[derive(Debug, Error)]
pub enum FingerprintError {
  #[error("unknown normalizer '{name}' (expected one of: {})", NormalizerId::names())]
  UnknownNormalizer { name: String },

  #[error("no fingerprinter is registered for normalizer '{normalizer}'")]
  NotRegistered { normalizer: NormalizerId },

  #[error("normalizer '{normalizer}' is registered more than once")]
  DuplicateNormalizer { normalizer: NormalizerId },

  #[error("invalid ignore pattern '{pattern}': {source}")]
  InvalidIgnorePattern {
    pattern: String,
    #[source]
    source: globset::Error,
  },

  #[error(transparent)]
  Snapshot(#[from] SnapshotError),
}
