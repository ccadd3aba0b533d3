//! Hashing utilities for content identity.
//!
//! This module provides:
//! - `ContentHash`: a full 64-character SHA-256 hash
//! - `hash_file()`: streaming single file hashing
//! - `hash_bytes()`: arbitrary byte hashing
//! - `HashCombiner`: deterministic combination of many fields into one hash

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::SHORT_HASH_LEN;

/// A full 64-character SHA-256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// First characters of the hash, for display.
  pub fn short(&self) -> &str {
    &self.0[..SHORT_HASH_LEN.min(self.0.len())]
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash a file's contents.
///
/// Returns the full 64-character SHA-256 hash of the file.
pub fn hash_file(path: &Path) -> io::Result<ContentHash> {
  let mut file = fs::File::open(path)?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}

/// Feeds length-prefixed fields into one SHA-256 digest.
///
/// Every field is prefixed with its byte length so that `("ab", "c")` and
/// `("a", "bc")` never produce the same digest.
pub struct HashCombiner {
  hasher: Sha256,
}

impl HashCombiner {
  pub fn new(domain: &str) -> Self {
    let mut combiner = Self { hasher: Sha256::new() };
    combiner.put_str(domain);
    combiner
  }

  pub fn put_str(&mut self, value: &str) -> &mut Self {
    self.put_bytes(value.as_bytes())
  }

  pub fn put_bytes(&mut self, value: &[u8]) -> &mut Self {
    self.hasher.update((value.len() as u64).to_le_bytes());
    self.hasher.update(value);
    self
  }

  pub fn put_hash(&mut self, hash: &ContentHash) -> &mut Self {
    self.put_str(&hash.0)
  }

  pub fn put_tag(&mut self, tag: u8) -> &mut Self {
    self.hasher.update([tag]);
    self
  }

  pub fn finish(self) -> ContentHash {
    ContentHash(hex::encode(self.hasher.finalize()))
  }
}
