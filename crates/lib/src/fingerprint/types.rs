use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::consts::FINGERPRINT_HASH_DOMAIN;
use crate::util::hash::{ContentHash, HashCombiner};

use super::NormalizerId;

/// One normalized file: where it came from, what it is called, what it holds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FingerprintEntry {
  /// Index of the snapshot root this entry was found under.
  pub root: usize,
  pub identity: String,
  pub content_hash: ContentHash,
}

/// A difference between two fingerprints, keyed by normalized identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", content = "identity", rename_all = "lowercase")]
pub enum FingerprintChange {
  Added(String),
  Removed(String),
  Modified(String),
}

impl fmt::Display for FingerprintChange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Added(identity) => write!(f, "added {}", identity),
      Self::Removed(identity) => write!(f, "removed {}", identity),
      Self::Modified(identity) => write!(f, "modified {}", identity),
    }
  }
}

/// Normalized identity of a file collection.
///
/// Entries are grouped by root in root order and sorted by
/// `(identity, content_hash)` within a root. Equality covers the normalizer,
/// the entries and the summary hash; the strategy key and the source
/// signature only decide whether a fingerprint can be reused.
#[derive(Debug, Clone, Serialize)]
pub struct Fingerprint {
  normalizer: NormalizerId,
  entries: Vec<FingerprintEntry>,
  hash: ContentHash,
  #[serde(skip)]
  strategy: ContentHash,
  #[serde(skip)]
  source: ContentHash,
}

impl Fingerprint {
  /// Build a fingerprint from entries already in canonical order.
  pub(crate) fn new(
    normalizer: NormalizerId,
    entries: Vec<FingerprintEntry>,
    strategy: ContentHash,
    source: ContentHash,
  ) -> Self {
    let hash = summary_hash(normalizer, &entries);
    Self {
      normalizer,
      entries,
      hash,
      strategy,
      source,
    }
  }

  pub fn normalizer(&self) -> NormalizerId {
    self.normalizer
  }

  pub fn entries(&self) -> &[FingerprintEntry] {
    &self.entries
  }

  /// The summary hash combining every entry.
  pub fn hash(&self) -> &ContentHash {
    &self.hash
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// First entry with the given identity.
  ///
  /// Roots are searched in order, so on a class path the earlier location
  /// shadows later ones.
  pub fn get(&self, identity: &str) -> Option<&FingerprintEntry> {
    self.entries.iter().find(|e| e.identity == identity)
  }

  /// Identities added, removed or modified relative to `previous`, sorted by
  /// identity.
  pub fn changes_since(&self, previous: &Fingerprint) -> Vec<FingerprintChange> {
    let current = group_by_identity(&self.entries);
    let before = group_by_identity(&previous.entries);

    let mut changes = Vec::new();
    for (identity, hashes) in &current {
      match before.get(identity) {
        None => changes.push(FingerprintChange::Added(identity.to_string())),
        Some(old) if old != hashes => changes.push(FingerprintChange::Modified(identity.to_string())),
        Some(_) => {}
      }
    }
    for identity in before.keys() {
      if !current.contains_key(identity) {
        changes.push(FingerprintChange::Removed(identity.to_string()));
      }
    }
    changes.sort_by(|a, b| change_identity(a).cmp(change_identity(b)));
    changes
  }

  pub(crate) fn strategy(&self) -> &ContentHash {
    &self.strategy
  }

  pub(crate) fn source(&self) -> &ContentHash {
    &self.source
  }
}

impl PartialEq for Fingerprint {
  fn eq(&self, other: &Self) -> bool {
    self.normalizer == other.normalizer && self.hash == other.hash && self.entries == other.entries
  }
}

impl Eq for Fingerprint {}

fn group_by_identity(entries: &[FingerprintEntry]) -> BTreeMap<&str, Vec<&ContentHash>> {
  let mut grouped: BTreeMap<&str, Vec<&ContentHash>> = BTreeMap::new();
  for entry in entries {
    grouped.entry(entry.identity.as_str()).or_default().push(&entry.content_hash);
  }
  grouped
}

fn change_identity(change: &FingerprintChange) -> &str {
  match change {
    FingerprintChange::Added(identity)
    | FingerprintChange::Removed(identity)
    | FingerprintChange::Modified(identity) => identity,
  }
}

fn summary_hash(normalizer: NormalizerId, entries: &[FingerprintEntry]) -> ContentHash {
  let mut combiner = HashCombiner::new(FINGERPRINT_HASH_DOMAIN);
  combiner.put_str(normalizer.as_str());

  let mut current_root = None;
  for entry in entries {
    if current_root != Some(entry.root) {
      combiner.put_tag(b'R');
      current_root = Some(entry.root);
    }
    combiner.put_tag(b'E').put_str(&entry.identity).put_hash(&entry.content_hash);
  }
  combiner.finish()
}
