use std::fmt::Debug;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::consts::{CLASS_FILE_EXTENSION, DIRECTORY_SIGNATURE, MISSING_FILE_SIGNATURE, STRATEGY_HASH_DOMAIN};
use crate::snapshot::{FileKind, FileSystemLocationSnapshot, FileSystemSnapshot};
use crate::util::hash::{ContentHash, HashCombiner, hash_bytes};

use super::{Fingerprint, FingerprintEntry, FingerprintError, NormalizerId};

/// Normalizes snapshots into fingerprints.
///
/// Implementations hold only immutable configuration and can be shared
/// between threads.
pub trait FileCollectionFingerprinter: Debug + Send + Sync {
  fn normalizer(&self) -> NormalizerId;

  /// Identifies the normalizer together with its configuration.
  fn strategy_key(&self) -> ContentHash;

  /// Fingerprint `snapshot`.
  ///
  /// `previous` is a hint: when it was produced by the same strategy from an
  /// identical snapshot it is returned as is. The output is the same with or
  /// without it.
  fn fingerprint(&self, snapshot: &FileSystemSnapshot, previous: Option<&Fingerprint>) -> Fingerprint;

  /// The fingerprint of an empty snapshot.
  fn empty(&self) -> Fingerprint {
    self.fingerprint(&FileSystemSnapshot::empty(), None)
  }
}

/// Fingerprinter for the path-based normalizers: absolute path, relative
/// path, name only and ignored path.
#[derive(Debug, Clone)]
pub struct PathFingerprinter {
  normalizer: NormalizerId,
}

impl PathFingerprinter {
  pub fn absolute_path() -> Self {
    Self {
      normalizer: NormalizerId::AbsolutePath,
    }
  }

  pub fn relative_path() -> Self {
    Self {
      normalizer: NormalizerId::RelativePath,
    }
  }

  pub fn name_only() -> Self {
    Self {
      normalizer: NormalizerId::NameOnly,
    }
  }

  pub fn ignored_path() -> Self {
    Self {
      normalizer: NormalizerId::IgnoredPath,
    }
  }

  /// Identities derive from the root path and the names below it, which is
  /// exactly what the snapshot signature covers.
  fn identity(
    &self,
    root: &FileSystemLocationSnapshot,
    location: &FileSystemLocationSnapshot,
    relative: &str,
  ) -> Option<String> {
    match self.normalizer {
      NormalizerId::AbsolutePath if relative.is_empty() => Some(root.path().to_string_lossy().into_owned()),
      NormalizerId::AbsolutePath => Some(root.path().join(relative).to_string_lossy().into_owned()),
      NormalizerId::NameOnly => Some(location.name()),
      // The root directory itself has no path relative to itself.
      NormalizerId::RelativePath if relative.is_empty() => {
        (root.kind() != FileKind::Directory).then(|| location.name())
      }
      NormalizerId::RelativePath => Some(relative.to_string()),
      _ => (location.kind() == FileKind::RegularFile).then(String::new),
    }
  }
}

impl FileCollectionFingerprinter for PathFingerprinter {
  fn normalizer(&self) -> NormalizerId {
    self.normalizer
  }

  fn strategy_key(&self) -> ContentHash {
    let mut combiner = HashCombiner::new(STRATEGY_HASH_DOMAIN);
    combiner.put_str(self.normalizer.as_str());
    combiner.finish()
  }

  fn fingerprint(&self, snapshot: &FileSystemSnapshot, previous: Option<&Fingerprint>) -> Fingerprint {
    build(self, snapshot, previous, |root, entries| {
      root.visit(&mut |location, relative| {
        if let Some(identity) = self.identity(root, location, relative)
          && let Some(content_hash) = entry_hash(self.normalizer, location)
        {
          entries.push((identity, content_hash));
        }
      });
    })
  }
}

/// Fingerprinter with class path semantics.
///
/// Files that are roots (archives) are identified by content alone; files
/// under directory roots by their relative path. Directories and missing
/// roots contribute nothing. The compile variant keeps only class files
/// under directory roots. Entries whose relative path (or file name, for
/// root files) matches an ignore pattern are dropped.
#[derive(Debug, Clone)]
pub struct ClasspathFingerprinter {
  normalizer: NormalizerId,
  patterns: Vec<String>,
  ignore: GlobSet,
}

impl ClasspathFingerprinter {
  pub fn runtime() -> Self {
    Self {
      normalizer: NormalizerId::Classpath,
      patterns: Vec::new(),
      ignore: GlobSet::empty(),
    }
  }

  pub fn compile() -> Self {
    Self {
      normalizer: NormalizerId::CompileClasspath,
      ..Self::runtime()
    }
  }

  /// Drop entries matching any of `patterns`.
  pub fn with_ignore_patterns<I, S>(mut self, patterns: I) -> Result<Self, FingerprintError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.patterns.extend(patterns.into_iter().map(Into::into));
    let mut builder = GlobSetBuilder::new();
    for pattern in &self.patterns {
      let glob = Glob::new(pattern).map_err(|source| FingerprintError::InvalidIgnorePattern {
        pattern: pattern.clone(),
        source,
      })?;
      builder.add(glob);
    }
    self.ignore = builder.build().map_err(|source| FingerprintError::InvalidIgnorePattern {
      pattern: self.patterns.join(", "),
      source,
    })?;
    Ok(self)
  }

  pub fn ignore_patterns(&self) -> &[String] {
    &self.patterns
  }

  fn keeps(&self, relative: &str) -> bool {
    if self.ignore.is_match(relative) {
      return false;
    }
    self.normalizer != NormalizerId::CompileClasspath
      || Path::new(relative).extension().is_some_and(|ext| ext == CLASS_FILE_EXTENSION)
  }
}

impl FileCollectionFingerprinter for ClasspathFingerprinter {
  fn normalizer(&self) -> NormalizerId {
    self.normalizer
  }

  fn strategy_key(&self) -> ContentHash {
    let mut combiner = HashCombiner::new(STRATEGY_HASH_DOMAIN);
    combiner.put_str(self.normalizer.as_str());
    for pattern in &self.patterns {
      combiner.put_str(pattern);
    }
    combiner.finish()
  }

  fn fingerprint(&self, snapshot: &FileSystemSnapshot, previous: Option<&Fingerprint>) -> Fingerprint {
    build(self, snapshot, previous, |root, entries| match root {
      FileSystemLocationSnapshot::RegularFile { content_hash, .. } => {
        if !self.ignore.is_match(root.name()) {
          entries.push((String::new(), content_hash.clone()));
        }
      }
      FileSystemLocationSnapshot::Directory { .. } => root.visit(&mut |location, relative| {
        if let FileSystemLocationSnapshot::RegularFile { content_hash, .. } = location
          && self.keeps(relative)
        {
          entries.push((relative.to_string(), content_hash.clone()));
        }
      }),
      FileSystemLocationSnapshot::Missing { .. } => {}
    })
  }
}

fn entry_hash(normalizer: NormalizerId, location: &FileSystemLocationSnapshot) -> Option<ContentHash> {
  match location {
    FileSystemLocationSnapshot::RegularFile { content_hash, .. } => Some(content_hash.clone()),
    FileSystemLocationSnapshot::Directory { .. } if normalizer.is_path_sensitive() => {
      Some(hash_bytes(DIRECTORY_SIGNATURE))
    }
    FileSystemLocationSnapshot::Missing { .. } if normalizer.is_path_sensitive() => {
      Some(hash_bytes(MISSING_FILE_SIGNATURE))
    }
    _ => None,
  }
}

/// Shared driver: reuse the hint when possible, otherwise collect each
/// root's entries, sort them and combine.
fn build<F, C>(
  fingerprinter: &F,
  snapshot: &FileSystemSnapshot,
  previous: Option<&Fingerprint>,
  collect: C,
) -> Fingerprint
where
  F: FileCollectionFingerprinter + ?Sized,
  C: Fn(&FileSystemLocationSnapshot, &mut Vec<(String, ContentHash)>),
{
  let normalizer = fingerprinter.normalizer();
  let strategy = fingerprinter.strategy_key();
  let source = snapshot.signature();

  if let Some(previous) = previous
    && previous.normalizer() == normalizer
    && previous.strategy() == &strategy
    && previous.source() == &source
  {
    debug!(normalizer = %normalizer, "reusing previous fingerprint");
    return previous.clone();
  }

  let mut entries = Vec::new();
  for (index, root) in snapshot.roots().iter().enumerate() {
    let mut root_entries = Vec::new();
    collect(root, &mut root_entries);
    root_entries.sort();
    entries.extend(root_entries.into_iter().map(|(identity, content_hash)| FingerprintEntry {
      root: index,
      identity,
      content_hash,
    }));
  }

  debug!(normalizer = %normalizer, roots = snapshot.roots().len(), entries = entries.len(), "fingerprinted snapshot");
  Fingerprint::new(normalizer, entries, strategy, source)
}
