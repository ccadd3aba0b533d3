use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::consts::{DIRECTORY_HASH_DOMAIN, SNAPSHOT_SIGNATURE_DOMAIN};
use crate::util::hash::{ContentHash, HashCombiner};

/// What kind of file-system location a snapshot describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
  RegularFile,
  Directory,
  Missing,
}

impl FileKind {
  fn tag(self) -> u8 {
    match self {
      Self::RegularFile => b'F',
      Self::Directory => b'D',
      Self::Missing => b'M',
    }
  }
}

/// Immutable captured state of one file-system location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSystemLocationSnapshot {
  RegularFile {
    path: PathBuf,
    content_hash: ContentHash,
  },
  /// `hash` combines the children in name order, so it does not depend on
  /// the order of `children`.
  Directory {
    path: PathBuf,
    children: Vec<FileSystemLocationSnapshot>,
    hash: ContentHash,
  },
  Missing {
    path: PathBuf,
  },
}

impl FileSystemLocationSnapshot {
  pub fn file(path: impl Into<PathBuf>, content_hash: ContentHash) -> Self {
    Self::RegularFile {
      path: path.into(),
      content_hash,
    }
  }

  pub fn directory(path: impl Into<PathBuf>, children: Vec<FileSystemLocationSnapshot>) -> Self {
    let hash = combine_children(&children);
    Self::Directory {
      path: path.into(),
      children,
      hash,
    }
  }

  pub fn missing(path: impl Into<PathBuf>) -> Self {
    Self::Missing { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    match self {
      Self::RegularFile { path, .. } | Self::Directory { path, .. } | Self::Missing { path } => path,
    }
  }

  /// Final path component, or the whole path when there is none.
  pub fn name(&self) -> String {
    let path = self.path();
    path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.to_string_lossy().into_owned())
  }

  pub fn kind(&self) -> FileKind {
    match self {
      Self::RegularFile { .. } => FileKind::RegularFile,
      Self::Directory { .. } => FileKind::Directory,
      Self::Missing { .. } => FileKind::Missing,
    }
  }

  /// Content hash for files, combined hash for directories.
  pub fn hash(&self) -> Option<&ContentHash> {
    match self {
      Self::RegularFile { content_hash, .. } => Some(content_hash),
      Self::Directory { hash, .. } => Some(hash),
      Self::Missing { .. } => None,
    }
  }

  pub fn children(&self) -> &[FileSystemLocationSnapshot] {
    match self {
      Self::Directory { children, .. } => children,
      _ => &[],
    }
  }

  /// Visit this location and everything below it, depth first.
  ///
  /// The visitor receives each location with its `/`-separated path
  /// relative to this one (empty for this location itself).
  pub fn visit<F>(&self, visitor: &mut F)
  where
    F: FnMut(&FileSystemLocationSnapshot, &str),
  {
    self.visit_with_prefix("", visitor);
  }

  fn visit_with_prefix<F>(&self, relative: &str, visitor: &mut F)
  where
    F: FnMut(&FileSystemLocationSnapshot, &str),
  {
    visitor(self, relative);
    for child in self.children() {
      let name = child.name();
      let child_relative = if relative.is_empty() {
        name
      } else {
        format!("{}/{}", relative, name)
      };
      child.visit_with_prefix(&child_relative, visitor);
    }
  }
}

fn combine_children(children: &[FileSystemLocationSnapshot]) -> ContentHash {
  let mut named: Vec<(String, &FileSystemLocationSnapshot)> = children.iter().map(|c| (c.name(), c)).collect();
  named.sort_by(|a, b| a.0.cmp(&b.0));

  let mut combiner = HashCombiner::new(DIRECTORY_HASH_DOMAIN);
  for (name, child) in named {
    combiner
      .put_tag(child.kind().tag())
      .put_str(&name)
      .put_str(child.hash().map(ContentHash::as_str).unwrap_or_default());
  }
  combiner.finish()
}

/// Snapshot of an ordered collection of roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSystemSnapshot {
  roots: Vec<FileSystemLocationSnapshot>,
}

impl FileSystemSnapshot {
  pub fn new(roots: Vec<FileSystemLocationSnapshot>) -> Self {
    Self { roots }
  }

  pub fn empty() -> Self {
    Self::default()
  }

  pub fn roots(&self) -> &[FileSystemLocationSnapshot] {
    &self.roots
  }

  pub fn is_empty(&self) -> bool {
    self.roots.is_empty()
  }

  /// Identifies the snapshot by root order, root kinds, root paths and
  /// hashes. Directory hashes cover child names, so locations below a root
  /// are identified by the root path plus their names.
  pub fn signature(&self) -> ContentHash {
    let mut combiner = HashCombiner::new(SNAPSHOT_SIGNATURE_DOMAIN);
    for root in &self.roots {
      combiner
        .put_tag(root.kind().tag())
        .put_str(&root.path().to_string_lossy())
        .put_str(root.hash().map(ContentHash::as_str).unwrap_or_default());
    }
    combiner.finish()
  }
}
