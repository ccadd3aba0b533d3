//! File-system snapshotter.
//!
//! Walks each root in file-name order, hashes regular files in parallel and
//! assembles the result into an immutable tree. Any I/O problem aborts the
//! whole snapshot: a partial snapshot is never returned.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::util::hash::{ContentHash, hash_file};

use super::types::{FileSystemLocationSnapshot, FileSystemSnapshot};

/// Errors that abort a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("broken symbolic link: {}", .path.display())]
  BrokenSymlink { path: PathBuf },

  #[error("failed to walk {}: {message}", .path.display())]
  Walk { path: PathBuf, message: String },

  #[error("snapshot was cancelled")]
  Cancelled,
}

/// Shared flag used to interrupt a running snapshot.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

/// Turns an ordered list of roots into a [`FileSystemSnapshot`].
pub trait FileCollectionSnapshotter: Debug + Send + Sync {
  fn snapshot(&self, roots: &[PathBuf]) -> Result<FileSystemSnapshot, SnapshotError>;
}

/// Snapshotter backed by the real file system.
///
/// Symbolic links are followed. Roots that do not exist are recorded as
/// missing; everything else that cannot be read is an error.
#[derive(Debug, Clone, Default)]
pub struct FsSnapshotter {
  cancellation: CancellationToken,
}

enum Walked {
  Directory { path: PathBuf, depth: usize },
  File { path: PathBuf, depth: usize },
}

enum Hashed {
  Directory { path: PathBuf, depth: usize },
  File { path: PathBuf, depth: usize, hash: ContentHash },
}

impl Hashed {
  fn depth(&self) -> usize {
    match self {
      Self::Directory { depth, .. } | Self::File { depth, .. } => *depth,
    }
  }
}

struct PendingDirectory {
  path: PathBuf,
  children: Vec<FileSystemLocationSnapshot>,
}

impl FsSnapshotter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_cancellation(cancellation: CancellationToken) -> Self {
    Self { cancellation }
  }

  fn check_cancelled(&self) -> Result<(), SnapshotError> {
    if self.cancellation.is_cancelled() {
      Err(SnapshotError::Cancelled)
    } else {
      Ok(())
    }
  }

  fn snapshot_root(&self, root: &Path) -> Result<FileSystemLocationSnapshot, SnapshotError> {
    let metadata = match fs::metadata(root) {
      Ok(metadata) => metadata,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        if fs::symlink_metadata(root).is_ok() {
          return Err(SnapshotError::BrokenSymlink {
            path: root.to_path_buf(),
          });
        }
        trace!(path = ?root, "root is missing");
        return Ok(FileSystemLocationSnapshot::missing(root));
      }
      Err(source) => {
        return Err(SnapshotError::Io {
          path: root.to_path_buf(),
          source,
        });
      }
    };

    if metadata.is_dir() {
      self.snapshot_directory(root)
    } else if metadata.is_file() {
      Ok(FileSystemLocationSnapshot::file(root, self.hash(root)?))
    } else {
      debug!(path = ?root, "root is neither file nor directory, treating as missing");
      Ok(FileSystemLocationSnapshot::missing(root))
    }
  }

  fn snapshot_directory(&self, root: &Path) -> Result<FileSystemLocationSnapshot, SnapshotError> {
    let mut walked = Vec::new();
    let walker = WalkDir::new(root).follow_links(true).sort_by_file_name().min_depth(1);

    for entry in walker {
      self.check_cancelled()?;
      let entry = entry.map_err(|e| walk_error(root, e))?;
      let path = entry.path().to_path_buf();
      let depth = entry.depth();
      let file_type = entry.file_type();

      if file_type.is_dir() {
        walked.push(Walked::Directory { path, depth });
      } else if file_type.is_file() {
        walked.push(Walked::File { path, depth });
      } else {
        // Sockets, devices and the like carry no content.
        trace!(path = ?path, "skipping special file");
      }
    }

    let hashed = walked
      .into_par_iter()
      .map(|entry| -> Result<Hashed, SnapshotError> {
        match entry {
          Walked::Directory { path, depth } => Ok(Hashed::Directory { path, depth }),
          Walked::File { path, depth } => {
            let hash = self.hash(&path)?;
            Ok(Hashed::File { path, depth, hash })
          }
        }
      })
      .collect::<Result<Vec<_>, _>>()?;

    debug!(root = ?root, entries = hashed.len(), "snapshotted directory");
    Ok(assemble(root, hashed))
  }

  fn hash(&self, path: &Path) -> Result<ContentHash, SnapshotError> {
    self.check_cancelled()?;
    hash_file(path).map_err(|source| SnapshotError::Io {
      path: path.to_path_buf(),
      source,
    })
  }
}

impl FileCollectionSnapshotter for FsSnapshotter {
  fn snapshot(&self, roots: &[PathBuf]) -> Result<FileSystemSnapshot, SnapshotError> {
    let mut snapshots = Vec::with_capacity(roots.len());
    for root in roots {
      self.check_cancelled()?;
      snapshots.push(self.snapshot_root(root)?);
    }
    debug!(roots = roots.len(), "snapshot complete");
    Ok(FileSystemSnapshot::new(snapshots))
  }
}

/// Build the tree from entries listed in depth-first pre-order.
fn assemble(root: &Path, entries: Vec<Hashed>) -> FileSystemLocationSnapshot {
  let mut stack = vec![PendingDirectory {
    path: root.to_path_buf(),
    children: Vec::new(),
  }];

  for entry in entries {
    // The parent of an entry at depth `d` sits at stack index `d - 1`.
    while stack.len() > entry.depth().max(1) {
      close_directory(&mut stack);
    }
    match entry {
      Hashed::Directory { path, .. } => stack.push(PendingDirectory {
        path,
        children: Vec::new(),
      }),
      Hashed::File { path, hash, .. } => {
        if let Some(parent) = stack.last_mut() {
          parent.children.push(FileSystemLocationSnapshot::file(path, hash));
        }
      }
    }
  }

  while stack.len() > 1 {
    close_directory(&mut stack);
  }
  match stack.pop() {
    Some(top) => FileSystemLocationSnapshot::directory(top.path, top.children),
    None => FileSystemLocationSnapshot::directory(root, Vec::new()),
  }
}

fn close_directory(stack: &mut Vec<PendingDirectory>) {
  if let Some(done) = stack.pop() {
    let directory = FileSystemLocationSnapshot::directory(done.path, done.children);
    if let Some(parent) = stack.last_mut() {
      parent.children.push(directory);
    }
  }
}

fn walk_error(root: &Path, error: walkdir::Error) -> SnapshotError {
  let path = error.path().unwrap_or(root).to_path_buf();
  if error.loop_ancestor().is_some() {
    return SnapshotError::Walk {
      path,
      message: "symbolic link loop".to_string(),
    };
  }
  match error.into_io_error() {
    Some(source) if source.kind() == io::ErrorKind::NotFound && fs::symlink_metadata(&path).is_ok() => {
      SnapshotError::BrokenSymlink { path }
    }
    Some(source) => SnapshotError::Io { path, source },
    None => SnapshotError::Walk {
      path,
      message: "unknown walk error".to_string(),
    },
  }
}
