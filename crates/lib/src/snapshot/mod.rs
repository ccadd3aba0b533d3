//! Immutable snapshots of file-system locations.

mod types;
mod walk;

pub use types::{FileKind, FileSystemLocationSnapshot, FileSystemSnapshot};
pub use walk::{CancellationToken, FileCollectionSnapshotter, FsSnapshotter, SnapshotError};
