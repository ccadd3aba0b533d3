//! Snapshot and fingerprint pipeline against real directory trees.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use stratum_lib::fingerprint::{
  FileCollectionFingerprinter, FingerprintChange, FingerprintError, NormalizerId, NormalizerRegistry,
};
use stratum_lib::snapshot::{
  CancellationToken, FileCollectionSnapshotter, FileSystemLocationSnapshot, FileSystemSnapshot, FsSnapshotter,
  SnapshotError,
};
use stratum_lib::util::hash::hash_bytes;

use super::common::Tree;

fn sample_tree() -> Tree {
  let tree = Tree::new();
  tree.write("classes/com/example/App.class", "app");
  tree.write("classes/com/example/Util.class", "util");
  tree.write("classes/META-INF/MANIFEST.MF", "manifest");
  tree.write("libs/dep.jar", "dependency");
  tree
}

fn roots(tree: &Tree) -> Vec<PathBuf> {
  vec![tree.path("classes"), tree.path("libs/dep.jar")]
}

#[test]
fn fingerprints_are_deterministic() {
  let tree = sample_tree();
  let snapshotter = FsSnapshotter::new();
  let registry = NormalizerRegistry::with_defaults();

  for normalizer in NormalizerId::ALL {
    let fingerprinter = registry.get(normalizer).unwrap();
    let first = fingerprinter.fingerprint(&snapshotter.snapshot(&roots(&tree)).unwrap(), None);
    let second = fingerprinter.fingerprint(&snapshotter.snapshot(&roots(&tree)).unwrap(), None);
    assert_eq!(first, second, "{}", normalizer);
    assert_eq!(first.hash(), second.hash(), "{}", normalizer);
  }
}

#[test]
fn empty_matches_fingerprint_of_empty_snapshot() {
  let registry = NormalizerRegistry::with_defaults();
  for normalizer in NormalizerId::ALL {
    let fingerprinter = registry.get(normalizer).unwrap();
    let empty = fingerprinter.empty();
    assert_eq!(empty, fingerprinter.fingerprint(&FileSystemSnapshot::empty(), None));
    assert!(empty.is_empty());
  }
}

#[test]
fn previous_hint_never_changes_output() {
  let tree = sample_tree();
  let snapshotter = FsSnapshotter::new();
  let registry = NormalizerRegistry::with_defaults();
  let snapshot = snapshotter.snapshot(&roots(&tree)).unwrap();

  for normalizer in NormalizerId::ALL {
    let fingerprinter = registry.get(normalizer).unwrap();
    let fresh = fingerprinter.fingerprint(&snapshot, None);
    let reused = fingerprinter.fingerprint(&snapshot, Some(&fresh));
    assert_eq!(fresh, reused);

    let unrelated = fingerprinter.empty();
    assert_eq!(fresh, fingerprinter.fingerprint(&snapshot, Some(&unrelated)));
  }
}

#[test]
fn hint_from_changed_tree_is_ignored() {
  let tree = sample_tree();
  let snapshotter = FsSnapshotter::new();
  let fingerprinter = NormalizerRegistry::with_defaults().get(NormalizerId::RelativePath).unwrap();
  let before = fingerprinter.fingerprint(&snapshotter.snapshot(&roots(&tree)).unwrap(), None);

  tree.write("classes/com/example/App.class", "app v2");
  let snapshot = snapshotter.snapshot(&roots(&tree)).unwrap();
  let after = fingerprinter.fingerprint(&snapshot, Some(&before));
  assert_eq!(after, fingerprinter.fingerprint(&snapshot, None));
  assert_eq!(
    after.changes_since(&before),
    vec![FingerprintChange::Modified("com/example/App.class".to_string())]
  );
}

#[test]
fn content_change_and_revert() {
  let tree = sample_tree();
  let snapshotter = FsSnapshotter::new();
  let fingerprinter = NormalizerRegistry::with_defaults().get(NormalizerId::Classpath).unwrap();
  let hash = || {
    fingerprinter
      .fingerprint(&snapshotter.snapshot(&roots(&tree)).unwrap(), None)
      .hash()
      .clone()
  };

  let original = hash();
  tree.write("classes/META-INF/MANIFEST.MF", "manifesT");
  let changed = hash();
  tree.write("classes/META-INF/MANIFEST.MF", "manifest");
  assert_ne!(original, changed);
  assert_eq!(original, hash());
}

#[test]
fn compile_classpath_ignores_resources() {
  let tree = sample_tree();
  let snapshotter = FsSnapshotter::new();
  let fingerprinter = NormalizerRegistry::with_defaults()
    .get(NormalizerId::CompileClasspath)
    .unwrap();
  let before = fingerprinter.fingerprint(&snapshotter.snapshot(&roots(&tree)).unwrap(), None);

  tree.write("classes/META-INF/MANIFEST.MF", "edited");
  let after = fingerprinter.fingerprint(&snapshotter.snapshot(&roots(&tree)).unwrap(), None);
  assert_eq!(before.hash(), after.hash());
  assert!(after.get("com/example/App.class").is_some());
  assert!(after.get("META-INF/MANIFEST.MF").is_none());
}

#[test]
fn class_path_precedence_uses_first_root() {
  let tree = Tree::new();
  tree.write("first/Shared.class", "first");
  tree.write("second/Shared.class", "second");
  let snapshot = FsSnapshotter::new()
    .snapshot(&[tree.path("first"), tree.path("second")])
    .unwrap();
  let fingerprint = NormalizerRegistry::with_defaults()
    .get(NormalizerId::Classpath)
    .unwrap()
    .fingerprint(&snapshot, None);
  assert_eq!(fingerprint.get("Shared.class").unwrap().content_hash, hash_bytes(b"first"));
}

#[test]
fn concurrent_fingerprinting_agrees() {
  let tree = sample_tree();
  let snapshotter = Arc::new(FsSnapshotter::new());
  let fingerprinter = NormalizerRegistry::with_defaults().get(NormalizerId::Classpath).unwrap();
  let roots = roots(&tree);
  let expected = fingerprinter.fingerprint(&snapshotter.snapshot(&roots).unwrap(), None);

  let (fingerprinter, snapshotter, roots) = (&fingerprinter, &snapshotter, &roots);
  thread::scope(|scope| {
    let handles: Vec<_> = (0..8)
      .map(|_| scope.spawn(move || fingerprinter.fingerprint(&snapshotter.snapshot(roots).unwrap(), None)))
      .collect();
    for handle in handles {
      assert_eq!(handle.join().unwrap(), expected);
    }
  });
}

#[test]
fn cancelled_walk_produces_no_fingerprint() {
  let tree = sample_tree();
  let token = CancellationToken::new();
  let snapshotter = FsSnapshotter::with_cancellation(token.clone());
  assert!(snapshotter.snapshot(&roots(&tree)).is_ok());

  token.cancel();
  let err = snapshotter.snapshot(&roots(&tree)).unwrap_err();
  assert!(matches!(err, SnapshotError::Cancelled));
  assert!(matches!(FingerprintError::from(err), FingerprintError::Snapshot(SnapshotError::Cancelled)));
}

#[cfg(unix)]
#[test]
fn unreadable_tree_is_fatal() {
  let tree = sample_tree();
  std::os::unix::fs::symlink(tree.path("nowhere"), tree.path("classes/dangling")).unwrap();
  let err = FsSnapshotter::new().snapshot(&roots(&tree)).unwrap_err();
  assert!(matches!(err, SnapshotError::BrokenSymlink { .. }), "{:?}", err);
}

fn file(name: &str, content: &str) -> FileSystemLocationSnapshot {
  FileSystemLocationSnapshot::file(format!("/root/{}", name), hash_bytes(content.as_bytes()))
}

proptest! {
  #[test]
  fn child_order_never_changes_fingerprint(
    (files, shuffled) in prop::collection::btree_map("[a-z]{1,6}", "[a-z]{0,4}", 0..10)
      .prop_map(|m| m.into_iter().collect::<Vec<_>>())
      .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
  ) {
    let build = |entries: &[(String, String)]| {
      let children = entries.iter().map(|(name, content)| file(name, content)).collect();
      FileSystemSnapshot::new(vec![FileSystemLocationSnapshot::directory("/root", children)])
    };
    let registry = NormalizerRegistry::with_defaults();
    for normalizer in NormalizerId::ALL {
      let fingerprinter = registry.get(normalizer).unwrap();
      prop_assert_eq!(
        fingerprinter.fingerprint(&build(&files), None),
        fingerprinter.fingerprint(&build(&shuffled), None)
      );
    }
  }
}

#[test]
fn fingerprint_serializes_normalizer_and_entries() {
  let tree = sample_tree();
  let fingerprint = NormalizerRegistry::with_defaults()
    .get(NormalizerId::CompileClasspath)
    .unwrap()
    .fingerprint(&FsSnapshotter::new().snapshot(&roots(&tree)).unwrap(), None);

  let json = serde_json::to_value(&fingerprint).unwrap();
  assert_eq!(json["normalizer"], "compile-classpath");
  assert_eq!(json["hash"], fingerprint.hash().as_str());
  assert_eq!(json["entries"].as_array().unwrap().len(), fingerprint.len());
  assert_eq!(json["entries"][0]["identity"], "com/example/App.class");
}
