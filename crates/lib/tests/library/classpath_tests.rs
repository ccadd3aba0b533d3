//! Class path hashing against real files.

use std::sync::Arc;

use stratum_lib::classpath::{ClassPath, ClasspathHasher, DefaultClasspathHasher};
use stratum_lib::fingerprint::{ClasspathFingerprinter, FingerprintError};
use stratum_lib::snapshot::FsSnapshotter;

use super::common::Tree;

#[test]
fn reordering_entries_changes_the_hash() {
  let tree = Tree::new();
  let a = tree.write("a.jar", "alpha");
  let b = tree.write("b.jar", "beta");
  let hasher = DefaultClasspathHasher::with_defaults();

  let ab = hasher.hash(&ClassPath::new([&a, &b])).unwrap();
  let ba = hasher.hash(&ClassPath::new([&b, &a])).unwrap();
  assert_ne!(ab, ba);
}

#[test]
fn identical_files_in_identical_order_hash_identically() {
  let first = Tree::new();
  let second = Tree::new();
  for tree in [&first, &second] {
    tree.write("lib/core.jar", "core");
    tree.write("classes/org/Main.class", "main");
  }
  let hasher = DefaultClasspathHasher::with_defaults();
  let classpath = |tree: &Tree| ClassPath::new([tree.path("lib/core.jar"), tree.path("classes")]);
  assert_eq!(
    hasher.hash(&classpath(&first)).unwrap(),
    hasher.hash(&classpath(&second)).unwrap()
  );
}

#[test]
fn content_change_and_revert_restores_hash() {
  let tree = Tree::new();
  tree.write("classes/org/Main.class", "main");
  let jar = tree.write("lib/core.jar", "core");
  let classpath = ClassPath::new([tree.path("classes"), jar]);
  let hasher = DefaultClasspathHasher::with_defaults();

  let original = hasher.hash(&classpath).unwrap();
  tree.write("lib/core.jar", "corf");
  assert_ne!(original, hasher.hash(&classpath).unwrap());
  tree.write("lib/core.jar", "core");
  assert_eq!(original, hasher.hash(&classpath).unwrap());
}

#[test]
fn membership_change_changes_the_hash() {
  let tree = Tree::new();
  let a = tree.write("a.jar", "alpha");
  let b = tree.write("b.jar", "beta");
  let hasher = DefaultClasspathHasher::with_defaults();
  let one = ClassPath::new([&a]);
  let two = one.plus(&ClassPath::new([&b]));
  assert_ne!(hasher.hash(&one).unwrap(), hasher.hash(&two).unwrap());
}

#[test]
fn custom_fingerprinter_is_used() {
  let tree = Tree::new();
  tree.write("classes/org/Main.class", "main");
  tree.write("classes/org/readme.txt", "v1");
  let classpath = ClassPath::new([tree.path("classes")]);
  let hasher = DefaultClasspathHasher::new(
    Arc::new(FsSnapshotter::new()),
    Arc::new(ClasspathFingerprinter::runtime().with_ignore_patterns(["**/*.txt"]).unwrap()),
  );

  let before = hasher.hash(&classpath).unwrap();
  tree.write("classes/org/readme.txt", "v2");
  assert_eq!(before, hasher.hash(&classpath).unwrap());
}

#[cfg(unix)]
#[test]
fn broken_entry_fails_the_whole_hash() {
  let tree = Tree::new();
  let jar = tree.write("a.jar", "alpha");
  std::os::unix::fs::symlink(tree.path("gone.jar"), tree.path("link.jar")).unwrap();
  let err = DefaultClasspathHasher::with_defaults()
    .hash(&ClassPath::new([jar, tree.path("link.jar")]))
    .unwrap_err();
  assert!(matches!(err, FingerprintError::Snapshot(_)), "{:?}", err);
  assert!(tree.root().exists());
}
