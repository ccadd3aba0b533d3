//! CLI smoke tests for stratum.
//!
//! These tests verify that every command runs against real files and
//! returns appropriate exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the stratum binary.
fn stratum_cmd() -> Command {
  cargo_bin_cmd!("stratum")
}

/// Create a temp directory holding the given files.
fn temp_tree(files: &[(&str, &str)]) -> TempDir {
  let temp = TempDir::new().unwrap();
  for (relative, content) in files {
    let path = temp.path().join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }
  temp
}

const MATCH_REQUEST: &str = r#"
precedence = ["os", "arch"]

[[attributes]]
name = "os"
type = "string"

[[attributes]]
name = "arch"
type = "string"

[request]
os = "linux"
arch = "x64"

[[candidates]]
component = "module:org.example:native:1.0"
name = "linux-x64"
attributes = { os = "linux", arch = "x64" }

[[candidates]]
component = "module:org.example:native:1.0"
name = "linux-arm64"
attributes = { os = "linux", arch = "arm64" }

[[candidates]]
component = "module:org.example:native:1.0"
name = "windows-x64"
attributes = { os = "windows", arch = "x64" }
"#;

const AMBIGUOUS_REQUEST: &str = r#"
precedence = ["os"]

[[attributes]]
name = "os"
type = "string"

[request]
os = "linux"

[[candidates]]
component = "project::lib"
name = "debug"
attributes = { os = "linux", flavor = "debug" }

[[candidates]]
component = "project::lib"
name = "release"
attributes = { os = "linux", flavor = "release" }
"#;

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  stratum_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  stratum_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("stratum"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["hash", "fingerprint", "match", "info"] {
    stratum_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// hash
// =============================================================================

#[test]
fn hash_is_order_sensitive() {
  let temp = temp_tree(&[("a.jar", "alpha"), ("b.jar", "beta")]);
  let run = |first: &str, second: &str| {
    let output = stratum_cmd()
      .arg("hash")
      .arg(temp.path().join(first))
      .arg(temp.path().join(second))
      .args(["-o", "json"])
      .output()
      .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["hash"].as_str().unwrap().to_string()
  };

  assert_eq!(run("a.jar", "b.jar"), run("a.jar", "b.jar"));
  assert_ne!(run("a.jar", "b.jar"), run("b.jar", "a.jar"));
}

#[test]
fn hash_without_entries_fails() {
  stratum_cmd()
    .arg("hash")
    .assert()
    .failure()
    .stderr(predicate::str::contains("No class path entries"));
}

#[cfg(unix)]
#[test]
fn hash_with_broken_link_fails() {
  let temp = TempDir::new().unwrap();
  std::os::unix::fs::symlink(temp.path().join("missing.jar"), temp.path().join("link.jar")).unwrap();
  stratum_cmd()
    .arg("hash")
    .arg(temp.path().join("link.jar"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("broken symbolic link"));
}

// =============================================================================
// fingerprint
// =============================================================================

#[test]
fn fingerprint_lists_relative_entries() {
  let temp = temp_tree(&[("classes/org/Main.class", "main"), ("classes/org/notes.txt", "notes")]);
  stratum_cmd()
    .arg("fingerprint")
    .arg(temp.path().join("classes"))
    .args(["--normalizer", "relative-path"])
    .assert()
    .success()
    .stdout(predicate::str::contains("org/Main.class"))
    .stdout(predicate::str::contains("relative-path fingerprint"));
}

#[test]
fn fingerprint_applies_ignore_patterns() {
  let temp = temp_tree(&[("classes/org/Main.class", "main"), ("classes/org/notes.txt", "notes")]);
  stratum_cmd()
    .arg("fingerprint")
    .arg(temp.path().join("classes"))
    .args(["--ignore", "**/*.txt"])
    .assert()
    .success()
    .stdout(predicate::str::contains("org/Main.class"))
    .stdout(predicate::str::contains("notes.txt").not());
}

#[test]
fn fingerprint_rejects_unknown_normalizer() {
  let temp = TempDir::new().unwrap();
  stratum_cmd()
    .arg("fingerprint")
    .arg(temp.path())
    .args(["--normalizer", "content"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown normalizer"));
}

#[test]
fn fingerprint_rejects_ignore_for_path_normalizers() {
  let temp = TempDir::new().unwrap();
  stratum_cmd()
    .arg("fingerprint")
    .arg(temp.path())
    .args(["--normalizer", "absolute-path", "--ignore", "*.txt"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--ignore only applies"));
}

// =============================================================================
// match
// =============================================================================

#[test]
fn match_selects_single_variant() {
  let temp = temp_tree(&[("request.toml", MATCH_REQUEST)]);
  stratum_cmd()
    .arg("match")
    .arg(temp.path().join("request.toml"))
    .assert()
    .success()
    .stdout(predicate::str::contains("variant 'linux-x64' of org.example:native:1.0"));
}

#[test]
fn match_json_output() {
  let temp = temp_tree(&[("request.toml", MATCH_REQUEST)]);
  let output = stratum_cmd()
    .arg("match")
    .arg(temp.path().join("request.toml"))
    .args(["-o", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["selected"]["display_name"], "linux-x64");
}

#[test]
fn match_reports_ambiguity() {
  let temp = temp_tree(&[("request.toml", AMBIGUOUS_REQUEST)]);
  stratum_cmd()
    .arg("match")
    .arg(temp.path().join("request.toml"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("2 variants match"))
    .stderr(predicate::str::contains("variant 'release' of project :lib"));
}

#[test]
fn match_nonexistent_file_fails() {
  stratum_cmd()
    .arg("match")
    .arg("/nonexistent/path/request.toml")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load match request"));
}

// =============================================================================
// info
// =============================================================================

#[test]
fn info_lists_normalizers() {
  stratum_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("compile-classpath"));
}
