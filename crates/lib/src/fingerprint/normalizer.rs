use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::FingerprintError;

/// Strategy deciding which part of a file's location is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizerId {
  /// Full absolute path.
  AbsolutePath,
  /// Path relative to the root it was found under.
  RelativePath,
  /// File name only.
  NameOnly,
  /// Content only, the location is ignored.
  IgnoredPath,
  /// Runtime class path semantics.
  Classpath,
  /// Compile class path semantics: only class files under directories count.
  CompileClasspath,
}

impl NormalizerId {
  pub const ALL: [NormalizerId; 6] = [
    Self::AbsolutePath,
    Self::RelativePath,
    Self::NameOnly,
    Self::IgnoredPath,
    Self::Classpath,
    Self::CompileClasspath,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::AbsolutePath => "absolute-path",
      Self::RelativePath => "relative-path",
      Self::NameOnly => "name-only",
      Self::IgnoredPath => "ignored-path",
      Self::Classpath => "classpath",
      Self::CompileClasspath => "compile-classpath",
    }
  }

  /// Whether directories and missing roots show up as entries.
  pub(crate) fn is_path_sensitive(&self) -> bool {
    matches!(self, Self::AbsolutePath | Self::RelativePath | Self::NameOnly)
  }

  pub(crate) fn names() -> String {
    Self::ALL.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(", ")
  }
}

impl fmt::Display for NormalizerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for NormalizerId {
  type Err = FingerprintError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|n| n.as_str() == s)
      .ok_or_else(|| FingerprintError::UnknownNormalizer { name: s.to_string() })
  }
}
