//! Host platform as attribute values.
//!
//! Native variants are usually distinguished by operating system and CPU
//! architecture. This module detects both for the running process and
//! exposes them as `os`/`arch` string attributes.

use std::fmt;

use crate::attributes::{
  Attribute, AttributeError, AttributeRegistration, AttributeSchema, AttributeSet, PreferRequested, SchemaBuilder,
  SchemaError,
};

pub const OS_ATTRIBUTE: &str = "os";
pub const ARCH_ATTRIBUTE: &str = "arch";

/// CPU architecture variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  Aarch64,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X86_64),
      "aarch64" => Some(Self::Aarch64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Operating system variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Platform identifier combining architecture and OS (e.g., "aarch64-darwin")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Returns the platform triple string (e.g., "aarch64-darwin")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }

  /// The platform as an `{arch, os}` attribute set.
  pub fn attributes(&self) -> Result<AttributeSet, AttributeError> {
    AttributeSet::of([(os_attribute(), self.os.as_str()), (arch_attribute(), self.arch.as_str())])
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

pub fn os_attribute() -> Attribute {
  Attribute::string(OS_ATTRIBUTE)
}

pub fn arch_attribute() -> Attribute {
  Attribute::string(ARCH_ATTRIBUTE)
}

/// Registrations for the platform attributes: equality compatibility, exact
/// request wins during disambiguation.
pub fn platform_registrations() -> [AttributeRegistration; 2] {
  [
    AttributeRegistration::new(os_attribute()).disambiguation(PreferRequested),
    AttributeRegistration::new(arch_attribute()).disambiguation(PreferRequested),
  ]
}

/// A schema knowing only the platform attributes, os before arch.
pub fn platform_schema() -> Result<AttributeSchema, SchemaError> {
  platform_registrations()
    .into_iter()
    .fold(SchemaBuilder::new(), SchemaBuilder::register)
    .precedence([os_attribute(), arch_attribute()])
    .build()
}
