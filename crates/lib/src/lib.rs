//! stratum-lib: variant matching and file collection fingerprinting
//!
//! This crate provides the two engines a build tool leans on to resolve
//! dependencies and skip up-to-date work:
//! - `attributes`: attribute sets, schemas and the filter-then-disambiguate matcher
//! - `variant`: component and variant identities, selection with diagnostics
//! - `snapshot`: immutable content-hashed trees of file-system roots
//! - `fingerprint`: normalized, hashed identities of snapshots
//! - `classpath`: ordered class paths and their identity hash
//! - `config`: TOML schema and match request documents

pub mod attributes;
pub mod classpath;
pub mod config;
pub mod consts;
pub mod fingerprint;
pub mod platform;
pub mod snapshot;
pub mod util;
pub mod variant;
