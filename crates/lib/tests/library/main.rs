//! Integration tests for stratum-lib.

mod classpath_tests;
mod common;
mod fingerprint_tests;
mod matching_tests;
