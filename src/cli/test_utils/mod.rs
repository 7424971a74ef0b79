//! Test utilities and mock implementations for CLI testing
//!
//! Provides a recording mock command and the small command tree most parser
//! and runner tests start from.

pub mod mocks;

pub use mocks::{scenario_tree, MockCommand, RootOptions};
