//! modmajor - Major version upgrades for Go modules
//!
//! This library provides the core functionality for moving Go code between
//! major versions of a module:
//! - Module path algebra for `/vN` and `.vN` major suffixes
//! - Version resolution against a module proxy
//! - Import rewriting across a source tree
//! - Update listing for direct dependencies

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod go_tool;
pub mod manifest;
pub mod output;
pub mod progress;
pub mod registry;
pub mod resolve;
pub mod rewrite;
