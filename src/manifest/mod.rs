//! Module definition discovery and parsing
//!
//! This module provides functionality to:
//! - Locate the go.mod governing a directory
//! - Parse module, require and replace directives
//! - Enumerate the direct dependencies of a module

mod go_mod;

pub use go_mod::{direct, find_mod_file, GoModFile, Replacement, Requirement, GO_MOD};
