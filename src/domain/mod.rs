//! Core domain models for modmajor
//!
//! This module contains the fundamental types used throughout the application:
//! - Go semantic version primitives
//! - Module path algebra (major suffix encoding, stripping, decomposition)
//! - Version queries and resolved targets
//! - Direct dependency records

mod dependency;
pub mod module_path;
mod query;
pub mod version;

pub use dependency::DependencyRecord;
pub use module_path::{Decomposed, ModuleCoordinate, PackageReference, PathConvention};
pub use query::{ResolvedVersion, VersionQuery};
