//! Direct dependency records

use super::module_path;
use super::version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A direct dependency of a project as found in its build metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Version-independent module prefix
    pub module_prefix: String,
    /// Resolved version, possibly tagged `+incompatible`
    pub version: String,
}

impl DependencyRecord {
    /// Creates a record from a module path as it appears in go.mod
    pub fn new(module_path: &str, version: impl Into<String>) -> Self {
        Self {
            module_prefix: module_path::mod_prefix(module_path).to_string(),
            version: version.into(),
        }
    }

    /// Returns true if the version is tagged `+incompatible`
    pub fn is_incompatible(&self) -> bool {
        version::is_incompatible(&self.version)
    }

    /// Returns the module path serving the resolved version
    pub fn module_path(&self) -> String {
        module_path::module_path_for(&self.module_prefix, &self.version)
    }
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.module_path(), self.version)
    }
}
