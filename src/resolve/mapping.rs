//! Import path mapping for a resolved upgrade
//!
//! A `ReferenceMapper` closes over immutable resolved values only, so one
//! instance can be shared by every worker of the rewrite engine.

use crate::domain::module_path;

/// Maps import paths of one module to their upgraded form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMapper {
    /// Prefix of the module whose imports are rewritten
    old_prefix: String,
    /// Prefix of the module after the upgrade (differs only on rename)
    new_prefix: String,
    /// Target version; its major selects the new suffix
    new_version: String,
    /// Sub-path a single-package upgrade is limited to
    scope: Option<String>,
}

impl ReferenceMapper {
    /// Create a mapper rewriting the whole module `prefix` to `new_version`
    pub fn new(prefix: impl Into<String>, new_version: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            new_prefix: prefix.clone(),
            old_prefix: prefix,
            new_version: new_version.into(),
            scope: None,
        }
    }

    /// Rewrite imports to a different module prefix
    pub fn with_new_prefix(mut self, new_prefix: impl Into<String>) -> Self {
        self.new_prefix = new_prefix.into();
        self
    }

    /// Limit rewriting to one package below the module root
    ///
    /// An empty sub-path leaves the mapper unscoped.
    pub fn with_scope(mut self, sub_path: &str) -> Self {
        let sub_path = sub_path.trim_matches('/');
        self.scope = (!sub_path.is_empty()).then(|| sub_path.to_string());
        self
    }

    /// Prefix of the module being rewritten
    pub fn old_prefix(&self) -> &str {
        &self.old_prefix
    }

    /// Module path imports are rewritten to
    pub fn target_module_path(&self) -> String {
        module_path::module_path_for(&self.new_prefix, &self.new_version)
    }

    /// Returns the new import path, or `None` if `path` must stay untouched
    ///
    /// Imports of other modules, imports outside the scope, and imports
    /// already at the target all map to `None`.
    pub fn map(&self, path: &str) -> Option<String> {
        let parts = module_path::decompose(path, &self.old_prefix)?;
        if let Some(scope) = &self.scope {
            if parts.sub_path.trim_start_matches('/') != scope {
                return None;
            }
        }
        let new_path = module_path::join_path(&self.new_prefix, &self.new_version, parts.sub_path);
        (new_path != path).then_some(new_path)
    }
}
