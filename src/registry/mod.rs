//! Module proxy access
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - Go Module Proxy adapter
//! - Version set queries (max version, next major path)
//! - Latest-major discovery and package-to-module lookup

mod client;
mod go_proxy;

pub use client::HttpClient;
pub use go_proxy::{GoProxyRegistry, GO_PROXY_URL};

use crate::domain::{module_path, version};
use crate::error::RegistryError;
use async_trait::async_trait;
use tracing::debug;

/// Upper bound on next-major probes when searching for the latest major
const MAX_MAJOR_PROBES: usize = 100;

/// Trait for module version sources
#[async_trait]
pub trait ModuleRegistry: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch the versions published at exactly `module_path`
    ///
    /// Returns `Ok(None)` when the path has no version record. `cached`
    /// restricts the lookup to content the registry already holds.
    async fn query(
        &self,
        module_path: &str,
        cached: bool,
    ) -> Result<Option<ModuleVersions>, RegistryError>;
}

/// Versions published at a single module path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleVersions {
    /// Module path the versions belong to
    pub path: String,
    /// Version strings as listed by the registry
    pub versions: Vec<String>,
}

impl ModuleVersions {
    /// Create a new version set
    pub fn new(path: impl Into<String>, versions: Vec<String>) -> Self {
        Self {
            path: path.into(),
            versions,
        }
    }

    /// Returns the highest valid version starting with `prefix`
    ///
    /// Pre-release versions are skipped unless `allow_prerelease` is set.
    /// `+incompatible` versions only win when nothing else matches.
    pub fn max_version(&self, prefix: &str, allow_prerelease: bool) -> Option<&str> {
        let mut max = "";
        for v in &self.versions {
            if !version::is_valid(v) || !v.starts_with(prefix) {
                continue;
            }
            if !allow_prerelease && version::is_prerelease(v) {
                continue;
            }
            max = version::max_version(v, max);
        }
        (!max.is_empty()).then_some(max)
    }

    /// Returns the module path of the next major version, if one can exist
    ///
    /// v0 modules have no next major path.
    pub fn next_major_path(&self) -> Option<String> {
        let latest = self.max_version("", true)?;
        let major = version::major_number(latest)?;
        if major == 0 {
            return None;
        }
        Some(module_path::encode(
            module_path::mod_prefix(&self.path),
            Some(major + 1),
        ))
    }
}

/// Finds the newest major version of a module
///
/// Starting at `module_path`, follows next-major paths while they exist
/// and carry a higher major version.
pub async fn latest(
    registry: &dyn ModuleRegistry,
    module_path: &str,
    cached: bool,
) -> Result<ModuleVersions, RegistryError> {
    let mut latest = registry
        .query(module_path, cached)
        .await?
        .ok_or_else(|| RegistryError::not_found(module_path, registry.registry_name()))?;

    for _ in 0..MAX_MAJOR_PROBES {
        let Some(next_path) = latest.next_major_path() else {
            return Ok(latest);
        };
        debug!(module = module_path, next = %next_path, "probing next major");

        let Some(next) = registry.query(&next_path, cached).await? else {
            return Ok(latest);
        };
        if next.versions.is_empty() {
            return Ok(latest);
        }

        let current_major = latest.max_version("", false).and_then(version::major_number);
        let next_major = next.max_version("", false).and_then(version::major_number);
        if current_major == next_major {
            return Ok(latest);
        }
        latest = next;
    }

    Err(RegistryError::RequestLimitExceeded {
        module: module_path.to_string(),
    })
}

/// Finds the module that owns `package_path`
///
/// Tries the package path itself and then each parent path until one has
/// a version record.
pub async fn query_package(
    registry: &dyn ModuleRegistry,
    package_path: &str,
    cached: bool,
) -> Result<ModuleVersions, RegistryError> {
    let mut candidate = package_path;
    loop {
        if is_module_path(candidate) {
            if let Some(module) = registry.query(candidate, cached).await? {
                debug!(package = package_path, module = %module.path, "found owning module");
                return Ok(module);
            }
        }
        match candidate.rfind('/') {
            Some(i) => candidate = &candidate[..i],
            None => break,
        }
    }
    Err(RegistryError::package_not_found(package_path))
}

/// Returns true if `path` has the shape of a module path
fn is_module_path(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or_default();
    first.contains('.')
        && !first.starts_with(['-', '.'])
        && path.split('/').all(|s| !s.is_empty() && s != "." && s != "..")
}
