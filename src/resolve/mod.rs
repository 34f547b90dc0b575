//! Version resolution
//!
//! Turns a user request into a fully determined target before anything
//! on disk changes:
//! - `resolve_get`: package spec to fetch spec and import mapping
//! - `resolve_path`: module path rename for the current module
//! - `resolve_list`: available updates for a set of direct dependencies

mod mapping;

pub use mapping::ReferenceMapper;

use crate::config::ListConfig;
use crate::domain::{module_path, version, DependencyRecord, ResolvedVersion, VersionQuery};
use crate::error::ResolveError;
use crate::registry::{self, ModuleRegistry};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Resolved target of a `get` request
#[derive(Debug, Clone)]
pub struct GetPlan {
    /// Path of the module that owns the requested package, as listed by the registry
    pub module_path: String,
    /// Version-independent prefix of that module
    pub module_prefix: String,
    /// Requested package below the module root, empty or starting with `/`
    pub sub_path: String,
    /// Target version and the query token to fetch it with
    pub resolved: ResolvedVersion,
    /// Argument for the fetch command (`path@query`)
    pub fetch_spec: String,
    /// Import mapping for the rewrite engine
    pub mapper: ReferenceMapper,
}

/// Resolves a `path@query` spec into a fetch spec and import mapping
///
/// `allow_prerelease` makes pre-release versions eligible. `cached`
/// restricts registry lookups to content the registry already holds.
pub async fn resolve_get(
    registry: &dyn ModuleRegistry,
    pathspec: &str,
    allow_prerelease: bool,
    cached: bool,
) -> Result<GetPlan, ResolveError> {
    let (pkgpath, raw_query) = module_path::split_spec(pathspec.trim());
    if pkgpath.is_empty() {
        return Err(ResolveError::MissingSpec);
    }
    let query = VersionQuery::parse(raw_query)?;
    resolve_get_query(registry, pkgpath, &query, allow_prerelease, cached).await
}

/// Resolves a package path and an already parsed query
///
/// An increment query has no meaning for a dependency and is rejected
/// before the registry is consulted.
pub async fn resolve_get_query(
    registry: &dyn ModuleRegistry,
    pkgpath: &str,
    query: &VersionQuery,
    allow_prerelease: bool,
    cached: bool,
) -> Result<GetPlan, ResolveError> {
    if *query == VersionQuery::IncrementMajor {
        return Err(ResolveError::UnsupportedQuery {
            query: query.to_string(),
            operation: "get",
        });
    }

    let module = registry::query_package(registry, pkgpath, cached).await?;
    let module_prefix = module_path::mod_prefix(&module.path).to_string();
    let sub_path = module_path::decompose(pkgpath, &module_prefix)
        .map(|parts| parts.sub_path)
        .unwrap_or_default()
        .to_string();
    debug!(package = pkgpath, module = %module.path, %query, "resolving get");

    let no_versions = || ResolveError::NoVersions {
        module: module.path.clone(),
    };
    let resolved = match query {
        VersionQuery::Unspecified | VersionQuery::IncrementMajor => {
            let v = module.max_version("", allow_prerelease).ok_or_else(no_versions)?;
            ResolvedVersion::new(v, "", allow_prerelease)
        }
        VersionQuery::Latest => {
            let latest = registry::latest(registry, &module.path, false).await?;
            let v = latest
                .max_version("", allow_prerelease)
                .ok_or_else(no_versions)?;
            // pin the fetch spec to the version found
            ResolvedVersion::new(v, v, allow_prerelease)
        }
        VersionQuery::Branch(name) => {
            let live = registry
                .query(&module.path, false)
                .await?
                .ok_or_else(no_versions)?;
            let v = live.max_version("", allow_prerelease).ok_or_else(no_versions)?;
            ResolvedVersion::new(v, name.as_str(), allow_prerelease)
        }
        VersionQuery::Explicit(requested) => {
            // a matching record corrects the requested version, e.g. to `+incompatible`
            let v = module
                .max_version(requested, allow_prerelease)
                .unwrap_or(requested.as_str());
            ResolvedVersion::new(v, requested.as_str(), allow_prerelease)
        }
    };

    let mut fetch_spec = module_path::join_path(&module_prefix, &resolved.version, &sub_path);
    if !resolved.query.is_empty() {
        fetch_spec.push('@');
        fetch_spec.push_str(&resolved.query);
    }

    let mapper = ReferenceMapper::new(module_prefix.as_str(), resolved.version.as_str())
        .with_scope(&sub_path);

    Ok(GetPlan {
        module_path: module.path,
        module_prefix,
        sub_path,
        resolved,
        fetch_spec,
        mapper,
    })
}

/// A module path change requested for the current module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRequest {
    /// New module path; the current one when `None`
    pub module_path: Option<String>,
    /// Major version to encode: `Unspecified` keeps the one in the path,
    /// `Explicit` sets it, `IncrementMajor` moves to the next one
    pub query: VersionQuery,
}

impl PathRequest {
    /// Builds a request from the path command's flags
    ///
    /// An explicit version combined with `next` selects the major after
    /// that version.
    pub fn from_flags(
        module_path: Option<String>,
        version: Option<String>,
        next: bool,
    ) -> Result<Self, ResolveError> {
        let version = version.filter(|v| !v.trim().is_empty());
        let query = match (version, next) {
            (Some(v), true) => VersionQuery::Explicit(version::next_major(v.trim())?),
            (Some(v), false) => VersionQuery::Explicit(v.trim().to_string()),
            (None, true) => VersionQuery::IncrementMajor,
            (None, false) => VersionQuery::Unspecified,
        };
        Ok(Self { module_path, query })
    }
}

/// Resolved target of a `path` request
#[derive(Debug, Clone)]
pub struct PathPlan {
    /// Module path before the change
    pub old_module_path: String,
    /// Module path after the change
    pub new_module_path: String,
    /// Version whose major the new path encodes
    pub version: String,
    /// Import mapping from the old module to the new one
    pub mapper: ReferenceMapper,
}

impl PathPlan {
    /// Returns true if the module path stays the same
    pub fn is_noop(&self) -> bool {
        self.old_module_path == self.new_module_path
    }
}

/// Resolves a module path change
///
/// Needs no registry: the version is taken from the request or the path
/// suffix, defaulting to `v1`; an increment moves one major past the
/// path suffix.
pub fn resolve_path(
    current_module_path: &str,
    request: &PathRequest,
) -> Result<PathPlan, ResolveError> {
    let current = current_module_path.trim();
    if current.is_empty() {
        return Err(ResolveError::InvalidModulePath {
            path: current_module_path.to_string(),
        });
    }
    let target = match request.module_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => path,
        _ => current,
    };

    let encoded = module_path::mod_major(target);
    let target_version = match &request.query {
        VersionQuery::Unspecified => encoded
            .map(module_path::major_token)
            .unwrap_or_else(|| "v1".to_string()),
        VersionQuery::Explicit(v) => v.clone(),
        // v0 and v1 both count as 1
        VersionQuery::IncrementMajor => {
            module_path::major_token(encoded.filter(|m| *m >= 2).unwrap_or(1) + 1)
        }
        other => {
            return Err(ResolveError::UnsupportedQuery {
                query: other.to_string(),
                operation: "path",
            })
        }
    };
    version::validate(&target_version)?;

    let new_prefix = module_path::mod_prefix(target);
    let old_prefix = module_path::mod_prefix(current);
    let new_module_path = module_path::join_path(new_prefix, &target_version, "");
    debug!(old = current, new = %new_module_path, "resolved module path");

    Ok(PathPlan {
        old_module_path: current.to_string(),
        new_module_path,
        mapper: ReferenceMapper::new(old_prefix, target_version.as_str())
            .with_new_prefix(new_prefix),
        version: target_version,
    })
}

/// Options for `resolve_list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Make pre-release versions eligible
    pub allow_prerelease: bool,
    /// Only report versions with a higher major
    pub major_only: bool,
    /// Restrict lookups to content the registry already holds
    pub cached: bool,
    /// Maximum lookups in flight
    pub concurrency: usize,
}

impl ListOptions {
    /// Creates options with the concurrency limit for the cache mode
    pub fn new(cached: bool, limits: &ListConfig) -> Self {
        Self {
            allow_prerelease: false,
            major_only: false,
            cached,
            concurrency: limits.concurrency(cached),
        }
    }

    /// Make pre-release versions eligible
    pub fn with_prerelease(mut self, allow: bool) -> Self {
        self.allow_prerelease = allow;
        self
    }

    /// Only report newer major versions
    pub fn with_major_only(mut self, major_only: bool) -> Self {
        self.major_only = major_only;
        self
    }
}

/// A dependency with a newer version available
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableUpdate {
    /// Module path as required by the project
    pub path: String,
    /// Currently required version
    pub current: String,
    /// Newest available version
    pub latest: String,
}

/// A dependency whose lookup failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupFailure {
    /// Module path as required by the project
    pub path: String,
    /// Error message
    pub message: String,
}

/// Result of checking a set of dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListReport {
    /// Dependencies with updates, sorted by path
    pub updates: Vec<AvailableUpdate>,
    /// Dependencies whose lookup failed, sorted by path
    pub failures: Vec<LookupFailure>,
    /// Dependencies excluded from lookups
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    /// Number of dependencies checked
    pub checked: usize,
}

impl ListReport {
    /// Returns true if any lookup failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Returns true if `latest` should be reported as an update over `current`
pub fn is_newer(current: &str, latest: &str, major_only: bool) -> bool {
    if major_only {
        let latest_major = version::major(latest).unwrap_or_default();
        let current_major = version::major(current).unwrap_or_default();
        if version::compare(&latest_major, &current_major) != Ordering::Greater {
            return false;
        }
    }
    version::compare(latest, current) == Ordering::Greater
}

/// Looks up the newest version of every dependency
///
/// Lookups run concurrently up to `options.concurrency`. A failed lookup
/// is recorded in the report and does not stop the others. `on_checked`
/// is called with the module path after each lookup completes.
pub async fn resolve_list(
    registry: Arc<dyn ModuleRegistry>,
    dependencies: &[DependencyRecord],
    options: &ListOptions,
    mut on_checked: impl FnMut(&str),
) -> ListReport {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let mut pending = Vec::with_capacity(dependencies.len());

    for dep in dependencies {
        let path = dep.module_path();
        let current = dep.version.clone();
        let registry = Arc::clone(&registry);
        let semaphore = Arc::clone(&semaphore);
        let options = options.clone();
        pending.push(path.clone());

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let result = registry::latest(registry.as_ref(), &path, options.cached).await;
            let outcome = result.map(|module| {
                module
                    .max_version("", options.allow_prerelease)
                    .filter(|latest| is_newer(&current, latest, options.major_only))
                    .map(|latest| AvailableUpdate {
                        path: path.clone(),
                        current,
                        latest: latest.to_string(),
                    })
            });
            (path, outcome)
        });
    }

    let mut report = ListReport {
        checked: dependencies.len(),
        ..ListReport::default()
    };
    let mut aborted = None;
    while let Some(joined) = tasks.join_next().await {
        let (path, outcome) = match joined {
            Ok(done) => done,
            Err(e) => {
                warn!(error = %e, "lookup task aborted");
                aborted = Some(e.to_string());
                continue;
            }
        };
        if let Some(i) = pending.iter().position(|p| *p == path) {
            pending.swap_remove(i);
        }
        on_checked(&path);
        match outcome {
            Ok(update) => report.updates.extend(update),
            Err(e) => {
                debug!(module = %path, error = %e, "lookup failed");
                report.failures.push(LookupFailure {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
    // tasks that never reported back
    if let Some(message) = aborted {
        for path in pending {
            on_checked(&path);
            report.failures.push(LookupFailure {
                path,
                message: message.clone(),
            });
        }
    }

    report.updates.sort_by(|a, b| a.path.cmp(&b.path));
    report.failures.sort_by(|a, b| a.path.cmp(&b.path));
    report
}
