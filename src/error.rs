//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Malformed semantic versions
//! - RegistryError: Issues with module proxy communication
//! - ResolveError: Failures while turning a request into a target version
//! - ManifestError: Issues with go.mod discovery and parsing
//! - RewriteError: Failures while rewriting import paths in a source tree
//! - GoToolError: Failures of the external `go` command
//! - ConfigError: Issues with environment configuration

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    GoTool(#[from] GoToolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors raised by the semantic version primitive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string is not a valid `v`-prefixed semantic version
    #[error("invalid version: {version}")]
    Invalid { version: String },
}

impl VersionError {
    /// Creates a new Invalid error
    pub fn invalid(version: impl Into<String>) -> Self {
        VersionError::Invalid {
            version: version.into(),
        }
    }
}

/// Errors related to module proxy communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Module path has no version record on the proxy
    #[error("module '{module}' not found in {registry}")]
    NotFound { module: String, registry: String },

    /// No module owning the package could be located
    #[error("failed to find module for package: {package}")]
    PackageNotFound { package: String },

    /// Network request failed
    #[error("failed to fetch module '{module}' from {registry}: {message}")]
    NetworkError {
        module: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry}")]
    RateLimitExceeded { registry: String },

    /// Invalid response from the proxy
    #[error("invalid response from {registry} for '{module}': {message}")]
    InvalidResponse {
        module: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{module}' from {registry}")]
    Timeout { module: String, registry: String },

    /// Next-major probing did not terminate
    #[error("request limit exceeded while searching for the latest major of '{module}'")]
    RequestLimitExceeded { module: String },
}

impl RegistryError {
    /// Creates a new NotFound error
    pub fn not_found(module: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::NotFound {
            module: module.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        module: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            module: module.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        module: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            module: module.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(module: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            module: module.into(),
            registry: registry.into(),
        }
    }
}

/// Errors raised while resolving a request into a concrete target
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No package spec was supplied
    #[error("missing package spec")]
    MissingSpec,

    /// The requested version is not syntactically valid
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    /// The query kind cannot be used by the requested operation
    #[error("version query {query} is not supported by {operation}")]
    UnsupportedQuery {
        query: String,
        operation: &'static str,
    },

    /// The module path is empty or malformed
    #[error("invalid module path: '{path}'")]
    InvalidModulePath { path: String },

    /// Registry lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The registry has no usable version for the module
    #[error("no versions available for module '{module}'")]
    NoVersions { module: String },
}

/// Errors related to go.mod operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No go.mod in the directory or any parent
    #[error("go.mod not found in {path} or any parent directory")]
    NotFound { path: PathBuf },

    /// Failed to read go.mod
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// go.mod lacks a module directive
    #[error("no module directive in {path}")]
    MissingModule { path: PathBuf },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the import rewriter
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Directory traversal failed
    #[error("failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Failed to read a source file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a source file
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised when running the `go` command
#[derive(Error, Debug)]
pub enum GoToolError {
    /// The command could not be started
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully
    #[error("'{command}' exited with {status}")]
    Failed { command: String, status: String },
}

/// Errors related to configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// GOPROXY disables proxy access
    #[error("module proxy access is disabled (GOPROXY=off)")]
    ProxyDisabled,

    /// GOPROXY entry is not a usable URL
    #[error("invalid GOPROXY entry '{value}'")]
    InvalidProxy { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_error_invalid() {
        let err = VersionError::invalid("v1.x");
        assert_eq!(err.to_string(), "invalid version: v1.x");
    }

    #[test]
    fn test_registry_error_not_found() {
        let err = RegistryError::not_found("github.com/foo/bar", "Go Proxy");
        let msg = err.to_string();
        assert!(msg.contains("module 'github.com/foo/bar' not found"));
        assert!(msg.contains("Go Proxy"));
    }

    #[test]
    fn test_registry_error_package_not_found() {
        let err = RegistryError::package_not_found("example.com/nope/pkg");
        assert_eq!(
            err.to_string(),
            "failed to find module for package: example.com/nope/pkg"
        );
    }

    #[test]
    fn test_registry_error_network() {
        let err = RegistryError::network_error("golang.org/x/mod", "Go Proxy", "connection refused");
        let msg = err.to_string();
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_registry_error_timeout() {
        let err = RegistryError::timeout("golang.org/x/mod", "Go Proxy");
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_resolve_error_from_version_error() {
        let err: ResolveError = VersionError::invalid("bogus").into();
        assert_eq!(err.to_string(), "invalid version: bogus");
    }

    #[test]
    fn test_resolve_error_missing_spec() {
        assert_eq!(ResolveError::MissingSpec.to_string(), "missing package spec");
    }

    #[test]
    fn test_resolve_error_unsupported_query() {
        let err = ResolveError::UnsupportedQuery {
            query: "latest".to_string(),
            operation: "path",
        };
        assert_eq!(
            err.to_string(),
            "version query latest is not supported by path"
        );
    }

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/tmp/project");
        assert!(err.to_string().contains("go.mod not found"));
    }

    #[test]
    fn test_app_error_from_registry_error() {
        let app_err: AppError = RegistryError::package_not_found("pkg").into();
        assert!(app_err.to_string().contains("failed to find module"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::ProxyDisabled.into();
        assert!(app_err.to_string().contains("GOPROXY=off"));
    }

    #[test]
    fn test_go_tool_error_display() {
        let err = GoToolError::Failed {
            command: "go get example.com/foo/v2@v2.0.0".to_string(),
            status: "exit status: 1".to_string(),
        };
        assert!(err.to_string().contains("go get example.com/foo/v2@v2.0.0"));
    }
}
