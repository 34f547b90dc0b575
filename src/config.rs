//! Environment configuration
//!
//! Reads the Go toolchain variables that affect module lookups:
//! - `GOPROXY`: proxy list, first HTTP(S) entry is used
//! - `GOPRIVATE` / `GONOPROXY`: module path globs never sent to the proxy

use crate::error::ConfigError;
use crate::registry::GO_PROXY_URL;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use tracing::debug;

/// Concurrent list lookups when the proxy may answer from its cache
const CACHED_CONCURRENCY: usize = 3;

/// Concurrent list lookups when the proxy has to fetch from origin
const UNCACHED_CONCURRENCY: usize = 1;

/// Resolved environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the module proxy
    pub proxy_url: String,
    /// Module path globs excluded from proxy lookups
    pub private_patterns: Vec<String>,
}

impl Config {
    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let proxy_url = match lookup("GOPROXY") {
            Some(value) if !value.trim().is_empty() => parse_proxy_list(&value)?,
            _ => GO_PROXY_URL.to_string(),
        };

        // first occurrence wins; GONOPROXY often repeats GOPRIVATE
        let mut seen = HashSet::new();
        let mut private_patterns = Vec::new();
        for key in ["GOPRIVATE", "GONOPROXY"] {
            let Some(value) = lookup(key) else {
                continue;
            };
            for pattern in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                if seen.insert(pattern.to_string()) {
                    private_patterns.push(pattern.to_string());
                }
            }
        }

        debug!(%proxy_url, ?private_patterns, "loaded configuration");
        Ok(Self {
            proxy_url,
            private_patterns,
        })
    }

    /// Returns true if `module_path` matches a private pattern
    ///
    /// A pattern matches when it matches a leading run of path segments of
    /// the same length as the pattern, so `example.com/*` covers
    /// `example.com/a/b`.
    pub fn is_private(&self, module_path: &str) -> bool {
        self.private_patterns
            .iter()
            .any(|pattern| match_prefix_pattern(pattern, module_path))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_url: GO_PROXY_URL.to_string(),
            private_patterns: Vec::new(),
        }
    }
}

/// Picks the proxy URL from a `GOPROXY` list
fn parse_proxy_list(value: &str) -> Result<String, ConfigError> {
    let mut saw_direct = false;
    for entry in value.split([',', '|']).map(str::trim) {
        match entry {
            "" => continue,
            "off" => return Err(ConfigError::ProxyDisabled),
            "direct" => saw_direct = true,
            url if url.starts_with("https://") || url.starts_with("http://") => {
                return Ok(url.trim_end_matches('/').to_string());
            }
            other => {
                return Err(ConfigError::InvalidProxy {
                    value: other.to_string(),
                })
            }
        }
    }
    if saw_direct {
        debug!("GOPROXY lists only direct, using the public proxy for version lookups");
    }
    Ok(GO_PROXY_URL.to_string())
}

/// Matches `pattern` against the leading segments of `path`
fn match_prefix_pattern(pattern: &str, path: &str) -> bool {
    let pattern = pattern.trim_end_matches('/');
    let Ok(glob) = Pattern::new(pattern) else {
        return false;
    };
    let segments = pattern.split('/').count();
    let prefix_end = path
        .match_indices('/')
        .nth(segments - 1)
        .map_or(path.len(), |(i, _)| i);

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    glob.matches_with(&path[..prefix_end], options)
}

/// Concurrency limits for dependency lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig {
    /// Limit when cached answers are allowed
    pub cached_concurrency: usize,
    /// Limit when every lookup may hit the origin
    pub uncached_concurrency: usize,
}

impl ListConfig {
    /// Returns the limit for the given cache mode
    pub fn concurrency(&self, cached: bool) -> usize {
        if cached {
            self.cached_concurrency
        } else {
            self.uncached_concurrency
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            cached_concurrency: CACHED_CONCURRENCY,
            uncached_concurrency: UNCACHED_CONCURRENCY,
        }
    }
}
