//! Version queries and their resolved form

use super::version;
use crate::error::VersionError;
use serde::Serialize;
use std::fmt;

/// What the user asked for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VersionQuery {
    /// No query: the best version implied by the requested path
    #[default]
    Unspecified,
    /// `latest`: the newest version across all majors
    Latest,
    /// `master` or `default`: the newest version, branch alias kept for fetching
    Branch(String),
    /// A concrete semantic version
    Explicit(String),
    /// The major version after the current one; only valid for module renames
    IncrementMajor,
}

impl VersionQuery {
    /// Classifies the raw query part of a `path@query` spec
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        match raw {
            "" => Ok(VersionQuery::Unspecified),
            "latest" => Ok(VersionQuery::Latest),
            "master" | "default" => Ok(VersionQuery::Branch(raw.to_string())),
            v => version::validate(v).map(|v| VersionQuery::Explicit(v.to_string())),
        }
    }

    /// Returns the literal query token, empty when none applies
    pub fn token(&self) -> &str {
        match self {
            VersionQuery::Unspecified | VersionQuery::IncrementMajor => "",
            VersionQuery::Latest => "latest",
            VersionQuery::Branch(name) => name,
            VersionQuery::Explicit(v) => v,
        }
    }
}

impl fmt::Display for VersionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionQuery::Unspecified => write!(f, "(unspecified)"),
            VersionQuery::IncrementMajor => write!(f, "(next major)"),
            other => write!(f, "{}", other.token()),
        }
    }
}

/// A query resolved to a concrete version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    /// Target version (`v2.3.1`, `v3`, `v2.0.0+incompatible`)
    pub version: String,
    /// Token appended to the fetch spec after `@`; empty for none
    pub query: String,
    /// Whether pre-release versions were eligible
    pub allow_prerelease: bool,
}

impl ResolvedVersion {
    /// Creates a resolved version
    pub fn new(version: impl Into<String>, query: impl Into<String>, allow_prerelease: bool) -> Self {
        Self {
            version: version.into(),
            query: query.into(),
            allow_prerelease,
        }
    }

    /// Returns true if the target is tagged `+incompatible`
    pub fn is_incompatible(&self) -> bool {
        version::is_incompatible(&self.version)
    }

    /// Returns the target major number
    pub fn major(&self) -> Option<u64> {
        version::major_number(&self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classifies_queries() {
        assert_eq!(VersionQuery::parse("").unwrap(), VersionQuery::Unspecified);
        assert_eq!(VersionQuery::parse("latest").unwrap(), VersionQuery::Latest);
        assert_eq!(
            VersionQuery::parse("master").unwrap(),
            VersionQuery::Branch("master".to_string())
        );
        assert_eq!(
            VersionQuery::parse("default").unwrap(),
            VersionQuery::Branch("default".to_string())
        );
        assert_eq!(
            VersionQuery::parse("v2.1.0").unwrap(),
            VersionQuery::Explicit("v2.1.0".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_invalid_version() {
        let err = VersionQuery::parse("2.1.0").unwrap_err();
        assert_eq!(err, VersionError::invalid("2.1.0"));
        assert!(VersionQuery::parse("main").is_err());
    }

    #[test]
    fn test_token() {
        assert_eq!(VersionQuery::Unspecified.token(), "");
        assert_eq!(VersionQuery::IncrementMajor.token(), "");
        assert_eq!(VersionQuery::Latest.token(), "latest");
        assert_eq!(VersionQuery::Explicit("v3".to_string()).token(), "v3");
    }

    #[test]
    fn test_resolved_version() {
        let resolved = ResolvedVersion::new("v2.0.0+incompatible", "", false);
        assert!(resolved.is_incompatible());
        assert_eq!(resolved.major(), Some(2));
    }
}
