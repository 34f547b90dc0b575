//! Semantic versions as used by Go modules
//!
//! Go versions always carry a leading `v` and accept the shorthands
//! `vMAJOR` and `vMAJOR.MINOR`, which stand for `vMAJOR.0.0` and
//! `vMAJOR.MINOR.0`. Shorthands may not carry pre-release or build
//! suffixes. Build metadata never takes part in ordering.

use crate::error::VersionError;
use semver::Version;
use std::cmp::Ordering;

/// Build tag marking a major version >= 2 published without a major path suffix
pub const INCOMPATIBLE: &str = "incompatible";

/// Parses a Go version into a full semantic version
fn parse(version: &str) -> Option<Version> {
    let rest = version.strip_prefix('v')?;
    let core_end = rest.find(['-', '+']).unwrap_or(rest.len());
    let (core, suffix) = rest.split_at(core_end);

    let canonical = match core.split('.').count() {
        3 => rest.to_string(),
        2 if suffix.is_empty() => format!("{}.0", core),
        1 if suffix.is_empty() => format!("{}.0.0", core),
        _ => return None,
    };

    Version::parse(&canonical).ok()
}

/// Returns true if `version` is a valid Go semantic version
pub fn is_valid(version: &str) -> bool {
    parse(version).is_some()
}

/// Validates `version`, returning it unchanged
pub fn validate(version: &str) -> Result<&str, VersionError> {
    if is_valid(version) {
        Ok(version)
    } else {
        Err(VersionError::invalid(version))
    }
}

/// Returns the major version number
pub fn major_number(version: &str) -> Option<u64> {
    parse(version).map(|v| v.major)
}

/// Returns the major version prefix (`v2.3.1` -> `v2`)
pub fn major(version: &str) -> Option<String> {
    major_number(version).map(|m| format!("v{}", m))
}

/// Returns true if the version carries a pre-release component
pub fn is_prerelease(version: &str) -> bool {
    parse(version).is_some_and(|v| !v.pre.is_empty())
}

/// Returns the pre-release component without its `-`, empty if none
pub fn prerelease(version: &str) -> String {
    parse(version).map(|v| v.pre.to_string()).unwrap_or_default()
}

/// Returns the build metadata without its `+`, empty if none
pub fn build(version: &str) -> String {
    parse(version).map(|v| v.build.to_string()).unwrap_or_default()
}

/// Returns true if the version is tagged `+incompatible`
pub fn is_incompatible(version: &str) -> bool {
    parse(version).is_some_and(|v| v.build.as_str() == INCOMPATIBLE)
}

/// Compares two versions by precedence
///
/// Invalid versions sort below valid ones and compare equal to each other.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.cmp_precedence(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Returns the greater of two versions
///
/// Any `+incompatible` version ranks below every compatible one so that a
/// module that adopted major path suffixes is preferred over its legacy tags.
pub fn max_version<'a>(a: &'a str, b: &'a str) -> &'a str {
    match (is_incompatible(a), is_incompatible(b)) {
        (true, false) if is_valid(b) => return b,
        (false, true) if is_valid(a) => return a,
        _ => {}
    }
    if compare(a, b) == Ordering::Greater {
        a
    } else {
        b
    }
}

/// Returns the major version following the one in `version` (`v1.4.0` -> `v2`)
pub fn next_major(version: &str) -> Result<String, VersionError> {
    let major = major_number(version).ok_or_else(|| VersionError::invalid(version))?;
    Ok(format!("v{}", major + 1))
}
