//! Module path algebra
//!
//! Maps between a version-independent module prefix, the major version
//! encoded in a module path, and the package sub-path below the module
//! root. Two path conventions exist:
//! - Standard: `github.com/pkg/errors/v3` (new path segment, only for v2+)
//! - Legacy host: `gopkg.in/yaml.v2` (dot suffix on the last segment)

use super::version;
use std::fmt;

/// Path prefix that selects the legacy-host convention
pub const LEGACY_HOST_MARKER: &str = "gopkg.in/";

/// Major version suffix convention of a module path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathConvention {
    /// `prefix/vN`, emitted only for N >= 2
    Standard,
    /// `prefix.vN`
    LegacyHost,
}

impl PathConvention {
    /// Determines the convention a module path follows
    pub fn of(path: &str) -> Self {
        if path.starts_with(LEGACY_HOST_MARKER) {
            PathConvention::LegacyHost
        } else {
            PathConvention::Standard
        }
    }

    /// Appends the suffix for `major` to `prefix`
    pub fn encode(self, prefix: &str, major: Option<u64>) -> String {
        let major = match major {
            Some(m) if m >= 2 => m,
            _ => return prefix.to_string(),
        };
        match self {
            PathConvention::LegacyHost => format!("{}.v{}", prefix, major),
            PathConvention::Standard if prefix.ends_with('/') => format!("{}v{}", prefix, major),
            PathConvention::Standard => format!("{}/v{}", prefix, major),
        }
    }

    /// Splits a trailing major suffix off `path`
    ///
    /// Returns the path unchanged and `None` when no well-formed suffix is
    /// present. The standard convention never recognises `/v0` or `/v1`.
    pub fn strip(self, path: &str) -> (&str, Option<u64>) {
        let marker = match self {
            PathConvention::LegacyHost => ".v",
            PathConvention::Standard => "/v",
        };
        let Some(start) = path.rfind(marker) else {
            return (path, None);
        };

        let digits = &path[start + 2..];
        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return (path, None);
        }
        let Ok(major) = digits.parse::<u64>() else {
            return (path, None);
        };

        let prefix = &path[..start];
        let attached = match self {
            PathConvention::Standard => major >= 2 && !prefix.is_empty(),
            // the dot suffix must extend a segment, not stand alone
            PathConvention::LegacyHost => !prefix.is_empty() && !prefix.ends_with('/'),
        };
        if attached {
            (prefix, Some(major))
        } else {
            (path, None)
        }
    }
}

/// Appends the major version suffix to `prefix` using its convention
///
/// `None`, `Some(0)` and `Some(1)` all leave the prefix unchanged.
pub fn encode(prefix: &str, major: Option<u64>) -> String {
    PathConvention::of(prefix).encode(prefix, major)
}

/// Splits a trailing major version suffix off `path`
pub fn strip(path: &str) -> (&str, Option<u64>) {
    PathConvention::of(path).strip(path)
}

/// Returns the version-independent prefix of a module path
pub fn mod_prefix(path: &str) -> &str {
    strip(path).0
}

/// Returns the major version encoded in a module path, if any
pub fn mod_major(path: &str) -> Option<u64> {
    strip(path).1
}

/// Formats a major number as a version token (`3` -> `v3`)
pub fn major_token(major: u64) -> String {
    format!("v{}", major)
}

/// Parses a major token in any of the forms `v3`, `/v3`, `.v3`
pub fn parse_major_token(token: &str) -> Option<u64> {
    let token = token.trim_start_matches(['/', '.']);
    token.strip_prefix('v')?.parse().ok()
}

/// A package path split at its module root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposed<'a> {
    /// Module root as it appears in the full path (prefix plus suffix)
    pub root: &'a str,
    /// Major version encoded at the module root boundary
    pub major: Option<u64>,
    /// Remainder below the module root, empty or starting with `/`
    pub sub_path: &'a str,
}

/// Splits `full_path` into module root and sub-path for the module `prefix`
///
/// Returns `None` when `full_path` does not belong to the module. The
/// prefix must end on a path segment boundary: `foo/ba` does not own
/// `foo/bar`.
pub fn decompose<'a>(full_path: &'a str, prefix: &str) -> Option<Decomposed<'a>> {
    if prefix.is_empty() {
        return None;
    }
    let rest = full_path.strip_prefix(prefix)?;
    let convention = PathConvention::of(prefix);

    match rest.as_bytes().first() {
        None => Some(Decomposed {
            root: full_path,
            major: None,
            sub_path: "",
        }),
        Some(b'/') => {
            let segment_end = rest[1..].find('/').map_or(rest.len(), |i| i + 1);
            let candidate = &full_path[..prefix.len() + segment_end];
            match convention.strip(candidate) {
                (stripped, Some(major)) if stripped == prefix => Some(Decomposed {
                    root: candidate,
                    major: Some(major),
                    sub_path: &full_path[candidate.len()..],
                }),
                _ => Some(Decomposed {
                    root: &full_path[..prefix.len()],
                    major: None,
                    sub_path: rest,
                }),
            }
        }
        Some(b'.') if convention == PathConvention::LegacyHost => {
            let root_end = rest.find('/').unwrap_or(rest.len());
            let candidate = &full_path[..prefix.len() + root_end];
            match convention.strip(candidate) {
                (stripped, Some(major)) if stripped == prefix => Some(Decomposed {
                    root: candidate,
                    major: Some(major),
                    sub_path: &full_path[candidate.len()..],
                }),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Splits `path@query` on the first `@`
pub fn split_spec(spec: &str) -> (&str, &str) {
    spec.split_once('@').unwrap_or((spec, ""))
}

/// Returns the module path that serves `version` of the module `prefix`
///
/// Versions tagged `+incompatible` live at the unsuffixed path, except on
/// the legacy host where every major, v0 and v1 included, has its own
/// `.vN` path.
pub fn module_path_for(prefix: &str, version: &str) -> String {
    let major = version::major_number(version);
    match PathConvention::of(prefix) {
        PathConvention::LegacyHost => match major {
            Some(major) => format!("{}.v{}", prefix, major),
            None => prefix.to_string(),
        },
        PathConvention::Standard if version::is_incompatible(version) => prefix.to_string(),
        PathConvention::Standard => PathConvention::Standard.encode(prefix, major),
    }
}

/// Returns the full package path for `version` of module `prefix`
pub fn join_path(prefix: &str, version: &str, sub_path: &str) -> String {
    join_sub_path(&module_path_for(prefix, version), sub_path)
}

/// Appends a sub-path to a module root
pub fn join_sub_path(root: &str, sub_path: &str) -> String {
    let sub_path = sub_path.trim_start_matches('/');
    if sub_path.is_empty() {
        root.to_string()
    } else {
        format!("{}/{}", root.trim_end_matches('/'), sub_path)
    }
}

/// Identifies a module root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleCoordinate {
    /// Version-independent root path
    pub prefix: String,
    /// Encoded major version; `None` for v0 and v1
    pub major: Option<u64>,
}

impl ModuleCoordinate {
    /// Creates a coordinate, canonicalising an encoded suffix on `prefix`
    pub fn new(prefix: &str, major: Option<u64>) -> Self {
        let (prefix, encoded) = strip(prefix);
        Self {
            prefix: prefix.to_string(),
            major: major.or(encoded).filter(|m| *m >= 2),
        }
    }

    /// Parses a module path into its coordinate
    pub fn parse(path: &str) -> Self {
        Self::new(path, None)
    }

    /// Returns the module path
    pub fn path(&self) -> String {
        encode(&self.prefix, self.major)
    }

    /// Returns the same module at another major version
    pub fn with_major(&self, major: Option<u64>) -> Self {
        Self {
            prefix: self.prefix.clone(),
            major: major.filter(|m| *m >= 2),
        }
    }
}

impl fmt::Display for ModuleCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// A concrete import path split into module and sub-path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageReference {
    /// Owning module
    pub module: ModuleCoordinate,
    /// Path below the module root, empty or starting with `/`
    pub sub_path: String,
}

impl PackageReference {
    /// Splits `full_path` for the module with prefix `module_prefix`
    pub fn parse(full_path: &str, module_prefix: &str) -> Option<Self> {
        let parts = decompose(full_path, module_prefix)?;
        Some(Self {
            module: ModuleCoordinate {
                prefix: module_prefix.to_string(),
                major: parts.major,
            },
            sub_path: parts.sub_path.to_string(),
        })
    }

    /// Returns the full import path
    pub fn full_path(&self) -> String {
        format!("{}{}", self.module.path(), self.sub_path)
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIXES: &[&str] = &[
        "github.com/pkg/errors",
        "example.com/a/b/c",
        "gopkg.in/yaml",
        "gopkg.in/src-d/go-git",
    ];

    #[test]
    fn test_convention_detection() {
        assert_eq!(PathConvention::of("gopkg.in/yaml"), PathConvention::LegacyHost);
        assert_eq!(
            PathConvention::of("github.com/pkg/errors"),
            PathConvention::Standard
        );
        assert_eq!(
            PathConvention::of("example.com/gopkg.in/x"),
            PathConvention::Standard
        );
    }

    #[test]
    fn test_encode_standard() {
        assert_eq!(
            encode("github.com/pkg/errors", Some(3)),
            "github.com/pkg/errors/v3"
        );
        assert_eq!(encode("example.com/foo/", Some(2)), "example.com/foo/v2");
    }

    #[test]
    fn test_encode_legacy_host() {
        assert_eq!(encode("gopkg.in/yaml", Some(2)), "gopkg.in/yaml.v2");
        assert_eq!(encode("gopkg.in/yaml", Some(3)), "gopkg.in/yaml.v3");
    }

    #[test]
    fn test_encode_low_majors_are_unsuffixed() {
        for prefix in PREFIXES {
            assert_eq!(encode(prefix, None), *prefix);
            assert_eq!(encode(prefix, Some(0)), *prefix);
            assert_eq!(encode(prefix, Some(1)), *prefix);
            assert_eq!(strip(&encode(prefix, Some(0))), (*prefix, None));
            assert_eq!(strip(&encode(prefix, Some(1))), (*prefix, None));
        }
    }

    #[test]
    fn test_strip_round_trip() {
        for prefix in PREFIXES {
            for major in [2, 3, 10, 42] {
                assert_eq!(strip(&encode(prefix, Some(major))), (*prefix, Some(major)));
            }
        }
    }

    #[test]
    fn test_strip_standard_rejects_malformed() {
        assert_eq!(strip("example.com/foo/v1"), ("example.com/foo/v1", None));
        assert_eq!(strip("example.com/foo/v0"), ("example.com/foo/v0", None));
        assert_eq!(strip("example.com/foo/v02"), ("example.com/foo/v02", None));
        assert_eq!(strip("example.com/foo/v2.1"), ("example.com/foo/v2.1", None));
        assert_eq!(strip("example.com/foo/vx"), ("example.com/foo/vx", None));
        assert_eq!(strip("example.com/foov2"), ("example.com/foov2", None));
        assert_eq!(strip("/v2"), ("/v2", None));
    }

    #[test]
    fn test_strip_legacy_host() {
        assert_eq!(strip("gopkg.in/yaml.v2"), ("gopkg.in/yaml", Some(2)));
        assert_eq!(strip("gopkg.in/yaml.v1"), ("gopkg.in/yaml", Some(1)));
        assert_eq!(strip("gopkg.in/yaml"), ("gopkg.in/yaml", None));
        assert_eq!(strip("gopkg.in/yaml.v02"), ("gopkg.in/yaml.v02", None));
        assert_eq!(strip("gopkg.in/.v2"), ("gopkg.in/.v2", None));
    }

    #[test]
    fn test_mod_prefix_and_major() {
        assert_eq!(mod_prefix("github.com/foo/bar/v4"), "github.com/foo/bar");
        assert_eq!(mod_major("github.com/foo/bar/v4"), Some(4));
        assert_eq!(mod_prefix("github.com/foo/bar"), "github.com/foo/bar");
        assert_eq!(mod_major("github.com/foo/bar"), None);
    }

    #[test]
    fn test_parse_major_token() {
        assert_eq!(parse_major_token("v3"), Some(3));
        assert_eq!(parse_major_token("/v3"), Some(3));
        assert_eq!(parse_major_token(".v3"), Some(3));
        assert_eq!(parse_major_token("3"), None);
        assert_eq!(major_token(7), "v7");
    }

    #[test]
    fn test_decompose_module_root() {
        let parts = decompose("github.com/foo/bar", "github.com/foo/bar").unwrap();
        assert_eq!(parts.root, "github.com/foo/bar");
        assert_eq!(parts.major, None);
        assert_eq!(parts.sub_path, "");
    }

    #[test]
    fn test_decompose_with_major_and_sub_path() {
        let parts = decompose("github.com/foo/bar/v2/baz/qux", "github.com/foo/bar").unwrap();
        assert_eq!(parts.root, "github.com/foo/bar/v2");
        assert_eq!(parts.major, Some(2));
        assert_eq!(parts.sub_path, "/baz/qux");
    }

    #[test]
    fn test_decompose_without_major() {
        let parts = decompose("github.com/foo/bar/baz", "github.com/foo/bar").unwrap();
        assert_eq!(parts.root, "github.com/foo/bar");
        assert_eq!(parts.major, None);
        assert_eq!(parts.sub_path, "/baz");
    }

    #[test]
    fn test_decompose_respects_segment_boundary() {
        assert!(decompose("foo/bar", "foo/ba").is_none());
        assert!(decompose("github.com/foo/barbaz", "github.com/foo/bar").is_none());
        assert!(decompose("github.com/other/bar", "github.com/foo/bar").is_none());
        assert!(decompose("github.com/foo/bar", "").is_none());
    }

    #[test]
    fn test_decompose_legacy_host() {
        let parts = decompose("gopkg.in/yaml.v2", "gopkg.in/yaml").unwrap();
        assert_eq!(parts.root, "gopkg.in/yaml.v2");
        assert_eq!(parts.major, Some(2));
        assert_eq!(parts.sub_path, "");

        let parts = decompose("gopkg.in/src-d/go-git.v4/plumbing", "gopkg.in/src-d/go-git")
            .unwrap();
        assert_eq!(parts.root, "gopkg.in/src-d/go-git.v4");
        assert_eq!(parts.sub_path, "/plumbing");

        assert!(decompose("gopkg.in/yamlx.v2", "gopkg.in/yaml").is_none());
        assert!(decompose("gopkg.in/yaml.vx", "gopkg.in/yaml").is_none());
    }

    #[test]
    fn test_decompose_standard_rejects_dot_boundary() {
        assert!(decompose("github.com/foo/bar.v2", "github.com/foo/bar").is_none());
    }

    #[test]
    fn test_decompose_reconstruction() {
        let paths = [
            ("github.com/foo/bar", "github.com/foo/bar"),
            ("github.com/foo/bar/v3", "github.com/foo/bar"),
            ("github.com/foo/bar/v3/x/y", "github.com/foo/bar"),
            ("github.com/foo/bar/x/v3", "github.com/foo/bar"),
            ("gopkg.in/yaml.v3", "gopkg.in/yaml"),
            ("gopkg.in/yaml.v3/sub", "gopkg.in/yaml"),
        ];
        for (full, prefix) in paths {
            let parts = decompose(full, prefix).unwrap();
            let (root_prefix, root_major) = strip(parts.root);
            assert_eq!(format!("{}{}", encode(root_prefix, root_major), parts.sub_path), full);
        }
    }

    #[test]
    fn test_split_spec() {
        assert_eq!(
            split_spec("github.com/foo/bar@v2.0.0"),
            ("github.com/foo/bar", "v2.0.0")
        );
        assert_eq!(split_spec("github.com/foo/bar"), ("github.com/foo/bar", ""));
        assert_eq!(split_spec("github.com/foo/bar@"), ("github.com/foo/bar", ""));
        assert_eq!(split_spec("a@b@c"), ("a", "b@c"));
    }

    #[test]
    fn test_module_path_for_incompatible() {
        assert_eq!(
            module_path_for("github.com/foo/bar", "v2.0.0+incompatible"),
            "github.com/foo/bar"
        );
        assert_eq!(
            module_path_for("gopkg.in/yaml", "v2.0.0+incompatible"),
            "gopkg.in/yaml.v2"
        );
        assert_eq!(module_path_for("github.com/foo/bar", "v2.0.0"), "github.com/foo/bar/v2");
        assert_eq!(module_path_for("github.com/foo/bar", "v1.9.0"), "github.com/foo/bar");
    }

    #[test]
    fn test_module_path_for_legacy_host_low_majors() {
        assert_eq!(module_path_for("gopkg.in/check", "v1.0.0"), "gopkg.in/check.v1");
        assert_eq!(module_path_for("gopkg.in/check", "v0.3.0"), "gopkg.in/check.v0");
        assert_eq!(module_path_for("gopkg.in/check", "not-a-version"), "gopkg.in/check");
        assert_eq!(join_path("gopkg.in/check", "v1", "/sub"), "gopkg.in/check.v1/sub");
        // the literal encoding still leaves low majors bare
        assert_eq!(encode("gopkg.in/check", Some(1)), "gopkg.in/check");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("github.com/foo/bar", "v3.1.0", ""), "github.com/foo/bar/v3");
        assert_eq!(
            join_path("github.com/foo/bar", "v3.1.0", "/baz"),
            "github.com/foo/bar/v3/baz"
        );
        assert_eq!(
            join_path("github.com/foo/bar", "v1.0.0", "baz"),
            "github.com/foo/bar/baz"
        );
        assert_eq!(join_path("gopkg.in/yaml", "v3", "/sub"), "gopkg.in/yaml.v3/sub");
    }

    #[test]
    fn test_module_coordinate() {
        let coord = ModuleCoordinate::parse("github.com/foo/bar/v5");
        assert_eq!(coord.prefix, "github.com/foo/bar");
        assert_eq!(coord.major, Some(5));
        assert_eq!(coord.to_string(), "github.com/foo/bar/v5");
        assert_eq!(coord.with_major(Some(1)).path(), "github.com/foo/bar");
        assert_eq!(ModuleCoordinate::new("github.com/foo/bar", Some(1)).major, None);
    }

    #[test]
    fn test_package_reference() {
        let reference =
            PackageReference::parse("github.com/foo/bar/v2/baz", "github.com/foo/bar").unwrap();
        assert_eq!(reference.module.major, Some(2));
        assert_eq!(reference.sub_path, "/baz");
        assert_eq!(reference.full_path(), "github.com/foo/bar/v2/baz");
        assert!(PackageReference::parse("github.com/other/x", "github.com/foo/bar").is_none());
    }
}
