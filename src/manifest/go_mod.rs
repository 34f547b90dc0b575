//! go.mod parser for Go modules
//!
//! Handles:
//! - module directive (bare or quoted path)
//! - require statements (single and block) with `// indirect` markers
//! - replace directives (single and block, with or without a version)

use crate::domain::DependencyRecord;
use crate::error::ManifestError;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Name of the module definition file
pub const GO_MOD: &str = "go.mod";

// module example.com/foo
static MODULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^module\s+"?([^\s"]+)"?\s*(//.*)?$"#).unwrap());

// Regex for single require: require module/path v1.2.3
static SINGLE_REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^require\s+"?([^\s"]+)"?\s+(v[^\s/]+)\s*(//.*)?$"#).unwrap()
});

// Regex for require block entry: module/path v1.2.3
static BLOCK_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?([^\s"]+)"?\s+(v[^\s/]+)\s*(//.*)?$"#).unwrap());

// Left-hand side of a replace: module/path [v1.2.3] =>
static REPLACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?([^\s"]+)"?(?:\s+(v\S+))?\s+=>"#).unwrap());

// Block opener: require ( / replace ( / exclude ( ...
static BLOCK_START_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+)\s*\($").unwrap());

static INDIRECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//\s*indirect\b").unwrap());

/// A requirement on another module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Required module path
    pub path: String,
    /// Required version
    pub version: String,
    /// Marked `// indirect`
    pub indirect: bool,
}

/// The left-hand side of a replace directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Replaced module path
    pub path: String,
    /// Replaced version; every version when `None`
    pub version: Option<String>,
}

impl Replacement {
    /// Returns true if this directive replaces `requirement`
    pub fn applies_to(&self, requirement: &Requirement) -> bool {
        self.path == requirement.path
            && self
                .version
                .as_ref()
                .is_none_or(|v| *v == requirement.version)
    }
}

/// Parsed contents of a go.mod file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoModFile {
    /// Module path declared by the module directive
    pub module: Option<String>,
    /// Requirements in file order
    pub requires: Vec<Requirement>,
    /// Replace directives in file order
    pub replaces: Vec<Replacement>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    Other,
}

impl GoModFile {
    /// Parses go.mod text
    ///
    /// Lines that do not parse are ignored.
    pub fn parse(content: &str) -> Self {
        let mut file = GoModFile::default();
        let mut block = Block::None;

        for line in content.lines() {
            let trimmed = line.trim();

            // Skip empty lines and comments
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            if block != Block::None {
                if trimmed == ")" {
                    block = Block::None;
                    continue;
                }
                match block {
                    Block::Require => file.push_require(trimmed, &BLOCK_ENTRY_RE),
                    Block::Replace => file.push_replace(trimmed),
                    _ => {}
                }
                continue;
            }

            if let Some(caps) = BLOCK_START_RE.captures(trimmed) {
                block = match &caps[1] {
                    "require" => Block::Require,
                    "replace" => Block::Replace,
                    _ => Block::Other,
                };
                continue;
            }

            if let Some(caps) = MODULE_RE.captures(trimmed) {
                file.module = Some(caps[1].to_string());
            } else if trimmed.starts_with("require") {
                file.push_require(trimmed, &SINGLE_REQUIRE_RE);
            } else if let Some(rest) = trimmed.strip_prefix("replace") {
                file.push_replace(rest.trim_start());
            }
        }

        file
    }

    fn push_require(&mut self, line: &str, re: &Regex) {
        if let Some(caps) = re.captures(line) {
            let comment = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            self.requires.push(Requirement {
                path: caps[1].to_string(),
                version: caps[2].to_string(),
                indirect: INDIRECT_RE.is_match(comment),
            });
        }
    }

    fn push_replace(&mut self, line: &str) {
        if let Some(caps) = REPLACE_RE.captures(line) {
            self.replaces.push(Replacement {
                path: caps[1].to_string(),
                version: caps.get(2).map(|m| m.as_str().to_string()),
            });
        }
    }

    /// Reads and parses the go.mod at `path`
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))?;
        Ok(Self::parse(&content))
    }

    /// Returns the module path, failing if the module directive is missing
    pub fn module_path(&self, path: &Path) -> Result<&str, ManifestError> {
        self.module
            .as_deref()
            .ok_or_else(|| ManifestError::MissingModule {
                path: path.to_path_buf(),
            })
    }

    /// Returns true if a replace directive applies to `requirement`
    pub fn is_replaced(&self, requirement: &Requirement) -> bool {
        self.replaces.iter().any(|r| r.applies_to(requirement))
    }

    /// Lists first-order dependencies
    ///
    /// Indirect, replaced and main-module requirements are excluded. A path
    /// required more than once is reported once.
    pub fn direct_dependencies(&self) -> Vec<DependencyRecord> {
        let mut seen = HashSet::new();
        self.requires
            .iter()
            .filter(|r| !r.indirect)
            .filter(|r| self.module.as_deref() != Some(r.path.as_str()))
            .filter(|r| !self.is_replaced(r))
            .filter(|r| seen.insert(r.path.as_str()))
            .map(|r| DependencyRecord::new(&r.path, r.version.as_str()))
            .collect()
    }
}

/// Finds the go.mod governing `dir`, searching parent directories
pub fn find_mod_file(dir: &Path) -> Result<PathBuf, ManifestError> {
    let start = dir.canonicalize().map_err(|_| ManifestError::not_found(dir))?;
    for ancestor in start.ancestors() {
        let candidate = ancestor.join(GO_MOD);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found go.mod");
            return Ok(candidate);
        }
    }
    Err(ManifestError::not_found(dir))
}

/// Lists the direct dependencies of the module governing `dir`
pub fn direct(dir: &Path) -> Result<Vec<DependencyRecord>, ManifestError> {
    let path = find_mod_file(dir)?;
    let file = GoModFile::load(&path)?;
    file.module_path(&path)?;
    Ok(file.direct_dependencies())
}
