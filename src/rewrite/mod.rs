//! Import path rewriting across a Go source tree
//!
//! Walks every `.go` file that belongs to the module rooted at the given
//! directory and rewrites import paths through a caller-supplied mapping.
//! Each file is replaced through a temporary sibling and a rename, so a
//! file is either fully rewritten or left as it was.

mod imports;

pub use imports::{apply_edits, offset_to_line_col, scan_imports, Edit, ImportSpec};

use crate::error::RewriteError;
use crate::manifest::GO_MOD;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

/// Directory names never descended into
const SKIPPED_DIRS: &[&str] = &["vendor", "testdata"];

/// One rewritten import path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceChange {
    /// File containing the import
    pub file: PathBuf,
    /// Line number, 1-indexed
    pub line: usize,
    /// Column number, 1-indexed
    pub column: usize,
    /// Import path before the rewrite
    pub old: String,
    /// Import path after the rewrite
    pub new: String,
}

impl fmt::Display for ReferenceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} {}",
            self.file.display(),
            self.line,
            self.column,
            self.new
        )
    }
}

/// Result of rewriting a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    /// Every rewritten import, ordered by file and position
    pub changes: Vec<ReferenceChange>,
    /// Number of files scanned
    pub files_scanned: usize,
}

impl RewriteReport {
    /// Number of distinct files that were modified
    pub fn files_changed(&self) -> usize {
        let mut files: Vec<&Path> = self.changes.iter().map(|c| c.file.as_path()).collect();
        files.dedup();
        files.len()
    }

    /// Returns true if nothing was rewritten
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Rewrites import paths of every Go file in the module at `root`
///
/// `mapper` returns the new path for an import, or `None` to leave it.
/// Files are processed on several threads.
pub fn rewrite_tree<F>(root: &Path, mapper: &F) -> Result<RewriteReport, RewriteError>
where
    F: Fn(&str) -> Option<String> + Sync,
{
    let files = collect_go_files(root)?;
    let workers = std::thread::available_parallelism()
        .map_or(1, |n| n.get())
        .clamp(1, files.len().max(1));
    let chunk_size = files.len().div_ceil(workers).max(1);
    debug!(root = %root.display(), files = files.len(), workers, "rewriting imports");

    let results: Vec<Result<Vec<ReferenceChange>, RewriteError>> = std::thread::scope(|s| {
        let handles: Vec<_> = files
            .chunks(chunk_size)
            .map(|chunk| {
                s.spawn(move || -> Result<Vec<ReferenceChange>, RewriteError> {
                    let mut changes = Vec::new();
                    for file in chunk {
                        changes.extend(rewrite_file(file, mapper)?);
                    }
                    Ok(changes)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut report = RewriteReport {
        files_scanned: files.len(),
        ..RewriteReport::default()
    };
    for result in results {
        report.changes.extend(result?);
    }
    report
        .changes
        .sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
    Ok(report)
}

/// Rewrites the imports of a single file
///
/// The file is left untouched when no import changes.
pub fn rewrite_file<F>(path: &Path, mapper: &F) -> Result<Vec<ReferenceChange>, RewriteError>
where
    F: Fn(&str) -> Option<String> + ?Sized,
{
    let source = std::fs::read_to_string(path).map_err(|e| RewriteError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (rewritten, changes) = rewrite_source(&source, mapper);
    if changes.is_empty() {
        return Ok(Vec::new());
    }
    write_atomic(path, &rewritten)?;
    debug!(file = %path.display(), changes = changes.len(), "rewrote imports");

    Ok(changes
        .into_iter()
        .map(|(spec, new)| ReferenceChange {
            file: path.to_path_buf(),
            line: spec.line,
            column: spec.column,
            old: spec.path,
            new,
        })
        .collect())
}

/// Rewrites imports in Go source text
///
/// Returns the new text and each changed import with its new path.
pub fn rewrite_source<F>(source: &str, mapper: &F) -> (String, Vec<(ImportSpec, String)>)
where
    F: Fn(&str) -> Option<String> + ?Sized,
{
    let changes: Vec<(ImportSpec, String)> = scan_imports(source)
        .into_iter()
        .filter_map(|spec| {
            let new = mapper(&spec.path).filter(|new| *new != spec.path)?;
            Some((spec, new))
        })
        .collect();

    let edits: Vec<Edit> = changes
        .iter()
        .map(|(spec, new)| Edit {
            start: spec.start,
            end: spec.end,
            new_text: spec.quote(new),
        })
        .collect();

    (apply_edits(source, &edits), changes)
}

/// Collects the Go files of the module at `root`
///
/// Hidden and underscore-prefixed directories, `vendor`, `testdata`, and
/// nested modules are skipped.
pub fn collect_go_files(root: &Path) -> Result<Vec<PathBuf>, RewriteError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e))
    {
        let entry = entry.map_err(|e| RewriteError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "go")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    let name = entry.file_name().to_str().unwrap_or_default();
    if name.starts_with('.') || name.starts_with('_') {
        return true;
    }
    entry.file_type().is_dir()
        && (SKIPPED_DIRS.contains(&name) || entry.path().join(GO_MOD).is_file())
}

/// Replaces `path` with `content` through a temporary sibling file
fn write_atomic(path: &Path, content: &str) -> Result<(), RewriteError> {
    let write_error = |source: std::io::Error| RewriteError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    if let Ok(metadata) = std::fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }
    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn to_v2(path: &str) -> Option<String> {
        path.strip_prefix("example.com/foo")
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .filter(|rest| !rest.starts_with("/v2"))
            .map(|rest| format!("example.com/foo/v2{}", rest))
    }

    #[test]
    fn test_rewrite_source() {
        let source = r#"package main

import (
	"fmt"
	foo "example.com/foo"
	"example.com/foo/bar"
	"example.com/foobar"
)

const s = "example.com/foo"
"#;
        let (rewritten, changes) = rewrite_source(source, &to_v2);

        assert_eq!(changes.len(), 2);
        assert!(rewritten.contains("foo \"example.com/foo/v2\""));
        assert!(rewritten.contains("\"example.com/foo/v2/bar\""));
        assert!(rewritten.contains("\"example.com/foobar\""));
        assert!(rewritten.contains("const s = \"example.com/foo\""));
    }

    #[test]
    fn test_rewrite_source_noop() {
        let source = "package main\n\nimport \"example.com/foo/v2\"\n";
        let (rewritten, changes) = rewrite_source(source, &to_v2);
        assert!(changes.is_empty());
        assert_eq!(rewritten, source);
    }

    #[test]
    fn test_collect_go_files_skips() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for dir in ["pkg", ".git", "_tools", "vendor/x", "testdata", "nested"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("main.go"), "package main\n").unwrap();
        fs::write(root.join("README.md"), "docs\n").unwrap();
        fs::write(root.join("pkg/a.go"), "package pkg\n").unwrap();
        fs::write(root.join(".git/b.go"), "package x\n").unwrap();
        fs::write(root.join("_tools/c.go"), "package x\n").unwrap();
        fs::write(root.join("vendor/x/d.go"), "package x\n").unwrap();
        fs::write(root.join("testdata/e.go"), "package x\n").unwrap();
        fs::write(root.join("nested/go.mod"), "module example.com/nested\n").unwrap();
        fs::write(root.join("nested/f.go"), "package nested\n").unwrap();

        let files = collect_go_files(root).unwrap();
        assert_eq!(files, vec![root.join("main.go"), root.join("pkg/a.go")]);
    }

    #[test]
    fn test_rewrite_tree_reports_changes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("cmd")).unwrap();
        fs::write(
            root.join("main.go"),
            "package main\n\nimport \"example.com/foo\"\n",
        )
        .unwrap();
        fs::write(
            root.join("cmd/tool.go"),
            "package cmd\n\nimport (\n\t\"fmt\"\n\t\"example.com/foo/baz\"\n)\n",
        )
        .unwrap();
        fs::write(root.join("other.go"), "package main\n\nimport \"fmt\"\n").unwrap();

        let report = rewrite_tree(root, &to_v2).unwrap();

        assert_eq!(report.files_scanned, 3);
        assert_eq!(report.files_changed(), 2);
        assert_eq!(
            report.changes[0],
            ReferenceChange {
                file: root.join("cmd/tool.go"),
                line: 5,
                column: 2,
                old: "example.com/foo/baz".to_string(),
                new: "example.com/foo/v2/baz".to_string(),
            }
        );
        assert_eq!(report.changes[1].file, root.join("main.go"));
        assert_eq!(
            fs::read_to_string(root.join("main.go")).unwrap(),
            "package main\n\nimport \"example.com/foo/v2\"\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("other.go")).unwrap(),
            "package main\n\nimport \"fmt\"\n"
        );
    }

    #[test]
    fn test_rewrite_tree_is_idempotent() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("main.go"),
            "package main\n\nimport \"example.com/foo/x\"\n",
        )
        .unwrap();

        let first = rewrite_tree(temp.path(), &to_v2).unwrap();
        let second = rewrite_tree(temp.path(), &to_v2).unwrap();

        assert_eq!(first.changes.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_reference_change_display() {
        let change = ReferenceChange {
            file: PathBuf::from("main.go"),
            line: 3,
            column: 8,
            old: "example.com/foo".to_string(),
            new: "example.com/foo/v2".to_string(),
        };
        assert_eq!(change.to_string(), "main.go:3:8 example.com/foo/v2");
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("main.go");
        fs::write(&file, "package main\n\nimport \"example.com/foo\"\n").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o640)).unwrap();

        rewrite_file(&file, &to_v2).unwrap();

        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
