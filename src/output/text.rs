//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One line per available update, `path: current [latest version]`
//! - One line per rewritten import, `file:line:column new-path`
//! - Summaries in verbose mode

use crate::output::{OutputFormatter, Verbosity};
use crate::resolve::{ListReport, LookupFailure};
use crate::rewrite::RewriteReport;
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Write the `go get` argument of a resolved upgrade
    pub fn format_fetch(&self, spec: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{} {}", "go get".dimmed(), spec.bold())
        } else {
            writeln!(writer, "go get {}", spec)
        }
    }

    /// Write the module path chosen by the path command
    pub fn format_module(&self, module_path: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{} {}", "module".dimmed(), module_path.bold())
        } else {
            writeln!(writer, "module {}", module_path)
        }
    }

    /// Write one line per failed lookup
    pub fn format_failures(
        &self,
        failures: &[LookupFailure],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for failure in failures {
            if self.color {
                writeln!(
                    writer,
                    "{}: {} {}",
                    failure.path,
                    "failed:".red(),
                    failure.message
                )?;
            } else {
                writeln!(writer, "{}: failed: {}", failure.path, failure.message)?;
            }
        }
        Ok(())
    }

    fn plural(count: usize, word: &str) -> String {
        if count == 1 {
            format!("{} {}", count, word)
        } else {
            format!("{} {}s", count, word)
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_list(&self, report: &ListReport, writer: &mut dyn Write) -> std::io::Result<()> {
        for update in &report.updates {
            if self.color {
                writeln!(
                    writer,
                    "{}: {} {}",
                    update.path.bold(),
                    update.current.dimmed(),
                    format!("[latest {}]", update.latest).green()
                )?;
            } else {
                writeln!(
                    writer,
                    "{}: {} [latest {}]",
                    update.path, update.current, update.latest
                )?;
            }
        }

        if self.verbosity != Verbosity::Verbose {
            return Ok(());
        }

        for path in &report.skipped {
            if self.color {
                writeln!(writer, "{}", format!("{}: skipped (private)", path).dimmed())?;
            } else {
                writeln!(writer, "{}: skipped (private)", path)?;
            }
        }

        let summary = format!(
            "Checked {}: {}, {} failed",
            Self::plural(report.checked, "module"),
            Self::plural(report.updates.len(), "update"),
            report.failures.len()
        );
        if self.color {
            writeln!(writer, "{}", summary.dimmed())
        } else {
            writeln!(writer, "{}", summary)
        }
    }

    fn format_rewrite(
        &self,
        report: &RewriteReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            for change in &report.changes {
                if self.color {
                    writeln!(
                        writer,
                        "{}:{}:{} {}",
                        change.file.display(),
                        change.line,
                        change.column,
                        change.new.green()
                    )?;
                } else {
                    writeln!(writer, "{}", change)?;
                }
            }
        }

        if self.verbosity == Verbosity::Verbose {
            let summary = format!(
                "Rewrote {} in {} ({} scanned)",
                Self::plural(report.changes.len(), "import"),
                Self::plural(report.files_changed(), "file"),
                report.files_scanned
            );
            if self.color {
                writeln!(writer, "{}", summary.dimmed())?;
            } else {
                writeln!(writer, "{}", summary)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::AvailableUpdate;
    use crate::rewrite::ReferenceChange;
    use std::path::PathBuf;

    fn plain(verbosity: Verbosity) -> TextFormatter {
        TextFormatter::with_color(verbosity, false)
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample_report() -> ListReport {
        ListReport {
            updates: vec![
                AvailableUpdate {
                    path: "github.com/a/one".to_string(),
                    current: "v1.2.0".to_string(),
                    latest: "v3.0.1".to_string(),
                },
                AvailableUpdate {
                    path: "gopkg.in/yaml.v2".to_string(),
                    current: "v2.4.0".to_string(),
                    latest: "v3.0.1".to_string(),
                },
            ],
            failures: vec![LookupFailure {
                path: "github.com/c/broken".to_string(),
                message: "network error".to_string(),
            }],
            skipped: vec!["corp.example/private".to_string()],
            checked: 4,
        }
    }

    fn sample_rewrite() -> RewriteReport {
        RewriteReport {
            changes: vec![ReferenceChange {
                file: PathBuf::from("cmd/main.go"),
                line: 4,
                column: 2,
                old: "github.com/a/one".to_string(),
                new: "github.com/a/one/v3".to_string(),
            }],
            files_scanned: 7,
        }
    }

    #[test]
    fn test_list_lines() {
        let output = render(|w| plain(Verbosity::Normal).format_list(&sample_report(), w));
        assert_eq!(
            output,
            "github.com/a/one: v1.2.0 [latest v3.0.1]\ngopkg.in/yaml.v2: v2.4.0 [latest v3.0.1]\n"
        );
    }

    #[test]
    fn test_list_verbose_summary() {
        let output = render(|w| plain(Verbosity::Verbose).format_list(&sample_report(), w));
        assert!(output.contains("corp.example/private: skipped (private)"));
        assert!(output.contains("Checked 4 modules: 2 updates, 1 failed"));
    }

    #[test]
    fn test_list_empty() {
        let output = render(|w| plain(Verbosity::Normal).format_list(&ListReport::default(), w));
        assert!(output.is_empty());
    }

    #[test]
    fn test_failures() {
        let report = sample_report();
        let output = render(|w| plain(Verbosity::Normal).format_failures(&report.failures, w));
        assert_eq!(output, "github.com/c/broken: failed: network error\n");
    }

    #[test]
    fn test_rewrite_lines() {
        let output = render(|w| plain(Verbosity::Normal).format_rewrite(&sample_rewrite(), w));
        assert_eq!(output, "cmd/main.go:4:2 github.com/a/one/v3\n");
    }

    #[test]
    fn test_rewrite_quiet_and_verbose() {
        let quiet = render(|w| plain(Verbosity::Quiet).format_rewrite(&sample_rewrite(), w));
        assert!(quiet.is_empty());

        let verbose = render(|w| plain(Verbosity::Verbose).format_rewrite(&sample_rewrite(), w));
        assert!(verbose.contains("Rewrote 1 import in 1 file (7 scanned)"));
    }

    #[test]
    fn test_fetch_and_module_lines() {
        let formatter = plain(Verbosity::Normal);
        let output = render(|w| formatter.format_fetch("github.com/a/one/v3@v3.0.1", w));
        assert_eq!(output, "go get github.com/a/one/v3@v3.0.1\n");

        let output = render(|w| formatter.format_module("example.com/foo/v2", w));
        assert_eq!(output, "module example.com/foo/v2\n");
    }

    #[test]
    fn test_colored_output_keeps_text() {
        colored::control::set_override(true);
        let output = render(|w| TextFormatter::new(Verbosity::Normal).format_list(&sample_report(), w));
        colored::control::unset_override();
        assert!(output.contains("github.com/a/one"));
        assert!(output.contains("latest v3.0.1"));
    }
}
