//! JSON output formatter for machine processing

use crate::output::{OutputFormatter, Verbosity};
use crate::resolve::ListReport;
use crate::rewrite::RewriteReport;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of a rewrite
#[derive(Serialize)]
struct JsonRewrite<'a> {
    files_scanned: usize,
    files_changed: usize,
    changes: Vec<JsonChange<'a>>,
}

#[derive(Serialize)]
struct JsonChange<'a> {
    file: String,
    line: usize,
    column: usize,
    from: &'a str,
    to: &'a str,
}

impl JsonFormatter {
    fn write_json<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = if self.verbosity == Verbosity::Quiet {
            serde_json::to_string(value)
        } else {
            serde_json::to_string_pretty(value)
        }
        .map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, report: &ListReport, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write_json(report, writer)
    }

    fn format_rewrite(
        &self,
        report: &RewriteReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = JsonRewrite {
            files_scanned: report.files_scanned,
            files_changed: report.files_changed(),
            changes: report
                .changes
                .iter()
                .map(|c| JsonChange {
                    file: c.file.display().to_string(),
                    line: c.line,
                    column: c.column,
                    from: &c.old,
                    to: &c.new,
                })
                .collect(),
        };
        self.write_json(&output, writer)
    }
}
