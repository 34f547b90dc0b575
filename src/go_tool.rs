//! Go toolchain integration
//!
//! This module provides:
//! - `go get <spec>` to fetch a resolved module version
//! - `go mod edit -module <path>` to rename the current module

use crate::error::GoToolError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Trait for running go commands that modify a module
pub trait GoTool: Send + Sync {
    /// Adds or upgrades a dependency of the module in `dir`
    fn get(&self, dir: &Path, spec: &str) -> Result<(), GoToolError>;

    /// Sets the module path in the go.mod of `dir`
    fn edit_module(&self, dir: &Path, module_path: &str) -> Result<(), GoToolError>;
}

/// Runs the `go` binary found on PATH
///
/// Output of the command is passed through to the terminal.
#[derive(Debug, Clone)]
pub struct SystemGoTool {
    program: String,
}

impl SystemGoTool {
    /// Create a runner for the `go` binary
    pub fn new() -> Self {
        Self::with_program("go")
    }

    /// Create a runner for another executable with the same interface
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run a command and fail on a non-zero exit status
    fn run(&self, args: &[&str], working_dir: &Path) -> Result<(), GoToolError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(%command, dir = %working_dir.display(), "running go command");

        let status = Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .status()
            .map_err(|e| GoToolError::Spawn {
                command: command.clone(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(GoToolError::Failed {
                command,
                status: status.to_string(),
            })
        }
    }
}

impl Default for SystemGoTool {
    fn default() -> Self {
        Self::new()
    }
}

impl GoTool for SystemGoTool {
    fn get(&self, dir: &Path, spec: &str) -> Result<(), GoToolError> {
        self.run(&["get", spec], dir)
    }

    fn edit_module(&self, dir: &Path, module_path: &str) -> Result<(), GoToolError> {
        self.run(&["mod", "edit", "-module", module_path], dir)
    }
}
