//! Command workflows
//!
//! This module provides:
//! - get: resolve a major upgrade, fetch it and rewrite imports
//! - list: report available updates for direct dependencies
//! - path: change the module path of the current module and its imports

use crate::cli::{GetArgs, ListArgs, PathArgs};
use crate::config::{Config, ListConfig};
use crate::error::AppError;
use crate::go_tool::{GoTool, SystemGoTool};
use crate::manifest::{self, GoModFile};
use crate::output::{OutputFormatter, TextFormatter};
use crate::progress::ListProgress;
use crate::registry::{GoProxyRegistry, HttpClient, ModuleRegistry};
use crate::resolve::{
    resolve_get, resolve_list, resolve_path, GetPlan, ListOptions, ListReport, PathPlan,
    PathRequest,
};
use crate::rewrite::{rewrite_tree, RewriteReport};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the modmajor commands against a registry and a Go toolchain
pub struct Commands {
    /// Module version source
    registry: Arc<dyn ModuleRegistry>,
    /// Runner for `go get` and `go mod edit`
    go_tool: Arc<dyn GoTool>,
    /// Environment configuration
    config: Config,
    /// Lookup concurrency limits
    limits: ListConfig,
}

/// Whether a command modified the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Files were changed or the go command was run
    Changed,
    /// The project was left as it was
    NothingToDo,
}

impl CommandStatus {
    fn from_changed(changed: bool) -> Self {
        if changed {
            CommandStatus::Changed
        } else {
            CommandStatus::NothingToDo
        }
    }
}

/// Result of the get command
#[derive(Debug)]
pub struct GetOutcome {
    /// Resolved upgrade
    pub plan: GetPlan,
    /// Whether `go get` was run
    pub fetched: bool,
    /// Rewritten imports, when rewriting was requested
    pub rewrite: Option<RewriteReport>,
}

/// Result of the path command
#[derive(Debug)]
pub struct PathOutcome {
    /// Resolved module path change
    pub plan: PathPlan,
    /// Directory containing the go.mod
    pub module_root: PathBuf,
    /// Whether the module directive was edited
    pub edited: bool,
    /// Rewritten imports, when rewriting was requested
    pub rewrite: Option<RewriteReport>,
}

impl GetOutcome {
    /// Returns whether the project was modified
    pub fn status(&self) -> CommandStatus {
        let rewritten = self.rewrite.as_ref().is_some_and(|r| !r.is_empty());
        CommandStatus::from_changed(self.fetched || rewritten)
    }
}

impl PathOutcome {
    /// Returns whether the project was modified
    pub fn status(&self) -> CommandStatus {
        let rewritten = self.rewrite.as_ref().is_some_and(|r| !r.is_empty());
        CommandStatus::from_changed(self.edited || rewritten)
    }
}

impl Commands {
    /// Create commands talking to the configured module proxy and the `go` binary
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = HttpClient::new()?;
        let registry = GoProxyRegistry::new(client, &config.proxy_url);
        Ok(Self::with_parts(
            Arc::new(registry),
            Arc::new(SystemGoTool::new()),
            config,
        ))
    }

    /// Create commands with custom collaborators (for testing)
    pub fn with_parts(
        registry: Arc<dyn ModuleRegistry>,
        go_tool: Arc<dyn GoTool>,
        config: Config,
    ) -> Self {
        Self {
            registry,
            go_tool,
            config,
            limits: ListConfig::default(),
        }
    }

    /// Override the lookup concurrency limits
    pub fn with_limits(mut self, limits: ListConfig) -> Self {
        self.limits = limits;
        self
    }

    /// Upgrade a dependency to a major version
    ///
    /// Prints the fetch spec, runs `go get` with it and rewrites the
    /// imports below `args.dir`. Nothing is changed if resolution fails.
    pub async fn get(
        &self,
        args: &GetArgs,
        formatter: &TextFormatter,
        out: &mut dyn Write,
    ) -> Result<GetOutcome, AppError> {
        let plan = resolve_get(&*self.registry, &args.pathspec, args.pre, args.cached).await?;
        info!(
            module = %plan.module_path,
            version = %plan.resolved.version,
            "resolved upgrade"
        );
        formatter.format_fetch(&plan.fetch_spec, out)?;

        if args.run_get {
            self.go_tool.get(&args.dir, &plan.fetch_spec)?;
        }

        let rewrite = if args.rewrite {
            let mapper = |path: &str| plan.mapper.map(path);
            let report = rewrite_tree(&args.dir, &mapper)?;
            formatter.format_rewrite(&report, out)?;
            Some(report)
        } else {
            None
        };

        Ok(GetOutcome {
            plan,
            fetched: args.run_get,
            rewrite,
        })
    }

    /// Check the direct dependencies of the module in `args.dir` for updates
    ///
    /// Private modules are not looked up and are reported as skipped.
    pub async fn list(
        &self,
        args: &ListArgs,
        progress: &mut ListProgress,
    ) -> Result<ListReport, AppError> {
        progress.reading_requirements();
        let dependencies = match manifest::direct(&args.dir) {
            Ok(dependencies) => dependencies,
            Err(e) => {
                progress.finish();
                return Err(e.into());
            }
        };

        let (private, public): (Vec<_>, Vec<_>) = dependencies
            .into_iter()
            .partition(|dep| self.config.is_private(&dep.module_path()));
        debug!(
            public = public.len(),
            private = private.len(),
            "loaded direct dependencies"
        );

        let options = ListOptions::new(args.cached, &self.limits)
            .with_prerelease(args.pre)
            .with_major_only(args.major);

        progress.checking_modules(public.len());
        let mut report = resolve_list(self.registry.clone(), &public, &options, |path| {
            progress.module_checked(path)
        })
        .await;
        let reported = progress.finish();
        debug!(reported, checked = report.checked, "module lookups finished");

        report.skipped = private.iter().map(|dep| dep.module_path()).collect();
        Ok(report)
    }

    /// Change the module path of the module governing `args.dir`
    ///
    /// Edits the module directive and rewrites imports from the module
    /// root. With `--rewrite=false` only the new path is printed.
    pub fn path(
        &self,
        args: &PathArgs,
        formatter: &TextFormatter,
        out: &mut dyn Write,
    ) -> Result<PathOutcome, AppError> {
        let mod_file = manifest::find_mod_file(&args.dir)?;
        let go_mod = GoModFile::load(&mod_file)?;
        let current = go_mod.module_path(&mod_file)?;
        let module_root = mod_file
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let request =
            PathRequest::from_flags(args.modpath.clone(), args.version.clone(), args.next)?;
        let plan = resolve_path(current, &request)?;
        formatter.format_module(&plan.new_module_path, out)?;

        if !args.rewrite {
            return Ok(PathOutcome {
                plan,
                module_root,
                edited: false,
                rewrite: None,
            });
        }

        let edited = !plan.is_noop();
        if edited {
            self.go_tool
                .edit_module(&module_root, &plan.new_module_path)?;
        }

        let mapper = |path: &str| plan.mapper.map(path);
        let report = rewrite_tree(&module_root, &mapper)?;
        formatter.format_rewrite(&report, out)?;

        Ok(PathOutcome {
            plan,
            module_root,
            edited,
            rewrite: Some(report),
        })
    }
}
