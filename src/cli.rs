//! CLI argument parsing module for modmajor

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Major version upgrade tool for Go modules
#[derive(Parser, Debug, Clone)]
#[command(name = "modmajor", version, about = "Major version upgrades for Go modules")]
pub struct CliArgs {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Upgrade a dependency to a major version
    Get(GetArgs),
    /// List available updates for direct dependencies
    List(ListArgs),
    /// Modify the module path of the current module
    Path(PathArgs),
}

/// Arguments of the `get` subcommand
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// Package to upgrade, optionally with a version query (path@version|latest|master)
    pub pathspec: String,

    /// Allow pre-release versions
    #[arg(long)]
    pub pre: bool,

    /// Rewrite import paths (--rewrite=false to disable)
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub rewrite: bool,

    /// Run go get (--get=false to disable)
    #[arg(
        long = "get",
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub run_get: bool,

    /// Working directory
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Only fetch cached content from the module proxy (--cached=false to disable)
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub cached: bool,
}

/// Arguments of the `list` subcommand
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Allow pre-release versions
    #[arg(long)]
    pub pre: bool,

    /// Working directory
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Only fetch cached content from the module proxy (--cached=false to disable)
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub cached: bool,

    /// Only show newer major versions
    #[arg(long)]
    pub major: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments of the `path` subcommand
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// New module path (default: the current module path)
    pub modpath: Option<String>,

    /// Increment the module path version
    #[arg(long)]
    pub next: bool,

    /// Set the module path version
    #[arg(long)]
    pub version: Option<String>,

    /// Update go.mod and rewrite import paths (--rewrite=false to only print)
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub rewrite: bool,

    /// Working directory
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}
