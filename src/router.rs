//! Command router
//!
//! `sync` and `submit` are owned here and parsed strictly; everything else
//! belongs to the stacking tool (or a git alias) and is forwarded verbatim.

use crate::error::{Error, Result};
use crate::exec::CommandRunner;
use crate::repo::Git;
use crate::submit::SubmitRequest;
use crate::sync::SyncRequest;
use crate::types::SubmitMode;
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use std::ffi::OsString;
use tracing::debug;

/// Wrapper usage printed above the stacking tool's own help
pub const USAGE: &str = "\
Usage: gts <command> [args...]

Commands handled by gts:
  sync      Pull trunk, delete merged branches and restack
              -d, --dry-run                 Show what would happen
              --skip-restack, --sr          Do not restack afterwards
              -y, --non-interactive, --yes  Delete merged branches without asking
  submit    Push the stack and create or update its PRs
              -s, --single, --si            Only the current branch
              -u, --upstack, --up           Current branch and everything above it
              --downstack, --dn             Current branch and everything below it
              -w, --whole-stack             Every branch in the stack
              -d, --dry-run                 Show what would happen

Any other command is passed to the stacking tool (or git, for git aliases).
";

/// Arguments of `gts sync`
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "gts sync", no_binary_name = true, disable_version_flag = true)]
pub struct SyncArgs {
    /// Show what would happen without changing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Do not restack after deleting merged branches
    #[arg(long, visible_alias = "sr")]
    pub skip_restack: bool,

    /// Delete merged branches without asking
    #[arg(short = 'y', long, visible_alias = "yes")]
    pub non_interactive: bool,
}

impl From<SyncArgs> for SyncRequest {
    fn from(args: SyncArgs) -> Self {
        Self {
            dry_run: args.dry_run,
            skip_restack: args.skip_restack,
            non_interactive: args.non_interactive,
        }
    }
}

/// Arguments of `gts submit`
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "gts submit", no_binary_name = true, disable_version_flag = true)]
#[command(group(ArgGroup::new("mode").args(["single", "upstack", "downstack", "whole_stack"])))]
pub struct SubmitArgs {
    /// Submit only the current branch
    #[arg(short = 's', long, visible_alias = "si")]
    pub single: bool,

    /// Submit the current branch and everything above it
    #[arg(short = 'u', long, visible_alias = "up")]
    pub upstack: bool,

    /// Submit the current branch and everything below it
    #[arg(long, visible_alias = "dn")]
    pub downstack: bool,

    /// Submit every branch in the stack
    #[arg(short = 'w', long)]
    pub whole_stack: bool,

    /// Show what would happen without changing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

impl SubmitArgs {
    /// Mode selected by flags, if any
    pub const fn mode(&self) -> Option<SubmitMode> {
        if self.single {
            Some(SubmitMode::Single)
        } else if self.upstack {
            Some(SubmitMode::Upstack)
        } else if self.downstack {
            Some(SubmitMode::Downstack)
        } else if self.whole_stack {
            Some(SubmitMode::WholeStack)
        } else {
            None
        }
    }
}

impl From<SubmitArgs> for SubmitRequest {
    fn from(args: SubmitArgs) -> Self {
        Self {
            mode: args.mode(),
            dry_run: args.dry_run,
        }
    }
}

/// What a command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `gts sync ...`
    Sync(SyncRequest),
    /// `gts submit ...`
    Submit(SubmitRequest),
    /// `gts`, `gts -h`, `gts --help`
    Usage,
    /// `gts --version`, `gts -v`, `gts version`
    Version,
    /// `--help` on an owned command; holds the rendered help
    CommandHelp(String),
    /// Anything else, forwarded verbatim
    PassThrough(Vec<OsString>),
}

/// Classify a command line (without the binary name)
///
/// Unknown or conflicting flags on `sync`/`submit` fail with
/// [`Error::Argument`] before anything runs. A first argument that is not
/// valid UTF-8 can only belong to the stacking tool.
pub fn route(args: &[OsString]) -> Result<Invocation> {
    let Some(command) = args.first() else {
        return Ok(Invocation::Usage);
    };
    let Some(command) = command.to_str() else {
        return Ok(Invocation::PassThrough(args.to_vec()));
    };
    let rest = &args[1..];

    match command {
        "-h" | "--help" if rest.is_empty() => Ok(Invocation::Usage),
        "-v" | "--version" | "version" if rest.is_empty() => Ok(Invocation::Version),
        "sync" => Ok(match parse_owned::<SyncArgs>(rest)? {
            Parsed::Args(a) => Invocation::Sync(a.into()),
            Parsed::Help(help) => Invocation::CommandHelp(help),
        }),
        "submit" => Ok(match parse_owned::<SubmitArgs>(rest)? {
            Parsed::Args(a) => Invocation::Submit(a.into()),
            Parsed::Help(help) => Invocation::CommandHelp(help),
        }),
        _ => Ok(Invocation::PassThrough(args.to_vec())),
    }
}

enum Parsed<T> {
    Args(T),
    Help(String),
}

fn parse_owned<T: Parser>(args: &[OsString]) -> Result<Parsed<T>> {
    match T::try_parse_from(args) {
        Ok(parsed) => Ok(Parsed::Args(parsed)),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => Ok(Parsed::Help(e.render().to_string())),
        Err(e) => Err(Error::Argument(e.render().to_string().trim_end().to_string())),
    }
}

/// Forward a command line to git (for git aliases) or the stacking tool
///
/// Stdio is inherited; the child's exit code is returned.
pub async fn pass_through(
    runner: &dyn CommandRunner,
    git: &Git,
    tool: &str,
    args: &[OsString],
) -> Result<i32> {
    let program = match args.first().and_then(|a| a.to_str()) {
        Some(first) if git.is_alias(first).await? => "git",
        _ => tool,
    };
    debug!("passing through to {program}");
    runner.run_inherited(program, args).await
}
