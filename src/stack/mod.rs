//! Topology reader
//!
//! Talks to the underlying stacking tool and turns its listing into a
//! [`StackDocument`].

mod listing;

pub use listing::{parse_listing, strip_banners, NEEDS_RESTACK};

use crate::error::{Error, Result};
use crate::exec::{run_checked, CommandRunner};
use crate::types::StackDocument;
use std::sync::Arc;
use tracing::debug;

/// Fixed flag set for listing the current stack, trunk first
pub const LIST_STACK_ARGS: &[&str] = &["ls", "--stack", "--reverse"];

/// Where the stacking tool records per-branch tracking metadata
pub const BRANCH_METADATA_REF_PREFIX: &str = "refs/branch-metadata/";

/// Wrapper around the stacking tool executable
#[derive(Clone)]
pub struct StackTool {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl StackTool {
    /// Create a wrapper invoking `program`
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Executable name or path
    pub fn program(&self) -> &str {
        &self.program
    }

    async fn tool(&self, args: &[&str]) -> Result<String> {
        let out = run_checked(self.runner.as_ref(), &self.program, args).await?;
        Ok(strip_banners(&out))
    }

    /// Trunk branch name
    pub async fn trunk(&self) -> Result<String> {
        let out = self.tool(&["trunk"]).await?;
        out.lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| Error::ListingParse("trunk command printed nothing".to_string()))
    }

    /// Whether the tool tracks `branch`
    ///
    /// Answered from the tool's metadata refs rather than by asking the tool,
    /// which fails without structured output on untracked branches.
    pub async fn is_tracked(&self, branch: &str, trunk: &str) -> Result<bool> {
        if branch == trunk {
            return Ok(true);
        }
        let reference = format!("{BRANCH_METADATA_REF_PREFIX}{branch}");
        let output = self
            .runner
            .run("git", &["show-ref", "--verify", "--quiet", &reference])
            .await?;
        Ok(output.success())
    }

    /// Read the stack containing `current`
    ///
    /// Fails with [`Error::UntrackedBranch`] before listing anything when the
    /// branch is not tracked.
    pub async fn read_stack(&self, current: &str, trunk: &str) -> Result<StackDocument> {
        if !self.is_tracked(current, trunk).await? {
            return Err(Error::UntrackedBranch(current.to_string()));
        }

        let out = run_checked(self.runner.as_ref(), &self.program, LIST_STACK_ARGS).await?;
        let doc = parse_listing(&out, trunk)?;
        debug!(
            "read stack: {}",
            doc.nodes()
                .iter()
                .map(|n| n.name.as_str())
                .collect::<Vec<_>>()
                .join(" <- ")
        );

        if !doc.contains(current) {
            return Err(Error::BranchNotInStack(current.to_string()));
        }
        Ok(doc.with_current(current))
    }

    /// Rebase every branch of the current stack onto its parent
    pub async fn restack(&self) -> Result<String> {
        self.tool(&["restack"]).await
    }

    /// Delete a branch, letting the tool re-parent its children
    pub async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.tool(&["delete", branch, "--force"]).await.map(|_| ())
    }

    /// Version string reported by the tool
    pub async fn version(&self) -> Result<String> {
        self.tool(&["--version"]).await
    }

    /// The tool's own help text
    pub async fn help(&self) -> Result<String> {
        self.tool(&["--help"]).await
    }
}
