//! Repository access
//!
//! [`Git`] wraps the handful of git plumbing and porcelain commands the
//! orchestrators need. [`Workspace`] bundles it with the stacking tool.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::exec::{run_checked, CommandRunner};
use crate::stack::StackTool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Candidate locations of a PR description template, relative to the repo root
const PR_TEMPLATE_PATHS: &[&str] = &[
    ".github/pull_request_template.md",
    ".github/PULL_REQUEST_TEMPLATE.md",
];

/// Git command wrapper
#[derive(Clone)]
pub struct Git {
    runner: Arc<dyn CommandRunner>,
    remote: String,
}

impl Git {
    /// Create a wrapper pushing to `remote`
    pub fn new(runner: Arc<dyn CommandRunner>, remote: impl Into<String>) -> Self {
        Self {
            runner,
            remote: remote.into(),
        }
    }

    /// Remote name used for pushes
    pub fn remote(&self) -> &str {
        &self.remote
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        run_checked(self.runner.as_ref(), "git", args).await
    }

    /// Currently checked out branch
    pub async fn current_branch(&self) -> Result<String> {
        let branch = self.git(&["branch", "--show-current"]).await?;
        if branch.is_empty() {
            return Err(Error::Command {
                command: "git branch --show-current".to_string(),
                diagnostic: "HEAD is detached".to_string(),
            });
        }
        Ok(branch)
    }

    /// Whether the working tree has uncommitted changes
    pub async fn is_dirty(&self) -> Result<bool> {
        Ok(!self.git(&["status", "--porcelain"]).await?.is_empty())
    }

    /// Check out a branch
    pub async fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", branch]).await.map(|_| ())
    }

    /// Fast-forward the current branch from its upstream
    pub async fn pull_ff_only(&self) -> Result<()> {
        self.git(&["pull", "--ff-only"]).await.map(|_| ())
    }

    /// Whether a fully-qualified ref exists
    pub async fn ref_exists(&self, reference: &str) -> Result<bool> {
        let output = self
            .runner
            .run("git", &["show-ref", "--verify", "--quiet", reference])
            .await?;
        Ok(output.success())
    }

    /// Whether a local branch exists
    pub async fn branch_exists(&self, branch: &str) -> Result<bool> {
        self.ref_exists(&format!("refs/heads/{branch}")).await
    }

    /// Force-push a branch, refusing to clobber unseen remote work
    pub async fn force_push(&self, branch: &str) -> Result<()> {
        let output = self
            .runner
            .run("git", &["push", "--force-with-lease", &self.remote, branch])
            .await?;
        if output.success() {
            Ok(())
        } else {
            Err(Error::PushFailed {
                branch: branch.to_string(),
                diagnostic: output.diagnostic(),
            })
        }
    }

    /// URL of the configured remote
    pub async fn remote_url(&self) -> Result<String> {
        self.git(&["remote", "get-url", &self.remote]).await
    }

    /// Subject line of the newest commit on a branch
    pub async fn commit_subject(&self, branch: &str) -> Result<String> {
        self.git(&["log", "-1", "--pretty=%s", branch]).await
    }

    /// Top-level directory of the working tree
    pub async fn repo_root(&self) -> Result<PathBuf> {
        self.git(&["rev-parse", "--show-toplevel"])
            .await
            .map(PathBuf::from)
    }

    /// Contents of the repository's PR template, if it has one
    pub async fn pr_template(&self) -> Result<Option<String>> {
        let root = self.repo_root().await?;
        for candidate in PR_TEMPLATE_PATHS {
            let path = root.join(candidate);
            if path.is_file() {
                debug!("using PR template {}", path.display());
                return Ok(Some(tokio::fs::read_to_string(&path).await?));
            }
        }
        Ok(None)
    }

    /// Whether `name` is a configured git alias
    pub async fn is_alias(&self, name: &str) -> Result<bool> {
        let key = format!("alias.{name}");
        let output = self.runner.run("git", &["config", "--get", &key]).await?;
        Ok(output.success())
    }
}

/// Git plus the stacking tool, sharing one runner
#[derive(Clone)]
pub struct Workspace {
    /// Git wrapper
    pub git: Git,
    /// Stacking tool wrapper
    pub tool: StackTool,
    /// Settings the workspace was built from
    pub settings: Settings,
}

impl Workspace {
    /// Build a workspace from settings
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Settings) -> Self {
        Self {
            git: Git::new(Arc::clone(&runner), settings.remote.clone()),
            tool: StackTool::new(runner, settings.tool.clone()),
            settings,
        }
    }

    /// Default PR title for a branch: its latest commit subject, truncated
    pub async fn default_title(&self, branch: &str) -> Result<String> {
        let subject = self.git.commit_subject(branch).await?;
        Ok(truncate_title(&subject, self.settings.title_max_len))
    }
}

/// Truncate to `max` characters (char-safe), marking the cut with `...`
pub fn truncate_title(title: &str, max: usize) -> String {
    let title = title.trim();
    if title.chars().count() <= max {
        return title.to_string();
    }
    let keep = max.saturating_sub(3);
    format!("{}...", title.chars().take(keep).collect::<String>())
}
