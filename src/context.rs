//! Execution context and the restore-on-exit path
//!
//! Sync checks out other branches while it works. Whatever happens (success,
//! failure, Ctrl-C) the user ends up back where they started, or on trunk if
//! the starting branch was deleted.

use crate::error::{Error, Result};
use crate::repo::Git;
use std::future::Future;
use tracing::{debug, warn};

/// Where an invocation started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    /// Branch checked out when the command started
    pub original_branch: String,
    /// Trunk branch
    pub trunk: String,
}

impl RepoContext {
    /// Record the starting branch
    pub async fn capture(git: &Git, trunk: impl Into<String>) -> Result<Self> {
        Ok(Self {
            original_branch: git.current_branch().await?,
            trunk: trunk.into(),
        })
    }

    /// Whether the command started on trunk
    pub fn started_on_trunk(&self) -> bool {
        self.original_branch == self.trunk
    }

    /// Check out the starting branch, or trunk if it no longer exists
    ///
    /// Returns the branch left checked out.
    pub async fn restore(&self, git: &Git) -> Result<String> {
        let target = if git.branch_exists(&self.original_branch).await? {
            &self.original_branch
        } else {
            &self.trunk
        };

        let current = git.current_branch().await.ok();
        if current.as_deref() != Some(target.as_str()) {
            git.checkout(target).await?;
        }
        debug!("restored to {target}");
        Ok(target.clone())
    }
}

/// Run `op`, then restore the starting branch no matter how `op` ended
///
/// Ctrl-C cancels `op` and yields [`Error::Interrupted`] after restoring.
/// A restore failure is only surfaced when `op` itself succeeded.
pub async fn run_restoring<T, F>(ctx: &RepoContext, git: &Git, op: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let ctrl_c = async {
        // Without a signal handler there is nothing to wait for
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    run_restoring_until(ctx, git, op, ctrl_c).await
}

/// [`run_restoring`] with an arbitrary interrupt in place of Ctrl-C
///
/// `op` is dropped as soon as `interrupt` completes.
pub async fn run_restoring_until<T, F, I>(
    ctx: &RepoContext,
    git: &Git,
    op: F,
    interrupt: I,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
    I: Future<Output = ()>,
{
    let result = tokio::select! {
        r = op => r,
        () = interrupt => {
            warn!("interrupted, restoring '{}'", ctx.original_branch);
            Err(Error::Interrupted)
        }
    };

    if let Err(e) = ctx.restore(git).await {
        warn!("could not restore '{}': {e}", ctx.original_branch);
        if result.is_ok() {
            return Err(e);
        }
    }
    result
}
