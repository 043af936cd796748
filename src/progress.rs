//! Progress callback trait for interface-agnostic updates
//!
//! Submit and sync report what they are doing through [`ProgressCallback`];
//! the binary renders it to the terminal, tests record or ignore it.

use crate::comment::CommentDecision;
use crate::error::Error;
use crate::types::PullRequest;
use async_trait::async_trait;
use std::fmt;

/// Orchestration phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading the stack from the stacking tool
    Parsing,
    /// Checking restack, tracking and PR preconditions
    Validating,
    /// Pushing branches to the remote
    Pushing,
    /// Creating PRs or retargeting their bases
    CreatingOrUpdatingPr,
    /// Writing navigation comments
    Commenting,
    /// Checking out and pulling trunk
    UpdatingTrunk,
    /// Asking the host which branches were merged
    CheckingMerged,
    /// Deleting merged branches
    Deleting,
    /// Rebasing the surviving stack
    Restacking,
    /// Returning to the starting branch
    Restoring,
    /// Finished successfully
    Done,
    /// Stopped on an error
    Aborted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parsing => "Reading stack",
            Self::Validating => "Validating",
            Self::Pushing => "Pushing branches",
            Self::CreatingOrUpdatingPr => "Creating and updating PRs",
            Self::Commenting => "Updating stack comments",
            Self::UpdatingTrunk => "Updating trunk",
            Self::CheckingMerged => "Checking for merged PRs",
            Self::Deleting => "Deleting merged branches",
            Self::Restacking => "Restacking",
            Self::Restoring => "Restoring branch",
            Self::Done => "Done",
            Self::Aborted => "Aborted",
        };
        f.write_str(s)
    }
}

/// Push operation status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    /// Push started
    Started,
    /// Push succeeded
    Success,
    /// Push failed with error message
    Failed(String),
}

/// Progress callback trait
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called when a branch is being pushed
    async fn on_branch_push(&self, branch: &str, status: PushStatus);

    /// Called when a PR is created
    async fn on_pr_created(&self, branch: &str, pr: &PullRequest);

    /// Called when a PR's base is updated
    async fn on_pr_updated(&self, branch: &str, pr: &PullRequest);

    /// Called after a navigation comment was reconciled
    async fn on_comment(&self, branch: &str, pr_number: u64, decision: CommentDecision);

    /// Called when an error occurs (non-fatal)
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_branch_push(&self, _branch: &str, _status: PushStatus) {}
    async fn on_pr_created(&self, _branch: &str, _pr: &PullRequest) {}
    async fn on_pr_updated(&self, _branch: &str, _pr: &PullRequest) {}
    async fn on_comment(&self, _branch: &str, _pr_number: u64, _decision: CommentDecision) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
