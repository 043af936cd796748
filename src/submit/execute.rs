//! Submission execution
//!
//! Walks the plan branch by branch (push, then create or retarget the PR)
//! and stops at the first failure. Navigation comments are written
//! afterwards, once every branch has its PR number.

use crate::comment::{sync_navigation_comment, CommentDecision};
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::progress::{Phase, ProgressCallback, PushStatus};
use crate::repo::Git;
use crate::submit::{BranchStep, PrAction, SubmissionPlan};
use crate::types::{PrUpdate, PullRequest, StackDocument};
use std::collections::HashMap;
use tracing::{info, warn};

/// Navigation comment result for one PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOutcome {
    /// Branch the PR belongs to
    pub branch: String,
    /// PR number
    pub pr_number: u64,
    /// What was done to its comment
    pub decision: CommentDecision,
}

/// Result of submission execution
///
/// Lists everything that was committed before a failure, so a partial run
/// can be reported accurately.
#[derive(Debug, Default)]
pub struct SubmissionResult {
    /// Branches that were pushed
    pub pushed_branches: Vec<String>,
    /// PRs that were created
    pub created_prs: Vec<PullRequest>,
    /// PRs that were updated (base changed)
    pub updated_prs: Vec<PullRequest>,
    /// PR of every submitted branch, by branch name
    pub prs: HashMap<String, PullRequest>,
    /// Navigation comment outcomes
    pub comments: Vec<CommentOutcome>,
    /// Non-fatal problems (comment writes)
    pub warnings: Vec<String>,
    /// Error that stopped execution
    pub failure: Option<Error>,
}

impl SubmissionResult {
    /// Whether every step succeeded
    pub const fn success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Execute a submission plan
///
/// Never returns `Err` for a failed step; the failure is recorded in the
/// result next to the steps that did complete.
pub async fn execute_submission(
    plan: &SubmissionPlan,
    git: &Git,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
) -> SubmissionResult {
    let mut result = SubmissionResult::default();

    for step in &plan.steps {
        if let Err(e) = execute_step(step, git, platform, progress, &mut result).await {
            progress.on_error(&e).await;
            result.failure = Some(e);
            return result;
        }
    }

    result
}

async fn execute_step(
    step: &BranchStep,
    git: &Git,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    result: &mut SubmissionResult,
) -> Result<()> {
    progress.on_phase(Phase::Pushing).await;
    progress
        .on_branch_push(&step.branch, PushStatus::Started)
        .await;
    if let Err(e) = git.force_push(&step.branch).await {
        progress
            .on_branch_push(&step.branch, PushStatus::Failed(e.to_string()))
            .await;
        return Err(e);
    }
    progress
        .on_branch_push(&step.branch, PushStatus::Success)
        .await;
    result.pushed_branches.push(step.branch.clone());

    let pr = match &step.action {
        PrAction::Create(new_pr) => {
            progress.on_phase(Phase::CreatingOrUpdatingPr).await;
            let pr = platform.create_pr(new_pr).await?;
            info!("created PR #{} for {}", pr.number, step.branch);
            progress.on_pr_created(&step.branch, &pr).await;
            result.created_prs.push(pr.clone());
            pr
        }
        PrAction::Update { pr, update } => {
            progress.on_phase(Phase::CreatingOrUpdatingPr).await;
            progress
                .on_message(&format!(
                    "Updating {}: {}",
                    step.branch,
                    describe_update(pr, update)
                ))
                .await;
            let pr = platform.update_pr(pr.number, update).await?;
            info!("updated PR #{} for {}", pr.number, step.branch);
            progress.on_pr_updated(&step.branch, &pr).await;
            result.updated_prs.push(pr.clone());
            pr
        }
        PrAction::Unchanged(pr) => pr.clone(),
    };
    result.prs.insert(step.branch.clone(), pr);
    Ok(())
}

/// Reconcile the navigation comment of every PR in the stack
///
/// Every branch with a PR number gets a comment, submitted or not, because
/// each comment shows the whole stack. Failures become warnings.
pub async fn update_stack_comments(
    doc: &StackDocument,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    result: &mut SubmissionResult,
) {
    progress.on_phase(Phase::Commenting).await;

    for node in doc.branches() {
        let Some(pr_number) = node.pr_number else {
            continue;
        };

        match sync_navigation_comment(platform, pr_number, doc, &node.name, false).await {
            Ok(decision) => {
                progress.on_comment(&node.name, pr_number, decision).await;
                result.comments.push(CommentOutcome {
                    branch: node.name.clone(),
                    pr_number,
                    decision,
                });
            }
            Err(e) => {
                let msg = format!("failed to update stack comment on #{pr_number}: {e}");
                warn!("{msg}");
                progress.on_error(&e).await;
                result.warnings.push(msg);
            }
        }
    }
}

/// Report what would be done in a dry run
pub async fn report_dry_run(plan: &SubmissionPlan, progress: &dyn ProgressCallback) {
    progress.on_message("Dry run - no changes will be made").await;

    if plan.steps.is_empty() {
        progress.on_message("Nothing to submit").await;
        return;
    }

    progress
        .on_message(&format!("Would push to {}:", plan.remote))
        .await;
    for step in &plan.steps {
        progress.on_message(&format!("  - {}", step.branch)).await;
    }

    let creates: Vec<_> = plan.creates().collect();
    if !creates.is_empty() {
        progress.on_message("Would create PRs:").await;
        for step in creates {
            if let PrAction::Create(pr) = &step.action {
                progress
                    .on_message(&format!("  - {} → {} ({})", pr.head, pr.base, pr.title))
                    .await;
            }
        }
    }

    let updates: Vec<_> = plan.updates().collect();
    if !updates.is_empty() {
        progress.on_message("Would update PRs:").await;
        for step in updates {
            if let PrAction::Update { pr, update } = &step.action {
                progress
                    .on_message(&format!(
                        "  - {} (PR #{}) {}",
                        step.branch,
                        pr.number,
                        describe_update(pr, update)
                    ))
                    .await;
            }
        }
    }
}

fn describe_update(pr: &PullRequest, update: &PrUpdate) -> String {
    let mut parts = Vec::new();
    if let Some(base) = &update.base {
        parts.push(format!("base {} → {base}", pr.base_ref));
    }
    if let Some(title) = &update.title {
        parts.push(format!("title \"{title}\""));
    }
    parts.join(", ")
}
