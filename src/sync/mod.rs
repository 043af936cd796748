//! Sync orchestrator
//!
//! Brings a stack up to date with its remote: fast-forward trunk, delete
//! branches whose PRs were merged, restack what is left and return to the
//! starting branch.

use crate::context::{run_restoring, RepoContext};
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::progress::{Phase, ProgressCallback};
use crate::prompt::Prompter;
use crate::repo::Workspace;
use crate::types::{PrState, StackDocument};
use tracing::{info, warn};

/// Options for one `sync` invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Query and report only
    pub dry_run: bool,
    /// Do not run the stacking tool's restack
    pub skip_restack: bool,
    /// Delete merged branches without asking
    pub non_interactive: bool,
}

/// Outcome of `sync`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Branches whose PR was merged
    pub merged: Vec<String>,
    /// Merged branches that were deleted
    pub deleted: Vec<String>,
    /// Merged branches the user chose to keep
    pub kept: Vec<String>,
    /// Branches with an open or closed-unmerged PR
    pub unmerged: Vec<String>,
    /// Branches whose PR state could not be determined, with the reason
    pub unknown: Vec<(String, String)>,
    /// Whether the restack ran
    pub restacked: bool,
    /// Branch checked out at the end; `None` when nothing was checked out
    pub restored_to: Option<String>,
    /// Sync ran from trunk, so no stack was inspected and nothing was cleaned up
    pub started_on_trunk: bool,
}

/// Sync the stack containing the current branch
pub async fn sync_stack(
    workspace: &Workspace,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    prompter: &dyn Prompter,
    request: SyncRequest,
) -> Result<SyncReport> {
    let outcome = run_sync(workspace, platform, progress, prompter, request).await;
    match &outcome {
        Ok(_) => progress.on_phase(Phase::Done).await,
        Err(_) => progress.on_phase(Phase::Aborted).await,
    }
    outcome
}

async fn run_sync(
    workspace: &Workspace,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    prompter: &dyn Prompter,
    request: SyncRequest,
) -> Result<SyncReport> {
    let git = &workspace.git;

    progress.on_phase(Phase::Validating).await;
    if git.is_dirty().await? {
        return Err(Error::DirtyWorkingTree);
    }

    let trunk = workspace.tool.trunk().await?;
    let ctx = RepoContext::capture(git, trunk).await?;

    let doc = if ctx.started_on_trunk() {
        None
    } else {
        progress.on_phase(Phase::Parsing).await;
        Some(
            workspace
                .tool
                .read_stack(&ctx.original_branch, &ctx.trunk)
                .await?,
        )
    };

    if request.dry_run {
        progress
            .on_message("Dry run - no branches will be checked out, deleted or restacked")
            .await;
        let mut report = SyncReport {
            started_on_trunk: doc.is_none(),
            ..SyncReport::default()
        };
        if let Some(doc) = &doc {
            check_merged(doc, platform, progress, &mut report).await;
        }
        return Ok(report);
    }

    let op = sync_steps(workspace, &ctx, doc.as_ref(), platform, progress, prompter, request);
    let mut report = run_restoring(&ctx, git, op).await?;
    report.restored_to = git.current_branch().await.ok();
    Ok(report)
}

async fn sync_steps(
    workspace: &Workspace,
    ctx: &RepoContext,
    doc: Option<&StackDocument>,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    prompter: &dyn Prompter,
    request: SyncRequest,
) -> Result<SyncReport> {
    let git = &workspace.git;
    let mut report = SyncReport::default();

    progress.on_phase(Phase::UpdatingTrunk).await;
    git.checkout(&ctx.trunk).await?;
    git.pull_ff_only().await?;

    let Some(doc) = doc else {
        info!("sync started on trunk; merged branches were not checked");
        progress.on_message("On trunk; only trunk was updated").await;
        report.started_on_trunk = true;
        return Ok(report);
    };

    check_merged(doc, platform, progress, &mut report).await;

    if !report.merged.is_empty() {
        progress.on_phase(Phase::Deleting).await;
    }
    let non_interactive = request.non_interactive || workspace.settings.non_interactive;
    for branch in report.merged.clone() {
        let delete = non_interactive
            || prompter.confirm(&format!("Delete merged branch {branch}?"), true)?;
        if delete {
            workspace.tool.delete_branch(&branch).await?;
            info!("deleted {branch}");
            progress.on_message(&format!("Deleted {branch}")).await;
            report.deleted.push(branch);
        } else {
            report.kept.push(branch);
        }
    }

    if request.skip_restack || workspace.settings.skip_restack {
        progress.on_message("Skipping restack").await;
    } else if let Some(target) = restack_target(doc, &ctx.original_branch, &report.deleted) {
        progress.on_phase(Phase::Restacking).await;
        git.checkout(target).await?;
        workspace.tool.restack().await?;
        report.restacked = true;
    }

    progress.on_phase(Phase::Restoring).await;
    Ok(report)
}

/// Query each branch's PR state, one call per branch
///
/// Lookup failures and branches without PRs are recorded as unknown and
/// never offered for deletion.
async fn check_merged(
    doc: &StackDocument,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    report: &mut SyncReport,
) {
    progress.on_phase(Phase::CheckingMerged).await;

    for node in doc.branches() {
        match platform.pr_state(&node.name).await {
            Ok(Some(PrState::Merged)) => report.merged.push(node.name.clone()),
            Ok(Some(PrState::Open | PrState::Closed)) => report.unmerged.push(node.name.clone()),
            Ok(None) => report
                .unknown
                .push((node.name.clone(), "no pull request".to_string())),
            Err(e) => {
                warn!("cannot determine merged status of {}: {e}", node.name);
                progress.on_error(&e).await;
                report.unknown.push((node.name.clone(), e.to_string()));
            }
        }
    }
}

/// Branch to run the restack from: the starting branch if it survived,
/// otherwise the lowest surviving branch
fn restack_target<'a>(
    doc: &'a StackDocument,
    original: &str,
    deleted: &[String],
) -> Option<&'a str> {
    let survives = |name: &str| !deleted.iter().any(|d| d == name);
    doc.branches()
        .iter()
        .find(|n| n.name == original && survives(&n.name))
        .or_else(|| doc.branches().iter().find(|n| survives(&n.name)))
        .map(|n| n.name.as_str())
}
