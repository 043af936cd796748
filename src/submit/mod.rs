//! Submission orchestrator
//!
//! `submit` pushes the branches of a stack, opens or retargets their PRs and
//! keeps every PR's navigation comment current:
//! 1. Parsing - read the stack from the stacking tool
//! 2. Validating - tracking, restack and downstack-PR gates
//! 3. Planning and execution - per branch, push then create or update the PR
//! 4. Commenting - re-render the stack onto every PR

mod execute;
mod plan;

pub use execute::{
    execute_submission, report_dry_run, update_stack_comments, CommentOutcome, SubmissionResult,
};
pub use plan::{
    create_submission_plan, missing_downstack_prs, BranchStep, PlanOptions, PrAction,
    SubmissionPlan,
};

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::progress::{Phase, ProgressCallback};
use crate::prompt::Prompter;
use crate::repo::Workspace;
use crate::types::{StackDocument, SubmitMode};
use std::collections::HashMap;
use tracing::{debug, info};

/// Options for one `submit` invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Explicit mode; `None` lets the stack shape or the user decide
    pub mode: Option<SubmitMode>,
    /// Report the plan without writing anything
    pub dry_run: bool,
}

/// Outcome of `submit`
#[derive(Debug)]
pub struct SubmitReport {
    /// Mode that was used
    pub mode: SubmitMode,
    /// Plan that was executed (or reported, for dry runs)
    pub plan: SubmissionPlan,
    /// Execution result; empty for dry runs
    pub result: SubmissionResult,
    /// Stack as rendered into the comments
    pub document: StackDocument,
}

/// Submit the stack containing the current branch
///
/// Gate failures are returned as errors before anything is pushed. Failures
/// during execution are recorded in [`SubmitReport::result`].
pub async fn submit_stack(
    workspace: &Workspace,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    prompter: &dyn Prompter,
    request: SubmitRequest,
) -> Result<SubmitReport> {
    let outcome = run_submit(workspace, platform, progress, prompter, request).await;
    match &outcome {
        Ok(report) if report.result.success() => progress.on_phase(Phase::Done).await,
        _ => progress.on_phase(Phase::Aborted).await,
    }
    outcome
}

async fn run_submit(
    workspace: &Workspace,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    prompter: &dyn Prompter,
    request: SubmitRequest,
) -> Result<SubmitReport> {
    progress.on_phase(Phase::Parsing).await;

    let current = workspace.git.current_branch().await?;
    let trunk = workspace.tool.trunk().await?;
    if current == trunk {
        return Err(Error::OnTrunk(trunk));
    }

    let mut doc = workspace.tool.read_stack(&current, &trunk).await?;

    let mode = match request.mode {
        Some(mode) => mode,
        None if doc.branches().len() == 1 => SubmitMode::Single,
        None => prompter.select_mode()?,
    };
    info!("submitting {current} in {mode} mode");

    progress.on_phase(Phase::Validating).await;

    // The comment references every branch, so the whole stack is gated
    if let Some(node) = doc.first_needing_restack() {
        return Err(Error::RestackRequired {
            branch: node.name.clone(),
        });
    }

    let mut existing_prs = HashMap::new();
    let names: Vec<String> = doc.branches().iter().map(|n| n.name.clone()).collect();
    for name in &names {
        if let Some(pr) = platform.find_existing_pr(name).await? {
            doc.set_pr(name, pr.number, &pr.title)?;
            existing_prs.insert(name.clone(), pr);
        }
    }
    debug!("{} of {} branches have PRs", existing_prs.len(), names.len());

    let missing = missing_downstack_prs(&doc, mode, &current, &existing_prs);
    if !missing.is_empty() {
        return Err(Error::MissingDownstackPrs(missing));
    }

    // Branches with PRs get a generated title only when retitling is on
    let retitle = workspace.settings.update_titles;
    let in_scope: Vec<String> = doc
        .scope(mode, &current)?
        .into_iter()
        .filter(|n| retitle || n.pr_number.is_none())
        .map(|n| n.name.clone())
        .collect();
    for name in &in_scope {
        let title = workspace.default_title(name).await?;
        doc.set_title(name, &title);
    }

    let options = PlanOptions {
        remote: workspace.git.remote().to_string(),
        body: workspace.git.pr_template().await?.unwrap_or_default(),
        draft: workspace.settings.draft,
    };
    let plan = create_submission_plan(&doc, mode, &current, &existing_prs, &options)?;

    if request.dry_run {
        report_dry_run(&plan, progress).await;
        return Ok(SubmitReport {
            mode,
            plan,
            result: SubmissionResult::default(),
            document: doc,
        });
    }

    let mut result = execute_submission(&plan, &workspace.git, platform, progress).await;

    if result.success() {
        for (branch, pr) in &result.prs {
            doc.set_pr(branch, pr.number, &pr.title)?;
        }
        update_stack_comments(&doc, platform, progress, &mut result).await;
    }

    Ok(SubmitReport {
        mode,
        plan,
        result,
        document: doc,
    })
}
