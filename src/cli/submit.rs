//! Submit command - push the stack and create or update its PRs

use crate::cli::progress::CliProgress;
use crate::cli::prompt::DialoguerPrompter;
use crate::cli::style::{arrow, check, cross, hyperlink_url, Stream, Stylize};
use crate::cli::Session;
use anstream::{eprintln, println};
use gt_stack::error::Result;
use gt_stack::submit::{submit_stack, SubmitRequest};
use gt_stack::types::StackDocument;

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "es" }
}

fn print_stack(doc: &StackDocument) {
    println!("{}", "Stack:".emphasis());
    for node in doc.nodes().iter().rev() {
        let suffix = node
            .pr_number
            .map(|n| format!(" #{n}"))
            .unwrap_or_default();
        if node.is_current {
            println!("  {} {}{}", arrow(), node.name.accent(), suffix.muted());
        } else {
            println!("    {}{}", node.name, suffix.muted());
        }
    }
    println!();
}

/// Run the submit command
pub async fn run_submit(session: &Session, request: SubmitRequest) -> Result<()> {
    let platform = session.connect_platform().await?;
    let progress = CliProgress::verbose();

    let mut report = submit_stack(
        &session.workspace,
        platform.as_ref(),
        &progress,
        &DialoguerPrompter,
        request,
    )
    .await?;

    println!();
    print_stack(&report.document);

    if request.dry_run {
        println!("{}", "Dry run complete".muted());
        return Ok(());
    }

    let result = &mut report.result;
    if let Some(err) = result.failure.take() {
        eprintln!("{} Submission stopped", cross());
        if !result.pushed_branches.is_empty() {
            eprintln!("  Pushed before the failure: {}", result.pushed_branches.join(", "));
        }
        for pr in result.created_prs.iter().chain(&result.updated_prs) {
            eprintln!("  PR #{} ({})", pr.number, pr.head_ref);
        }
        return Err(err);
    }

    let submitted = report.plan.steps.len();
    println!(
        "{} Submitted {} branch{} in {} mode",
        check(),
        submitted.accent(),
        plural(submitted),
        report.mode.accent()
    );
    for step in &report.plan.steps {
        if let Some(pr) = result.prs.get(&step.branch) {
            println!(
                "  {} #{} {}",
                step.branch.emphasis(),
                pr.number,
                hyperlink_url(Stream::Stdout, &pr.html_url).muted()
            );
        }
    }
    for warning in &result.warnings {
        eprintln!("{}: {warning}", "warning".warn());
    }

    Ok(())
}
