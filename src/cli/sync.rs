//! Sync command - update trunk, clean up merged branches and restack

use crate::cli::progress::CliProgress;
use crate::cli::prompt::DialoguerPrompter;
use crate::cli::style::{bullet, check, Stylize};
use crate::cli::Session;
use anstream::println;
use gt_stack::error::Result;
use gt_stack::sync::{sync_stack, SyncRequest};

/// Run the sync command
pub async fn run_sync(session: &Session, request: SyncRequest) -> Result<()> {
    let platform = session.connect_platform().await?;
    let progress = CliProgress::compact();

    let report = sync_stack(
        &session.workspace,
        platform.as_ref(),
        &progress,
        &DialoguerPrompter,
        request,
    )
    .await?;

    println!();
    if !report.unmerged.is_empty() {
        println!("{}", "Unmerged branches:".emphasis());
        for branch in &report.unmerged {
            println!("  {} {}", bullet(), branch);
        }
    }
    for (branch, reason) in &report.unknown {
        println!(
            "  {} {} {}",
            bullet(),
            branch,
            format!("(skipped: {reason})").muted()
        );
    }

    if report.started_on_trunk {
        println!(
            "{}",
            "Started on trunk: trunk was updated, but no stack was checked for merged branches"
                .warn()
        );
        println!(
            "  {}",
            "Check out a branch of the stack and run `gts sync` again to clean it up".muted()
        );
    } else if report.merged.is_empty() {
        println!("{} No merged branches to clean up", check());
    } else if request.dry_run {
        println!("{}", "Merged branches (would offer to delete):".emphasis());
        for branch in &report.merged {
            println!("  {} {}", bullet(), branch.accent());
        }
    } else {
        for branch in &report.deleted {
            println!("{} Deleted {}", check(), branch.accent());
        }
        for branch in &report.kept {
            println!("  Kept {}", branch.accent());
        }
    }

    if report.restacked {
        println!("{} Restacked", check());
    }
    if let Some(branch) = &report.restored_to {
        println!("Returned to {}", branch.accent());
    }
    if request.dry_run {
        println!("{}", "Dry run complete".muted());
    }

    Ok(())
}
