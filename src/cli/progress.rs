//! Shared CLI progress callback with styled output and spinners

use crate::cli::style::{check, cross, hyperlink_url, spinner_style, Stream, Stylize};
use anstream::{eprintln, print, println};
use async_trait::async_trait;
use gt_stack::comment::CommentDecision;
use gt_stack::error::Error;
use gt_stack::progress::{Phase, ProgressCallback, PushStatus};
use gt_stack::types::PullRequest;
use indicatif::ProgressBar;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress callback that prints to stdout with styled output
///
/// Two modes:
/// - verbose (submit): phase headers, one line per step
/// - compact (sync): inline status updates, indented for nested output
pub struct CliProgress {
    /// Verbose mode shows all phases and detailed output
    pub verbose: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create verbose progress (for submit command)
    pub const fn verbose() -> Self {
        Self {
            verbose: true,
            spinner: Mutex::new(None),
        }
    }

    /// Create compact progress (for sync command)
    pub const fn compact() -> Self {
        Self {
            verbose: false,
            spinner: Mutex::new(None),
        }
    }

    fn start_spinner(&self, message: String) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(bar);
        }
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.lock().ok().and_then(|mut s| s.take()) {
            bar.finish_and_clear();
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        self.stop_spinner();
        match phase {
            // Per-branch phases; the push and PR events say enough
            Phase::Pushing | Phase::CreatingOrUpdatingPr | Phase::Done | Phase::Aborted => {}
            Phase::CheckingMerged => self.start_spinner(format!("{phase}...")),
            _ if self.verbose => println!("{}...", phase.to_string().emphasis()),
            _ => println!("  {}...", phase.to_string().muted()),
        }
    }

    async fn on_branch_push(&self, branch: &str, status: PushStatus) {
        if self.verbose {
            match &status {
                PushStatus::Started => {
                    println!("  Pushing {}...", branch.accent());
                }
                PushStatus::Success => {
                    println!("  {} Pushed {}", check(), branch.emphasis());
                }
                PushStatus::Failed(msg) => {
                    eprintln!(
                        "  {} Failed to push {}: {}",
                        cross(),
                        branch.accent().for_stderr(),
                        msg.error()
                    );
                }
            }
        } else {
            match &status {
                PushStatus::Started => {
                    print!("    Pushing {}... ", branch.accent());
                    let _ = std::io::stdout().flush();
                }
                PushStatus::Success => {
                    println!("{}", "done".success());
                }
                PushStatus::Failed(msg) => {
                    println!("{}", msg.warn().for_stdout());
                }
            }
        }
    }

    async fn on_pr_created(&self, branch: &str, pr: &PullRequest) {
        let pr_num = format!("#{}", pr.number);
        println!(
            "  {} Created PR {} for {}",
            check(),
            pr_num.accent(),
            branch.emphasis()
        );
        println!("    {}", hyperlink_url(Stream::Stdout, &pr.html_url));
    }

    async fn on_pr_updated(&self, branch: &str, pr: &PullRequest) {
        let pr_num = format!("#{}", pr.number);
        println!(
            "  {} Updated PR {} for {}",
            check(),
            pr_num.accent(),
            branch.emphasis()
        );
    }

    async fn on_comment(&self, branch: &str, pr_number: u64, decision: CommentDecision) {
        let what = match decision {
            CommentDecision::Skip => "unchanged",
            CommentDecision::Create => "created",
            CommentDecision::Update { .. } => "updated",
        };
        println!(
            "  {} {} {} {}",
            "-".muted(),
            format!("#{pr_number}").accent(),
            branch.muted(),
            what.muted()
        );
    }

    async fn on_error(&self, err: &Error) {
        self.stop_spinner();
        if self.verbose {
            eprintln!("{}: {}", "error".error(), err);
        } else {
            eprintln!("    {}: {}", "error".error(), err);
        }
    }

    async fn on_message(&self, message: &str) {
        if self.verbose {
            println!("{message}");
        } else {
            println!("  {}", message.muted());
        }
    }
}
