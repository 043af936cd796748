//! Test fixtures for building stacks and repository scripts

#![allow(dead_code)]

use super::mock_runner::MockRunner;
use gt_stack::config::Settings;
use gt_stack::exec::{CommandOutput, CommandRunner};
use gt_stack::repo::Workspace;
use gt_stack::types::{BranchNode, PrComment, PullRequest, StackDocument};
use std::sync::Arc;

/// Root reported by `git rev-parse --show-toplevel`; has no PR template
pub const REPO_ROOT: &str = "/nonexistent/gt-stack-test-repo";

/// Create a `PullRequest` with URL derived from number
pub fn make_pr(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/test/repo/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: format!("Subject of {head}"),
    }
}

/// Create a `PrComment`
pub fn make_pr_comment(id: u64, body: &str) -> PrComment {
    PrComment {
        id,
        body: body.to_string(),
    }
}

/// Linear document `trunk <- names...`
pub fn make_doc(trunk: &str, names: &[&str]) -> StackDocument {
    let nodes = std::iter::once(trunk)
        .chain(names.iter().copied())
        .enumerate()
        .map(|(i, name)| BranchNode::new(name, i))
        .collect();
    StackDocument::new(nodes).unwrap()
}

/// Listing output as printed by `gt ls --stack --reverse`
///
/// Branches in `restack` carry the needs-restack annotation.
pub fn listing(trunk: &str, names: &[&str], current: &str, restack: &[&str]) -> String {
    std::iter::once(trunk)
        .chain(names.iter().copied())
        .map(|name| {
            let marker = if name == current { '◉' } else { '◯' };
            let note = if restack.contains(&name) {
                " (needs restack)"
            } else {
                ""
            };
            format!("{marker} {name}{note}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runner scripted for a stack `main <- names...` with `head` checked out
pub fn stack_runner(names: &[&str], head: &str) -> Arc<MockRunner> {
    stack_runner_with_restack(names, head, &[])
}

/// Like [`stack_runner`] with some branches needing a restack
pub fn stack_runner_with_restack(names: &[&str], head: &str, restack: &[&str]) -> Arc<MockRunner> {
    let runner = MockRunner::new(head);
    runner
        .on("gt", &["trunk"], CommandOutput::ok("main\n"))
        .on(
            "gt",
            &["ls", "--stack", "--reverse"],
            CommandOutput::ok(listing("main", names, head, restack)),
        )
        .on(
            "git",
            &["rev-parse", "--show-toplevel"],
            CommandOutput::ok(REPO_ROOT),
        )
        .on(
            "git",
            &["remote", "get-url", "origin"],
            CommandOutput::ok("git@github.com:test/repo.git"),
        );
    for name in names {
        runner.on(
            "git",
            &["log", "-1", "--pretty=%s", name],
            CommandOutput::ok(format!("Subject of {name}\n")),
        );
    }
    Arc::new(runner)
}

/// Workspace over a runner with default settings
pub fn workspace(runner: &Arc<MockRunner>) -> Workspace {
    workspace_with(runner, Settings::default())
}

/// Workspace over a runner with custom settings
pub fn workspace_with(runner: &Arc<MockRunner>, settings: Settings) -> Workspace {
    let runner: Arc<dyn CommandRunner> = Arc::<MockRunner>::clone(runner);
    Workspace::new(runner, settings)
}
