//! Keeping one navigation comment per PR up to date

use super::{is_navigation_comment, parse, render};
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{PrComment, StackDocument};
use tracing::debug;

/// What to do with a PR's navigation comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDecision {
    /// Existing comment already matches
    Skip,
    /// No navigation comment yet
    Create,
    /// Overwrite the existing comment
    Update {
        /// Comment to overwrite
        comment_id: u64,
    },
}

/// Decide how to reconcile an existing comment with a freshly rendered body
///
/// Unparseable comments are overwritten, so stale or foreign-version comments
/// heal on the next write.
pub fn decide(existing: Option<&PrComment>, rendered: &str) -> CommentDecision {
    let Some(comment) = existing else {
        return CommentDecision::Create;
    };

    if let Err(e) = parse(&comment.body) {
        debug!("comment {} will be overwritten: {e}", comment.id);
        return CommentDecision::Update {
            comment_id: comment.id,
        };
    }

    if comment.body == rendered {
        CommentDecision::Skip
    } else {
        CommentDecision::Update {
            comment_id: comment.id,
        }
    }
}

/// First navigation comment among a PR's comments
pub fn find_navigation_comment(comments: &[PrComment]) -> Option<&PrComment> {
    comments.iter().find(|c| is_navigation_comment(&c.body))
}

/// Render `doc` for `current` and reconcile it with the comment on `pr_number`
///
/// Returns the decision taken. In dry-run mode the decision is computed but
/// nothing is written.
pub async fn sync_navigation_comment(
    platform: &dyn PlatformService,
    pr_number: u64,
    doc: &StackDocument,
    current: &str,
    dry_run: bool,
) -> Result<CommentDecision> {
    let rendered = render(doc, current);
    let comments = platform.list_pr_comments(pr_number).await?;
    let decision = decide(find_navigation_comment(&comments), &rendered);
    debug!("PR #{pr_number} ({current}): {decision:?}");

    if dry_run {
        return Ok(decision);
    }

    match decision {
        CommentDecision::Skip => {}
        CommentDecision::Create => platform.create_pr_comment(pr_number, &rendered).await?,
        CommentDecision::Update { comment_id } => {
            platform
                .update_pr_comment(pr_number, comment_id, &rendered)
                .await?;
        }
    }
    Ok(decision)
}
