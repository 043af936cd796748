//! Submission planning
//!
//! Turns a stack document, a mode and the PRs that already exist into the
//! ordered list of per-branch steps the executor performs.

use crate::error::{Error, Result};
use crate::types::{NewPullRequest, PrUpdate, PullRequest, StackDocument, SubmitMode};
use std::collections::HashMap;

/// What happens to a branch's PR after the branch is pushed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrAction {
    /// Open a new PR
    Create(NewPullRequest),
    /// Retarget and/or retitle an existing PR
    Update {
        /// Existing PR, as found before the update
        pr: PullRequest,
        /// Fields that differ from the stack
        update: PrUpdate,
    },
    /// Existing PR already matches the stack
    Unchanged(PullRequest),
}

/// One branch of the submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStep {
    /// Branch to push
    pub branch: String,
    /// Parent branch, the PR base
    pub parent: String,
    /// PR work after the push
    pub action: PrAction,
}

/// Submission plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPlan {
    /// Mode the scope was computed for
    pub mode: SubmitMode,
    /// Steps in position order, trunk-most first
    pub steps: Vec<BranchStep>,
    /// Remote name to push to
    pub remote: String,
}

impl SubmissionPlan {
    /// Branches that will get a new PR
    pub fn creates(&self) -> impl Iterator<Item = &BranchStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s.action, PrAction::Create(_)))
    }

    /// Branches whose existing PR will change
    pub fn updates(&self) -> impl Iterator<Item = &BranchStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s.action, PrAction::Update { .. }))
    }
}

/// Inputs for new PRs that do not come from the stack itself
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Remote name to push to
    pub remote: String,
    /// Body for new PRs
    pub body: String,
    /// Open new PRs as drafts
    pub draft: bool,
}

/// Create a submission plan
///
/// `existing_prs` maps branch names to their open PRs. PR titles come from
/// the document's `pr_title`, which the caller fills with defaults; an
/// existing PR whose title differs is retitled.
pub fn create_submission_plan(
    doc: &StackDocument,
    mode: SubmitMode,
    current: &str,
    existing_prs: &HashMap<String, PullRequest>,
    options: &PlanOptions,
) -> Result<SubmissionPlan> {
    let scope = doc.scope(mode, current)?;

    let mut steps = Vec::with_capacity(scope.len());
    for node in scope {
        let parent = doc
            .parent_of(&node.name)
            .ok_or_else(|| Error::InvalidStack(format!("'{}' has no parent", node.name)))?
            .name
            .clone();

        let action = match existing_prs.get(&node.name) {
            Some(pr) => {
                let title = node.pr_title.as_str();
                let update = PrUpdate {
                    base: (pr.base_ref != parent).then(|| parent.clone()),
                    title: (!title.is_empty() && title != pr.title.trim())
                        .then(|| title.to_string()),
                };
                if update.is_empty() {
                    PrAction::Unchanged(pr.clone())
                } else {
                    PrAction::Update {
                        pr: pr.clone(),
                        update,
                    }
                }
            }
            None => PrAction::Create(NewPullRequest {
                head: node.name.clone(),
                base: parent.clone(),
                title: node.pr_title.clone(),
                body: options.body.clone(),
                draft: options.draft,
            }),
        };

        steps.push(BranchStep {
            branch: node.name.clone(),
            parent,
            action,
        });
    }

    Ok(SubmissionPlan {
        mode,
        steps,
        remote: options.remote.clone(),
    })
}

/// Branches below `current` that have no PR, which single and upstack
/// submissions cannot leave behind
pub fn missing_downstack_prs(
    doc: &StackDocument,
    mode: SubmitMode,
    current: &str,
    existing_prs: &HashMap<String, PullRequest>,
) -> Vec<String> {
    if !matches!(mode, SubmitMode::Single | SubmitMode::Upstack) {
        return Vec::new();
    }
    let Some(node) = doc.get(current) else {
        return Vec::new();
    };

    doc.branches()
        .iter()
        .filter(|n| n.position < node.position && !existing_prs.contains_key(&n.name))
        .map(|n| n.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BranchNode;

    fn doc() -> StackDocument {
        let nodes = ["main", "feat-a", "feat-b", "feat-c"]
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let mut node = BranchNode::new(*n, i);
                if i > 0 {
                    node.pr_title = format!("Title {n}");
                }
                node
            })
            .collect();
        StackDocument::new(nodes).unwrap()
    }

    fn pr(number: u64, head: &str, base: &str) -> PullRequest {
        PullRequest {
            number,
            html_url: format!("https://github.com/o/r/pull/{number}"),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: format!("Title {head}"),
        }
    }

    fn options() -> PlanOptions {
        PlanOptions {
            remote: "origin".to_string(),
            body: "template".to_string(),
            draft: true,
        }
    }

    #[test]
    fn test_plan_creates_with_parent_as_base() {
        let plan = create_submission_plan(
            &doc(),
            SubmitMode::Downstack,
            "feat-b",
            &HashMap::new(),
            &options(),
        )
        .unwrap();

        let branches: Vec<_> = plan.steps.iter().map(|s| s.branch.as_str()).collect();
        assert_eq!(branches, ["feat-a", "feat-b"]);
        assert_eq!(plan.creates().count(), 2);

        let PrAction::Create(new_pr) = &plan.steps[1].action else {
            panic!("expected create");
        };
        assert_eq!(new_pr.base, "feat-a");
        assert_eq!(new_pr.title, "Title feat-b");
        assert_eq!(new_pr.body, "template");
        assert!(new_pr.draft);
    }

    #[test]
    fn test_plan_updates_only_mismatched_bases() {
        let mut existing = HashMap::new();
        existing.insert("feat-a".to_string(), pr(1, "feat-a", "main"));
        existing.insert("feat-b".to_string(), pr(2, "feat-b", "main"));

        let plan =
            create_submission_plan(&doc(), SubmitMode::WholeStack, "feat-a", &existing, &options())
                .unwrap();

        assert!(matches!(plan.steps[0].action, PrAction::Unchanged(_)));
        assert_eq!(
            plan.steps[1].action,
            PrAction::Update {
                pr: pr(2, "feat-b", "main"),
                update: PrUpdate {
                    base: Some("feat-a".to_string()),
                    title: None,
                },
            }
        );
        assert!(matches!(plan.steps[2].action, PrAction::Create(_)));
        assert_eq!(plan.updates().count(), 1);
    }

    #[test]
    fn test_plan_retitles_existing_prs() {
        let mut stale = pr(1, "feat-a", "main");
        stale.title = "WIP".to_string();
        let mut both = pr(2, "feat-b", "main");
        both.title = "  Title feat-b ".to_string();
        let mut existing = HashMap::new();
        existing.insert("feat-a".to_string(), stale.clone());
        existing.insert("feat-b".to_string(), both);

        let plan =
            create_submission_plan(&doc(), SubmitMode::Downstack, "feat-b", &existing, &options())
                .unwrap();

        assert_eq!(
            plan.steps[0].action,
            PrAction::Update {
                pr: stale,
                update: PrUpdate {
                    base: None,
                    title: Some("Title feat-a".to_string()),
                },
            }
        );
        // Surrounding whitespace is not a difference
        let PrAction::Update { update, .. } = &plan.steps[1].action else {
            panic!("expected update");
        };
        assert_eq!(update.title, None);
        assert_eq!(update.base.as_deref(), Some("feat-a"));
    }

    #[test]
    fn test_plan_keeps_title_when_document_has_none() {
        let nodes = vec![BranchNode::new("main", 0), BranchNode::new("feat-a", 1)];
        let untitled = StackDocument::new(nodes).unwrap();
        let mut existing = HashMap::new();
        existing.insert("feat-a".to_string(), pr(1, "feat-a", "main"));

        let plan =
            create_submission_plan(&untitled, SubmitMode::Single, "feat-a", &existing, &options())
                .unwrap();

        assert!(matches!(plan.steps[0].action, PrAction::Unchanged(_)));
    }

    #[test]
    fn test_missing_downstack_prs() {
        let mut existing = HashMap::new();
        existing.insert("feat-b".to_string(), pr(2, "feat-b", "feat-a"));

        assert_eq!(
            missing_downstack_prs(&doc(), SubmitMode::Single, "feat-c", &existing),
            ["feat-a"]
        );
        assert_eq!(
            missing_downstack_prs(&doc(), SubmitMode::Upstack, "feat-a", &existing),
            Vec::<String>::new()
        );
        assert!(missing_downstack_prs(&doc(), SubmitMode::Downstack, "feat-c", &existing).is_empty());
    }
}
