//! Core types for gt-stack

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One branch in a linear stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchNode {
    /// Branch name
    pub name: String,
    /// Depth from trunk (0 = trunk)
    pub position: usize,
    /// PR number once submitted
    pub pr_number: Option<u64>,
    /// Title shown in the navigation tree
    pub pr_title: String,
    /// Whether this is the branch the rendering is for
    pub is_current: bool,
    /// Whether the stacking tool reports the branch as needing a restack
    pub needs_restack: bool,
    /// Whether the stacking tool tracks the branch
    pub tracked: bool,
}

impl BranchNode {
    /// Create a tracked node with no PR
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            pr_number: None,
            pr_title: String::new(),
            is_current: false,
            needs_restack: false,
            tracked: true,
        }
    }

    /// Whether this node is the trunk
    pub const fn is_trunk(&self) -> bool {
        self.position == 0
    }
}

/// A linear stack from trunk (index 0) to tip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDocument {
    nodes: Vec<BranchNode>,
}

impl StackDocument {
    /// Build a document, checking position and trunk invariants
    pub fn new(nodes: Vec<BranchNode>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::InvalidStack("stack has no trunk".to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for (i, node) in nodes.iter().enumerate() {
            if node.position != i {
                return Err(Error::InvalidStack(format!(
                    "branch '{}' has position {} but is entry {i}",
                    node.name, node.position
                )));
            }
            if !seen.insert(node.name.as_str()) {
                return Err(Error::InvalidStack(format!(
                    "branch '{}' appears twice",
                    node.name
                )));
            }
        }

        if nodes[0].pr_number.is_some() {
            return Err(Error::InvalidStack(format!(
                "trunk '{}' cannot carry a PR number",
                nodes[0].name
            )));
        }

        if nodes.iter().filter(|n| n.is_current).count() > 1 {
            return Err(Error::InvalidStack(
                "more than one branch is marked current".to_string(),
            ));
        }

        Ok(Self { nodes })
    }

    /// All nodes, trunk first
    pub fn nodes(&self) -> &[BranchNode] {
        &self.nodes
    }

    /// The trunk node
    pub fn trunk(&self) -> &BranchNode {
        &self.nodes[0]
    }

    /// Non-trunk nodes in position order
    pub fn branches(&self) -> &[BranchNode] {
        &self.nodes[1..]
    }

    /// Number of nodes including trunk
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the stack has no branches besides trunk
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Look up a node by branch name
    pub fn get(&self, name: &str) -> Option<&BranchNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Whether the stack contains the branch
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The node marked current, if any
    pub fn current(&self) -> Option<&BranchNode> {
        self.nodes.iter().find(|n| n.is_current)
    }

    /// Parent of a branch (trunk for the first branch)
    pub fn parent_of(&self, name: &str) -> Option<&BranchNode> {
        let node = self.get(name)?;
        node.position
            .checked_sub(1)
            .and_then(|p| self.nodes.get(p))
    }

    /// Copy of this document with only `name` marked current
    #[must_use]
    pub fn with_current(&self, name: &str) -> Self {
        let nodes = self
            .nodes
            .iter()
            .map(|n| BranchNode {
                is_current: n.name == name,
                ..n.clone()
            })
            .collect();
        Self { nodes }
    }

    /// Record PR metadata for a non-trunk branch
    pub fn set_pr(&mut self, name: &str, number: u64, title: &str) -> Result<()> {
        let node = self
            .nodes
            .iter_mut()
            .skip(1)
            .find(|n| n.name == name)
            .ok_or_else(|| Error::BranchNotInStack(name.to_string()))?;
        node.pr_number = Some(number);
        node.pr_title = title.trim().to_string();
        Ok(())
    }

    /// Set the title shown for a branch that has no PR yet
    pub fn set_title(&mut self, name: &str, title: &str) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.name == name) {
            node.pr_title = title.trim().to_string();
        }
    }

    /// First branch that needs a restack
    pub fn first_needing_restack(&self) -> Option<&BranchNode> {
        self.branches().iter().find(|n| n.needs_restack)
    }

    /// Branches selected by a submission mode, in position order
    pub fn scope(&self, mode: SubmitMode, current: &str) -> Result<Vec<&BranchNode>> {
        let node = self
            .get(current)
            .ok_or_else(|| Error::BranchNotInStack(current.to_string()))?;
        if node.is_trunk() {
            return Err(Error::OnTrunk(current.to_string()));
        }

        let pos = node.position;
        let selected = self.branches().iter().filter(|n| match mode {
            SubmitMode::Single => n.position == pos,
            SubmitMode::Upstack => n.position >= pos,
            SubmitMode::Downstack => n.position <= pos,
            SubmitMode::WholeStack => true,
        });
        Ok(selected.collect())
    }
}

/// Which part of the stack a submission covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Only the current branch
    Single,
    /// Current branch and its descendants
    Upstack,
    /// Current branch and its ancestors (trunk excluded)
    Downstack,
    /// Every non-trunk branch
    WholeStack,
}

impl fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Single => "single",
            Self::Upstack => "upstack",
            Self::Downstack => "downstack",
            Self::WholeStack => "whole-stack",
        };
        f.write_str(s)
    }
}

/// A pull request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
}

/// Lifecycle state of the PR for a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// Open (including drafts)
    Open,
    /// Closed without merging
    Closed,
    /// Merged
    Merged,
}

/// A comment on a pull request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Comment body text
    pub body: String,
}

/// Parameters for opening a PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Head branch
    pub head: String,
    /// Base branch
    pub base: String,
    /// Title
    pub title: String,
    /// Description body
    pub body: String,
    /// Open as draft
    pub draft: bool,
}

/// Changes to an existing PR; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrUpdate {
    /// New base branch
    pub base: Option<String>,
    /// New title
    pub title: Option<String>,
}

impl PrUpdate {
    /// Whether nothing would change
    pub const fn is_empty(&self) -> bool {
        self.base.is_none() && self.title.is_none()
    }
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
