//! Pull request hosting services
//!
//! Two backends implement [`PlatformService`]: the GitHub REST API through
//! octocrab, and the `gh` command-line client.

mod detection;
mod factory;
mod gh_cli;
mod github;

pub use detection::{is_github_host, parse_repo_info};
pub use factory::create_platform_service;
pub use gh_cli::GhCliService;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{NewPullRequest, PlatformConfig, PrComment, PrState, PrUpdate, PullRequest};
use async_trait::async_trait;

/// Pull request operations used by submit and sync
///
/// Implementations pass comment bodies through as single opaque values.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Find an existing open PR for a head branch
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>>;

    /// State of the most recent PR for a head branch, if one exists
    async fn pr_state(&self, head_branch: &str) -> Result<Option<PrState>>;

    /// Create a new PR
    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PullRequest>;

    /// Change the base and/or title of an existing PR
    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest>;

    /// List comments on a PR
    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Update an existing comment on a PR
    async fn update_pr_comment(&self, pr_number: u64, comment_id: u64, body: &str) -> Result<()>;

    /// Repository this service talks to
    fn config(&self) -> &PlatformConfig;
}
