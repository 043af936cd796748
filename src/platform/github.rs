//! GitHub service over the REST API

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{NewPullRequest, PlatformConfig, PrComment, PrState, PrUpdate, PullRequest};
use async_trait::async_trait;
use octocrab::models::pulls::PullRequest as GhPullRequest;
use octocrab::Octocrab;
use tracing::debug;

/// Page size for list calls; the default of 30 drops comments on busy PRs
const PER_PAGE: u8 = 100;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref h) = config.host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::PrApi(e.to_string()))?;
        }

        let client = builder.build().map_err(|e| Error::PrApi(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn head_filter(&self, head_branch: &str) -> String {
        format!("{}:{}", self.config.owner, head_branch)
    }
}

fn to_pull_request(pr: &GhPullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
    }
}

fn state_of(pr: &GhPullRequest) -> PrState {
    if pr.merged_at.is_some() {
        PrState::Merged
    } else if matches!(pr.state, Some(octocrab::models::IssueState::Closed)) {
        PrState::Closed
    } else {
        PrState::Open
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(self.head_filter(head_branch))
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        Ok(prs.items.first().map(to_pull_request))
    }

    async fn pr_state(&self, head_branch: &str) -> Result<Option<PrState>> {
        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(self.head_filter(head_branch))
            .state(octocrab::params::State::All)
            .sort(octocrab::params::pulls::Sort::Created)
            .direction(octocrab::params::Direction::Descending)
            .per_page(1)
            .send()
            .await?;

        let state = prs.items.first().map(state_of);
        debug!("PR state for {head_branch}: {state:?}");
        Ok(state)
    }

    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PullRequest> {
        let created = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(&pr.title, &pr.head, &pr.base)
            .body(&pr.body)
            .draft(Some(pr.draft))
            .send()
            .await?;

        Ok(to_pull_request(&created))
    }

    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest> {
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let mut request = pulls.update(pr_number);
        if let Some(base) = &update.base {
            request = request.base(base.as_str());
        }
        if let Some(title) = &update.title {
            request = request.title(title.as_str());
        }
        let pr = request.send().await?;

        Ok(to_pull_request(&pr))
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        let page = self
            .client
            .issues(&self.config.owner, &self.config.repo)
            .list_comments(pr_number)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let comments = self.client.all_pages(page).await?;

        Ok(comments
            .into_iter()
            .map(|c| PrComment {
                id: c.id.0,
                body: c.body.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(pr_number, body)
            .await?;
        Ok(())
    }

    async fn update_pr_comment(&self, _pr_number: u64, comment_id: u64, body: &str) -> Result<()> {
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .update_comment(octocrab::models::CommentId(comment_id), body)
            .await?;
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
