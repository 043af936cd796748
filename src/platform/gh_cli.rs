//! GitHub service backed by the `gh` command-line client
//!
//! Every value, comment bodies included, is handed to `gh` as its own argv
//! element, so multi-line bodies reach GitHub byte for byte.

use crate::error::{Error, Result};
use crate::exec::{run_checked, CommandRunner};
use crate::platform::PlatformService;
use crate::types::{NewPullRequest, PlatformConfig, PrComment, PrState, PrUpdate, PullRequest};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const PR_FIELDS: &str = "number,url,baseRefName,headRefName,title";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPr {
    number: u64,
    url: String,
    base_ref_name: String,
    head_ref_name: String,
    title: String,
}

impl From<GhPr> for PullRequest {
    fn from(pr: GhPr) -> Self {
        Self {
            number: pr.number,
            html_url: pr.url,
            base_ref: pr.base_ref_name,
            head_ref: pr.head_ref_name,
            title: pr.title,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhPrState {
    state: String,
}

#[derive(Debug, Deserialize)]
struct GhComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
}

/// GitHub service that shells out to `gh`
pub struct GhCliService {
    runner: Arc<dyn CommandRunner>,
    config: PlatformConfig,
}

impl GhCliService {
    /// Create a service for the repository in `config`
    pub fn new(runner: Arc<dyn CommandRunner>, config: PlatformConfig) -> Self {
        Self { runner, config }
    }

    fn repo_arg(&self) -> String {
        match &self.config.host {
            Some(host) => format!("{host}/{}/{}", self.config.owner, self.config.repo),
            None => format!("{}/{}", self.config.owner, self.config.repo),
        }
    }

    async fn gh(&self, args: &[&str]) -> Result<String> {
        run_checked(self.runner.as_ref(), "gh", args)
            .await
            .map_err(|e| match e {
                Error::Command { command, diagnostic } => {
                    Error::PrApi(format!("`{command}`: {diagnostic}"))
                }
                other => other,
            })
    }

    async fn api(&self, args: &[&str]) -> Result<String> {
        let mut argv = vec!["api"];
        if let Some(host) = &self.config.host {
            argv.extend(["--hostname", host.as_str()]);
        }
        argv.extend_from_slice(args);
        self.gh(&argv).await
    }

    async fn view_pr(&self, selector: &str) -> Result<PullRequest> {
        let repo = self.repo_arg();
        let out = self
            .gh(&["pr", "view", selector, "--repo", &repo, "--json", PR_FIELDS])
            .await?;
        Ok(serde_json::from_str::<GhPr>(&out)?.into())
    }
}

fn parse_state(state: &str) -> Result<PrState> {
    match state {
        "OPEN" => Ok(PrState::Open),
        "CLOSED" => Ok(PrState::Closed),
        "MERGED" => Ok(PrState::Merged),
        other => Err(Error::PrApi(format!("unknown PR state '{other}'"))),
    }
}

/// Parse `gh api --paginate` output, which concatenates one array per page
fn parse_comment_pages(out: &str) -> Result<Vec<PrComment>> {
    let mut comments = Vec::new();
    for page in serde_json::Deserializer::from_str(out).into_iter::<Vec<GhComment>>() {
        comments.extend(page?.into_iter().map(|c| PrComment {
            id: c.id,
            body: c.body.unwrap_or_default(),
        }));
    }
    Ok(comments)
}

#[async_trait]
impl PlatformService for GhCliService {
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        let repo = self.repo_arg();
        let out = self
            .gh(&[
                "pr", "list", "--repo", &repo, "--head", head_branch, "--state", "open",
                "--limit", "1", "--json", PR_FIELDS,
            ])
            .await?;
        let prs: Vec<GhPr> = serde_json::from_str(&out)?;
        Ok(prs.into_iter().next().map(Into::into))
    }

    async fn pr_state(&self, head_branch: &str) -> Result<Option<PrState>> {
        let repo = self.repo_arg();
        let out = self
            .gh(&[
                "pr", "list", "--repo", &repo, "--head", head_branch, "--state", "all",
                "--limit", "1", "--json", "state",
            ])
            .await?;
        let prs: Vec<GhPrState> = serde_json::from_str(&out)?;
        prs.first().map(|p| parse_state(&p.state)).transpose()
    }

    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PullRequest> {
        let repo = self.repo_arg();
        let mut args = vec![
            "pr",
            "create",
            "--repo",
            repo.as_str(),
            "--head",
            pr.head.as_str(),
            "--base",
            pr.base.as_str(),
            "--title",
            pr.title.as_str(),
            "--body",
            pr.body.as_str(),
        ];
        if pr.draft {
            args.push("--draft");
        }
        let url = self.gh(&args).await?;
        let url = url.lines().last().unwrap_or_default().trim();
        self.view_pr(url).await
    }

    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest> {
        let repo = self.repo_arg();
        let number = pr_number.to_string();
        let mut args = vec!["pr", "edit", number.as_str(), "--repo", repo.as_str()];
        if let Some(base) = &update.base {
            args.extend(["--base", base.as_str()]);
        }
        if let Some(title) = &update.title {
            args.extend(["--title", title.as_str()]);
        }
        self.gh(&args).await?;
        self.view_pr(&number).await
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        let path = format!(
            "repos/{}/{}/issues/{pr_number}/comments?per_page=100",
            self.config.owner, self.config.repo
        );
        let out = self.api(&["--paginate", &path]).await?;
        parse_comment_pages(&out)
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        let repo = self.repo_arg();
        let number = pr_number.to_string();
        self.gh(&["pr", "comment", &number, "--repo", &repo, "--body", body])
            .await
            .map(|_| ())
    }

    async fn update_pr_comment(&self, _pr_number: u64, comment_id: u64, body: &str) -> Result<()> {
        let path = format!(
            "repos/{}/{}/issues/comments/{comment_id}",
            self.config.owner, self.config.repo
        );
        let field = format!("body={body}");
        self.api(&["-X", "PATCH", &path, "-f", &field])
            .await
            .map(|_| ())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
