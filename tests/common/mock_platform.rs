//! Mock platform service for testing
//!
//! Comments are stored per PR, so repeated synchronizations see what earlier
//! ones wrote.

#![allow(dead_code)]

use async_trait::async_trait;
use gt_stack::error::{Error, Result};
use gt_stack::platform::PlatformService;
use gt_stack::types::{NewPullRequest, PlatformConfig, PrComment, PrState, PrUpdate, PullRequest};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Call record for `update_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrCall {
    pub pr_number: u64,
    pub update: PrUpdate,
}

/// Call record for comment writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWrite {
    pub pr_number: u64,
    /// `None` for creates
    pub comment_id: Option<u64>,
    pub body: String,
}

/// Hand-written `PlatformService` double
///
/// Features:
/// - Auto-incrementing PR numbers (starting at 100)
/// - Comment storage with auto-incrementing ids
/// - Call tracking for verification
/// - Per-branch error injection
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    next_comment_id: AtomicU64,
    open_prs: Mutex<HashMap<String, PullRequest>>,
    pr_states: Mutex<HashMap<String, PrState>>,
    comments: Mutex<HashMap<u64, Vec<PrComment>>>,
    // Call tracking
    find_pr_calls: Mutex<Vec<String>>,
    pr_state_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<NewPullRequest>>,
    update_pr_calls: Mutex<Vec<UpdatePrCall>>,
    comment_writes: Mutex<Vec<CommentWrite>>,
    // Error injection
    fail_create_for: Mutex<HashSet<String>>,
    fail_state_for: Mutex<HashSet<String>>,
    fail_comments_on: Mutex<HashSet<u64>>,
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformService {
    /// Create a mock for `test/repo`
    pub fn new() -> Self {
        Self {
            config: PlatformConfig {
                owner: "test".to_string(),
                repo: "repo".to_string(),
                host: None,
            },
            next_pr_number: AtomicU64::new(100),
            next_comment_id: AtomicU64::new(1),
            open_prs: Mutex::new(HashMap::new()),
            pr_states: Mutex::new(HashMap::new()),
            comments: Mutex::new(HashMap::new()),
            find_pr_calls: Mutex::new(Vec::new()),
            pr_state_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_pr_calls: Mutex::new(Vec::new()),
            comment_writes: Mutex::new(Vec::new()),
            fail_create_for: Mutex::new(HashSet::new()),
            fail_state_for: Mutex::new(HashSet::new()),
            fail_comments_on: Mutex::new(HashSet::new()),
        }
    }

    // === Setup ===

    /// Register an open PR for its head branch
    pub fn add_open_pr(&self, pr: PullRequest) {
        self.pr_states
            .lock()
            .unwrap()
            .insert(pr.head_ref.clone(), PrState::Open);
        self.open_prs.lock().unwrap().insert(pr.head_ref.clone(), pr);
    }

    /// Set the state reported for a branch's PR
    pub fn set_pr_state(&self, branch: &str, state: PrState) {
        self.pr_states
            .lock()
            .unwrap()
            .insert(branch.to_string(), state);
    }

    /// Seed a comment on a PR
    pub fn add_comment(&self, pr_number: u64, body: &str) -> u64 {
        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        self.comments
            .lock()
            .unwrap()
            .entry(pr_number)
            .or_default()
            .push(PrComment {
                id,
                body: body.to_string(),
            });
        id
    }

    /// Make `create_pr` fail for a head branch
    pub fn fail_create_pr(&self, branch: &str) {
        self.fail_create_for
            .lock()
            .unwrap()
            .insert(branch.to_string());
    }

    /// Make `pr_state` fail for a branch
    pub fn fail_pr_state(&self, branch: &str) {
        self.fail_state_for
            .lock()
            .unwrap()
            .insert(branch.to_string());
    }

    /// Make comment writes on a PR fail
    pub fn fail_comments(&self, pr_number: u64) {
        self.fail_comments_on.lock().unwrap().insert(pr_number);
    }

    // === Call verification ===

    pub fn find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    pub fn pr_state_calls(&self) -> Vec<String> {
        self.pr_state_calls.lock().unwrap().clone()
    }

    pub fn create_pr_calls(&self) -> Vec<NewPullRequest> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn update_pr_calls(&self) -> Vec<UpdatePrCall> {
        self.update_pr_calls.lock().unwrap().clone()
    }

    pub fn comment_writes(&self) -> Vec<CommentWrite> {
        self.comment_writes.lock().unwrap().clone()
    }

    /// Current comments on a PR
    pub fn comments_on(&self, pr_number: u64) -> Vec<PrComment> {
        self.comments
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or_default()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    fn check_comment_failure(&self, pr_number: u64) -> Result<()> {
        if self.fail_comments_on.lock().unwrap().contains(&pr_number) {
            return Err(Error::PrApi(format!("comment write on #{pr_number} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        self.find_pr_calls
            .lock()
            .unwrap()
            .push(head_branch.to_string());
        Ok(self.open_prs.lock().unwrap().get(head_branch).cloned())
    }

    async fn pr_state(&self, head_branch: &str) -> Result<Option<PrState>> {
        self.pr_state_calls
            .lock()
            .unwrap()
            .push(head_branch.to_string());
        if self.fail_state_for.lock().unwrap().contains(head_branch) {
            return Err(Error::PrApi("rate limited".to_string()));
        }
        Ok(self.pr_states.lock().unwrap().get(head_branch).copied())
    }

    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(pr.clone());

        if self.fail_create_for.lock().unwrap().contains(&pr.head) {
            return Err(Error::PrApi(format!("cannot create PR for {}", pr.head)));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let created = PullRequest {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            base_ref: pr.base.clone(),
            head_ref: pr.head.clone(),
            title: pr.title.clone(),
        };
        self.add_open_pr(created.clone());
        Ok(created)
    }

    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest> {
        self.update_pr_calls.lock().unwrap().push(UpdatePrCall {
            pr_number,
            update: update.clone(),
        });

        let mut prs = self.open_prs.lock().unwrap();
        let pr = prs
            .values_mut()
            .find(|p| p.number == pr_number)
            .ok_or_else(|| Error::PrApi(format!("no PR #{pr_number}")))?;
        if let Some(base) = &update.base {
            pr.base_ref.clone_from(base);
        }
        if let Some(title) = &update.title {
            pr.title.clone_from(title);
        }
        Ok(pr.clone())
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        Ok(self.comments_on(pr_number))
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.check_comment_failure(pr_number)?;
        self.comment_writes.lock().unwrap().push(CommentWrite {
            pr_number,
            comment_id: None,
            body: body.to_string(),
        });
        self.add_comment(pr_number, body);
        Ok(())
    }

    async fn update_pr_comment(&self, pr_number: u64, comment_id: u64, body: &str) -> Result<()> {
        self.check_comment_failure(pr_number)?;
        self.comment_writes.lock().unwrap().push(CommentWrite {
            pr_number,
            comment_id: Some(comment_id),
            body: body.to_string(),
        });
        let mut comments = self.comments.lock().unwrap();
        let comment = comments
            .get_mut(&pr_number)
            .and_then(|c| c.iter_mut().find(|c| c.id == comment_id))
            .ok_or_else(|| Error::PrApi(format!("no comment {comment_id}")))?;
        comment.body = body.to_string();
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
