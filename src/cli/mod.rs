//! CLI commands
//!
//! Command implementations for the `gts` binary.

mod passthrough;
mod progress;
mod prompt;
pub mod style;
mod submit;
mod sync;

pub use passthrough::{run_pass_through, run_usage, run_version};
pub use submit::run_submit;
pub use sync::run_sync;

use gt_stack::config::Settings;
use gt_stack::error::Result;
use gt_stack::exec::{CommandRunner, ProcessRunner};
use gt_stack::platform::{create_platform_service, parse_repo_info, PlatformService};
use gt_stack::repo::Workspace;
use std::sync::Arc;

/// Process runner and workspace shared by every command
pub struct Session {
    /// Runner for git, the stacking tool and gh
    pub runner: Arc<dyn CommandRunner>,
    /// Git and stacking tool wrappers
    pub workspace: Workspace,
}

impl Session {
    /// Build a session running real processes
    pub fn new(settings: Settings) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
        let workspace = Workspace::new(Arc::clone(&runner), settings);
        Self { runner, workspace }
    }

    /// Connect to the PR host behind the configured remote
    pub async fn connect_platform(&self) -> Result<Box<dyn PlatformService>> {
        let url = self.workspace.git.remote_url().await?;
        let config = parse_repo_info(&url)?;
        create_platform_service(
            self.workspace.settings.backend,
            config,
            Arc::clone(&self.runner),
        )
        .await
    }
}
