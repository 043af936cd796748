//! Platform service factory

use crate::auth::get_github_auth;
use crate::config::Backend;
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::platform::{GhCliService, GitHubService, PlatformService};
use crate::types::PlatformConfig;
use std::sync::Arc;
use tracing::debug;

/// Create the platform service selected by `backend`
///
/// The API backend discovers a token first; the `gh` backend relies on the
/// client's own login.
pub async fn create_platform_service(
    backend: Backend,
    config: PlatformConfig,
    runner: Arc<dyn CommandRunner>,
) -> Result<Box<dyn PlatformService>> {
    debug!(
        "using {backend:?} backend for {}/{}",
        config.owner, config.repo
    );
    match backend {
        Backend::Api => {
            let auth = get_github_auth(runner.as_ref()).await?;
            debug!("GitHub token from {:?}", auth.source);
            Ok(Box::new(GitHubService::new(&auth.token, config)?))
        }
        Backend::Gh => Ok(Box::new(GhCliService::new(runner, config))),
    }
}
