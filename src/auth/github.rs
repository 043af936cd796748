//! GitHub token discovery

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use crate::exec::CommandRunner;
use std::env;
use tracing::debug;

/// Environment variables consulted after the gh CLI, in order
const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

/// Get GitHub authentication
///
/// Priority:
/// 1. gh CLI (`gh auth token`)
/// 2. `GITHUB_TOKEN` environment variable
/// 3. `GH_TOKEN` environment variable
pub async fn get_github_auth(runner: &dyn CommandRunner) -> Result<GitHubAuthConfig> {
    if let Some(token) = get_gh_cli_token(runner).await {
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    for var in TOKEN_ENV_VARS {
        if let Some(token) = env::var(var).ok().filter(|t| !t.trim().is_empty()) {
            return Ok(GitHubAuthConfig {
                token,
                source: AuthSource::EnvVar,
            });
        }
    }

    Err(Error::Auth(
        "no GitHub token found; run `gh auth login` or set GITHUB_TOKEN".to_string(),
    ))
}

async fn get_gh_cli_token(runner: &dyn CommandRunner) -> Option<String> {
    let output = match runner.run("gh", &["auth", "token"]).await {
        Ok(output) => output,
        Err(e) => {
            debug!("gh CLI unavailable: {e}");
            return None;
        }
    };

    if !output.success() {
        return None;
    }

    let token = output.stdout.trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}
