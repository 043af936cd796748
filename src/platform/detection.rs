//! Repository detection from remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use regex::Regex;
use std::env;
use std::sync::OnceLock;

/// Whether `hostname` is github.com or the enterprise host named by `GH_HOST`
pub fn is_github_host(hostname: &str) -> bool {
    hostname == "github.com"
        || hostname.ends_with(".github.com")
        || env::var("GH_HOST").is_ok_and(|h| hostname == h)
}

fn scp_like() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[^@/]+@)?(?P<host>[^:/]+):(?P<path>.+?)(?:\.git)?/?$")
            .expect("hardcoded remote regex is valid")
    })
}

/// Parse owner/repo (and enterprise host) from a remote URL
///
/// Accepts `git@host:owner/repo.git`, `https://host/owner/repo(.git)` and
/// `ssh://git@host/owner/repo.git`.
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let unsupported = || Error::NoSupportedRemote(url.to_string());

    let (hostname, path) = match url::Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some() => {
            let host = parsed.host_str().unwrap_or_default().to_string();
            let path = parsed.path().trim_matches('/').to_string();
            (host, path)
        }
        _ => {
            let caps = scp_like().captures(url).ok_or_else(unsupported)?;
            (caps["host"].to_string(), caps["path"].to_string())
        }
    };

    if !is_github_host(&hostname) {
        return Err(unsupported());
    }

    let path = path.strip_suffix(".git").unwrap_or(&path);
    let (owner, repo) = path.split_once('/').ok_or_else(unsupported)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(unsupported());
    }

    let host = (hostname != "github.com").then_some(hostname);

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}
