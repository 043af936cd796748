//! User configuration
//!
//! Read from `<config dir>/gt-stack/config.toml`; every key is optional and
//! a handful can be overridden from the environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Which client talks to the PR hosting API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// REST API via octocrab
    Api,
    /// The `gh` command-line client
    Gh,
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Stacking tool executable
    pub tool: String,
    /// Git remote to push to
    pub remote: String,
    /// PR API client
    pub backend: Backend,
    /// Open new PRs as drafts
    pub draft: bool,
    /// Delete merged branches during sync without asking
    pub non_interactive: bool,
    /// Skip the restack step of sync
    pub skip_restack: bool,
    /// Maximum length of a generated PR title
    pub title_max_len: usize,
    /// Retitle existing PRs whose title differs from the generated one
    pub update_titles: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool: "gt".to_string(),
            remote: "origin".to_string(),
            backend: Backend::Api,
            draft: true,
            non_interactive: false,
            skip_restack: false,
            title_max_len: 72,
            update_titles: true,
        }
    }
}

impl Settings {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("gt-stack").join("config.toml"))
    }

    /// Load from the default path and apply environment overrides
    pub fn load() -> Result<Self> {
        let settings = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        settings.with_env_overrides()
    }

    /// Like [`Self::load`], but an unreadable or invalid configuration is
    /// logged and replaced by defaults
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| Self::fallback(&e))
    }

    /// Like [`Self::load_or_default`] for a specific file
    pub fn load_or_default_from(path: &Path) -> Self {
        Self::load_from(path)
            .and_then(Self::with_env_overrides)
            .unwrap_or_else(|e| Self::fallback(&e))
    }

    fn fallback(err: &Error) -> Self {
        warn!("ignoring configuration: {err}");
        Self::default().with_env_overrides().unwrap_or_default()
    }

    /// Load from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Apply `GT_STACK_*` environment overrides
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(tool) = env::var("GT_STACK_TOOL") {
            self.tool = tool;
        }
        if let Ok(remote) = env::var("GT_STACK_REMOTE") {
            self.remote = remote;
        }
        if let Ok(backend) = env::var("GT_STACK_BACKEND") {
            self.backend = match backend.as_str() {
                "api" => Backend::Api,
                "gh" => Backend::Gh,
                other => {
                    return Err(Error::Config(format!(
                        "GT_STACK_BACKEND must be 'api' or 'gh', got '{other}'"
                    )));
                }
            };
        }
        if let Ok(value) = env::var("GT_STACK_NON_INTERACTIVE") {
            self.non_interactive = matches!(value.as_str(), "1" | "true" | "yes");
        }
        Ok(self)
    }
}
