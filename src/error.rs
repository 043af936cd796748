//! Error types for gt-stack

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while reading, rendering or submitting a stack
#[derive(Debug, Error)]
pub enum Error {
    /// The branch has no tracking metadata in the stacking tool
    #[error("branch '{0}' is not tracked by the stacking tool; track it first")]
    UntrackedBranch(String),

    /// The stacking tool's listing output did not match the expected grammar
    #[error("cannot parse stack listing: {0}")]
    ListingParse(String),

    /// A navigation comment body could not be parsed
    #[error("cannot parse navigation comment: {0}")]
    CommentParse(String),

    /// A branch in the stack must be restacked before submitting
    #[error("branch '{branch}' needs a restack; run `gts sync` or `gt restack` first")]
    RestackRequired {
        /// Offending branch
        branch: String,
    },

    /// Pushing a branch failed
    #[error("failed to push '{branch}': {diagnostic}")]
    PushFailed {
        /// Branch being pushed
        branch: String,
        /// Raw diagnostic from git
        diagnostic: String,
    },

    /// The PR hosting API rejected a request
    #[error("pull request API error: {0}")]
    PrApi(String),

    /// Unrecognized arguments to an overridden command
    #[error("{0}")]
    Argument(String),

    /// An external command exited unsuccessfully
    #[error("`{command}` failed: {diagnostic}")]
    Command {
        /// Command line that was run
        command: String,
        /// Raw stderr (or stdout when stderr was empty)
        diagnostic: String,
    },

    /// Operation is not allowed from the trunk branch
    #[error("cannot run this from the trunk branch '{0}'")]
    OnTrunk(String),

    /// Current branch is not part of the listed stack
    #[error("branch '{0}' is not in the current stack")]
    BranchNotInStack(String),

    /// Branches below the submission scope have no PRs yet
    #[error("these branches need PRs first (try --downstack): {}", .0.join(", "))]
    MissingDownstackPrs(Vec<String>),

    /// A stack document violated its structural invariants
    #[error("invalid stack: {0}")]
    InvalidStack(String),

    /// Uncommitted changes present
    #[error("there are local changes; commit or stash them first")]
    DirtyWorkingTree,

    /// No GitHub remote could be found
    #[error("remote '{0}' does not point at a supported GitHub repository")]
    NoSupportedRemote(String),

    /// Authentication token could not be found
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration file problems
    #[error("configuration error: {0}")]
    Config(String),

    /// Interactive prompt failed
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// Interrupted by the user
    #[error("interrupted")]
    Interrupted,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Argument(_) => 2,
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::PrApi(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::PrApi(format!("unexpected response: {err}"))
    }
}
