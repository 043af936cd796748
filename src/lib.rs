//! gt-stack - stack-aware `sync` and `submit` for the `gt` workflow
//!
//! Reads the current branch stack from the stacking tool, keeps a navigation
//! comment on every PR in the stack, and orchestrates multi-branch pushes and
//! PR updates on GitHub. Every other command is passed through to the
//! stacking tool untouched.

pub mod auth;
pub mod comment;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod platform;
pub mod progress;
pub mod prompt;
pub mod repo;
pub mod router;
pub mod stack;
pub mod submit;
pub mod sync;
pub mod types;

pub use error::{Error, Result};
pub use types::{BranchNode, StackDocument, SubmitMode};
