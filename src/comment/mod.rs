//! Navigation comments
//!
//! Every PR in a stack carries one comment showing the whole stack as a tree.
//! The machine-readable part sits between two versioned HTML-comment
//! sentinels; everything else in the body (header, tree glyphs, anything the
//! platform adds) is presentation only.

mod parse;
mod render;
mod sync;

pub use parse::parse;
pub use render::render;
pub use sync::{decide, find_navigation_comment, sync_navigation_comment, CommentDecision};

/// Current wire format version
pub const SENTINEL_VERSION: u32 = 2;

/// Prefix shared by begin sentinels of every version
pub const BEGIN_SENTINEL_PREFIX: &str = "<!-- gt-stack:begin v";

/// Prefix shared by end sentinels of every version
pub const END_SENTINEL_PREFIX: &str = "<!-- gt-stack:end v";

const SENTINEL_SUFFIX: &str = " -->";

/// Header line rendered above the tree
pub const HEADER: &str = "### Stack";

/// Marker appended to the branch hosting the comment
pub const THIS_PR_MARKER: &str = "⬅️";

/// Placeholder for branches without a PR
pub const PR_PENDING: &str = "(PR pending)";

/// Body prefix used before sentinels existed
const LEGACY_PREFIX: &str = "### Stack\n";

/// Begin sentinel for the current version
pub fn begin_sentinel() -> String {
    format!("{BEGIN_SENTINEL_PREFIX}{SENTINEL_VERSION}{SENTINEL_SUFFIX}")
}

/// End sentinel for the current version
pub fn end_sentinel() -> String {
    format!("{END_SENTINEL_PREFIX}{SENTINEL_VERSION}{SENTINEL_SUFFIX}")
}

/// Whether a comment body is a navigation comment of any version
pub fn is_navigation_comment(body: &str) -> bool {
    body.contains(BEGIN_SENTINEL_PREFIX) || body.starts_with(LEGACY_PREFIX)
}
