//! Grammar for the stacking tool's stack listing
//!
//! `ls --stack --reverse` prints one branch per line, trunk first:
//!
//! ```text
//! ◯ main
//! ◯ feature_a (needs restack)
//! ◉ feature_b
//! ```
//!
//! `◉` marks the checked-out branch. Any line outside this grammar is an
//! error rather than something to skip.

use crate::error::{Error, Result};
use crate::types::{BranchNode, StackDocument};
use regex::Regex;
use std::sync::OnceLock;

/// Annotation the tool appends to branches whose parent moved
pub const NEEDS_RESTACK: &str = "(needs restack)";

const CURRENT_MARKER: char = '◉';

/// Glyphs the tool only draws when a stack forks
const FORK_GLYPHS: &[&str] = &["│", "─┐", "┘"];

/// First line of an upgrade banner
const BANNER_START: &str = "CLI version you have installed";
/// Last line of an upgrade banner
const BANNER_END: &str = "- Team ";

fn branch_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<marker>[◯◉])\s+(?P<name>\S+)(?P<rest>.*)$")
            .expect("hardcoded listing regex is valid")
    })
}

/// Remove upgrade banners the tool prints around its real output
pub fn strip_banners(output: &str) -> String {
    let mut kept = Vec::new();
    let mut in_banner = false;

    for line in output.lines() {
        if !in_banner && line.contains(BANNER_START) {
            in_banner = true;
        }
        if in_banner {
            if line.trim_start().starts_with(BANNER_END) {
                in_banner = false;
            }
            continue;
        }
        kept.push(line);
    }

    kept.join("\n").trim().to_string()
}

/// Parse listing output into a document; `trunk` must be the first entry
pub fn parse_listing(output: &str, trunk: &str) -> Result<StackDocument> {
    let cleaned = strip_banners(output);
    let mut nodes: Vec<BranchNode> = Vec::new();

    for (lineno, raw) in cleaned.lines().enumerate() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if FORK_GLYPHS.iter().any(|g| line.contains(g)) {
            return Err(Error::ListingParse(format!(
                "the stack forks at line {}; only linear stacks are supported",
                lineno + 1
            )));
        }

        // Terminal wrapping can push the annotation onto its own line
        if line.trim() == NEEDS_RESTACK {
            let prev = nodes.last_mut().ok_or_else(|| {
                Error::ListingParse(format!("'{NEEDS_RESTACK}' before any branch"))
            })?;
            prev.needs_restack = true;
            continue;
        }

        let caps = branch_line().captures(line).ok_or_else(|| {
            Error::ListingParse(format!("unrecognized line {}: '{line}'", lineno + 1))
        })?;

        let rest = caps["rest"].trim();
        let needs_restack = match rest {
            "" => false,
            NEEDS_RESTACK => true,
            other => {
                return Err(Error::ListingParse(format!(
                    "unrecognized annotation '{other}' on line {}",
                    lineno + 1
                )));
            }
        };

        let mut node = BranchNode::new(&caps["name"], nodes.len());
        node.is_current = caps["marker"].starts_with(CURRENT_MARKER);
        node.needs_restack = needs_restack;
        nodes.push(node);
    }

    match nodes.first() {
        None => return Err(Error::ListingParse("no branches listed".to_string())),
        Some(first) if first.name != trunk => {
            return Err(Error::ListingParse(format!(
                "expected trunk '{trunk}' first, found '{}'",
                first.name
            )));
        }
        Some(_) => {}
    }
    nodes[0].needs_restack = false;

    StackDocument::new(nodes).map_err(|e| Error::ListingParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANNER: &str = "ℹ️ The Graphite CLI version you have installed (1.4.3) is below the stable version (1.6.1).
🍺 If you installed with brew, update with: `brew upgrade`,
🔄 For more details: https://graphite.dev/docs/update-cli
- Team Graphite :)";

    fn branch_names(doc: &StackDocument) -> Vec<&str> {
        doc.nodes().iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_parse_simple_listing() {
        let doc = parse_listing("◯ main\n◯ feature_a\n◉ feature.b\n", "main").unwrap();
        assert_eq!(branch_names(&doc), ["main", "feature_a", "feature.b"]);
        assert_eq!(doc.current().unwrap().name, "feature.b");
        assert_eq!(doc.get("feature_a").unwrap().position, 1);
    }

    #[test]
    fn test_needs_restack_is_stripped_from_name() {
        let out = "◯  main\n◉  clay/09-03-feat_add_admin_ui (needs restack)\n◯ user/fix-2";
        let doc = parse_listing(out, "main").unwrap();
        let node = doc.get("clay/09-03-feat_add_admin_ui").unwrap();
        assert!(node.needs_restack);
        assert!(!doc.get("user/fix-2").unwrap().needs_restack);
    }

    #[test]
    fn test_wrapped_needs_restack_applies_to_previous_branch() {
        let out = "◯ main\n◯ user/feature-branch-1\n  (needs restack)\n◯ fix_critical_bug";
        let doc = parse_listing(out, "main").unwrap();
        assert_eq!(branch_names(&doc), ["main", "user/feature-branch-1", "fix_critical_bug"]);
        assert!(doc.get("user/feature-branch-1").unwrap().needs_restack);
        assert!(!doc.get("fix_critical_bug").unwrap().needs_restack);
    }

    #[test]
    fn test_fork_is_rejected() {
        let out = "◯ main\n│ ◯ other\n◯─┘\n◯ a";
        assert!(matches!(
            parse_listing(out, "main"),
            Err(Error::ListingParse(_))
        ));
    }

    #[test]
    fn test_unknown_line_is_rejected() {
        let out = "◯ main\nsomething odd\n◯ a";
        let err = parse_listing(out, "main").unwrap_err();
        assert!(err.to_string().contains("something odd"));
    }

    #[test]
    fn test_unknown_annotation_is_rejected() {
        assert!(parse_listing("◯ main\n◯ a (frozen)", "main").is_err());
    }

    #[test]
    fn test_trunk_must_come_first() {
        assert!(parse_listing("◯ a\n◯ main", "main").is_err());
        assert!(parse_listing("", "main").is_err());
    }

    #[test]
    fn test_banner_is_removed_before_parsing() {
        let out = format!("{BANNER}\n  ◯ main\n  ◉ feature_a\n");
        let doc = parse_listing(&out, "main").unwrap();
        assert_eq!(branch_names(&doc), ["main", "feature_a"]);
    }

    #[test]
    fn test_strip_banners_keeps_surrounding_output() {
        let out = format!("before\n{BANNER}\nafter\n{BANNER}\nlast");
        assert_eq!(strip_banners(&out), "before\nafter\nlast");
        assert_eq!(strip_banners(BANNER), "");
        assert_eq!(strip_banners(""), "");
    }
}
