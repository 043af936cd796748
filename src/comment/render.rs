//! Rendering a stack document into a comment body

use super::{begin_sentinel, end_sentinel, HEADER, PR_PENDING, THIS_PR_MARKER};
use crate::types::{BranchNode, StackDocument};
use std::fmt::Write;

/// Render the navigation comment for `current`
///
/// Output is byte-stable for an unchanged document, which is what lets the
/// synchronizer skip redundant writes.
pub fn render(doc: &StackDocument, current: &str) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "{}", begin_sentinel());
    let _ = writeln!(body, "{HEADER}");
    let _ = writeln!(body, "{}", line_content(doc.trunk(), current));

    let tip = doc.len() - 1;
    for node in doc.branches() {
        let corner = if node.position == tip { '└' } else { '├' };
        let _ = writeln!(
            body,
            "{corner}{} {}",
            "─".repeat(node.position),
            line_content(node, current)
        );
    }

    let _ = write!(body, "{}", end_sentinel());
    body
}

fn line_content(node: &BranchNode, current: &str) -> String {
    let mut content = node.name.clone();

    if !node.is_trunk() {
        let title = single_line(&node.pr_title);
        if !title.is_empty() {
            let _ = write!(content, ": {title}");
        }
        match node.pr_number {
            Some(n) => {
                let _ = write!(content, " (#{n})");
            }
            None => {
                let _ = write!(content, " {PR_PENDING}");
            }
        }
    }

    if node.name == current {
        format!("**{content} {THIS_PR_MARKER}**")
    } else {
        content
    }
}

fn single_line(title: &str) -> String {
    title.replace(['\r', '\n'], " ").trim().to_string()
}
