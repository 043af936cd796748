//! Parsing a navigation comment back into a stack document

use super::{
    begin_sentinel, end_sentinel, BEGIN_SENTINEL_PREFIX, LEGACY_PREFIX, PR_PENDING,
    SENTINEL_SUFFIX, SENTINEL_VERSION, THIS_PR_MARKER,
};
use crate::error::{Error, Result};
use crate::stack::NEEDS_RESTACK;
use crate::types::{BranchNode, StackDocument};
use regex::Regex;
use std::sync::OnceLock;

/// Characters git forbids in ref names, plus whitespace
const INVALID_NAME_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

fn pr_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(#(\d+)\)$").expect("hardcoded suffix regex is valid"))
}

/// Parse the sentinel-delimited region of a comment body
///
/// Text outside the sentinels is ignored. A comment from another format
/// version is reported as [`Error::CommentParse`] so callers overwrite it.
pub fn parse(body: &str) -> Result<StackDocument> {
    let region = sentinel_region(body)?;

    let mut nodes = Vec::new();
    for line in region {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        nodes.push(parse_line(line, nodes.len())?);
    }

    if nodes.is_empty() {
        return Err(parse_error("no branches between sentinels"));
    }

    let current = nodes.iter().filter(|n| n.is_current).count();
    if current != 1 {
        return Err(parse_error(format!(
            "expected exactly one current branch, found {current}"
        )));
    }

    StackDocument::new(nodes).map_err(|e| parse_error(e.to_string()))
}

fn sentinel_region(body: &str) -> Result<Vec<&str>> {
    let begin = begin_sentinel();
    let end = end_sentinel();
    let mut lines = body.lines();

    loop {
        let Some(line) = lines.next() else {
            if body.starts_with(LEGACY_PREFIX) {
                return Err(parse_error("legacy format without sentinels"));
            }
            return Err(parse_error("begin sentinel not found"));
        };
        let line = line.trim();
        if line == begin {
            break;
        }
        if let Some(rest) = line.strip_prefix(BEGIN_SENTINEL_PREFIX) {
            let version = rest.strip_suffix(SENTINEL_SUFFIX).unwrap_or(rest);
            return Err(parse_error(format!(
                "unsupported version v{version} (expected v{SENTINEL_VERSION})"
            )));
        }
    }

    let mut region = Vec::new();
    for line in lines {
        if line.trim() == end {
            return Ok(region);
        }
        region.push(line);
    }
    Err(parse_error("end sentinel not found"))
}

fn parse_line(line: &str, position: usize) -> Result<BranchNode> {
    let content = line.trim_start_matches(|c: char| c.is_whitespace() || is_box_drawing(c));

    let (content, is_current) = match content
        .strip_prefix("**")
        .and_then(|c| c.strip_suffix("**"))
        .and_then(|c| c.trim_end().strip_suffix(THIS_PR_MARKER))
    {
        Some(inner) => (inner.trim(), true),
        None => (content.trim(), false),
    };

    let (content, needs_restack) = match content.strip_suffix(NEEDS_RESTACK) {
        Some(rest) => (rest.trim_end(), true),
        None => (content, false),
    };

    let (content, pr_number) = if let Some(rest) = content.strip_suffix(PR_PENDING) {
        (rest.trim_end(), None)
    } else if let Some(caps) = pr_suffix().captures(content) {
        let number = caps[1]
            .parse::<u64>()
            .map_err(|e| parse_error(format!("bad PR number in '{line}': {e}")))?;
        (&content[..caps.get(0).map_or(content.len(), |m| m.start())], Some(number))
    } else if position == 0 {
        (content, None)
    } else {
        return Err(parse_error(format!("no PR suffix on '{line}'")));
    };

    let (name, title) = match content.split_once(':') {
        Some((name, title)) => (name.trim(), title.trim()),
        None => (content.trim(), ""),
    };
    validate_name(name, line)?;

    if position == 0 && pr_number.is_some() {
        return Err(parse_error(format!("trunk '{name}' carries a PR number")));
    }

    let mut node = BranchNode::new(name, position);
    node.pr_number = pr_number;
    node.pr_title = title.to_string();
    node.is_current = is_current;
    node.needs_restack = needs_restack;
    Ok(node)
}

fn validate_name(name: &str, line: &str) -> Result<()> {
    if name.is_empty()
        || name.chars().any(|c| c.is_whitespace() || c.is_control())
        || name.contains(INVALID_NAME_CHARS)
        || name.contains("..")
    {
        return Err(parse_error(format!("invalid branch name in '{line}'")));
    }
    Ok(())
}

const fn is_box_drawing(c: char) -> bool {
    matches!(c, '\u{2500}'..='\u{257F}')
}

fn parse_error(msg: impl Into<String>) -> Error {
    Error::CommentParse(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::render;
    use crate::comment::render::tests::{sample_doc, sample_rendered};

    fn doc_of(branches: usize, current: usize) -> StackDocument {
        let titles = [
            "Fix \"quoted\" login",
            "Use `code` and **bold**",
            "Title with (#5) inside",
            "Colon: in title",
            "",
            "Trailing paren (x)",
            "Mixed 'quotes' and \"more\"",
            "[link](https://example.com)",
            "émoji ✨ title",
            "plain",
        ];
        let mut nodes = vec![BranchNode::new("main", 0)];
        for i in 1..=branches {
            let mut node = BranchNode::new(format!("user/feat-{i}"), i);
            if i % 3 != 0 {
                node.pr_number = Some(100 + i as u64);
            }
            node.pr_title = titles[(i - 1) % titles.len()].to_string();
            nodes.push(node);
        }
        let name = nodes[current].name.clone();
        StackDocument::new(nodes).unwrap().with_current(&name)
    }

    #[test]
    fn test_round_trip_one_to_ten_branches() {
        for len in 1..=10 {
            for current in 0..=len {
                let doc = doc_of(len, current);
                let name = doc.nodes()[current].name.clone();
                let body = render(&doc, &name);
                assert_eq!(parse(&body).unwrap(), doc, "len {len} current {current}\n{body}");
            }
        }
    }

    #[test]
    fn test_text_outside_sentinels_is_ignored() {
        let body = format!(
            "Reviewer note: ├─ bogus (#9)\n\n{}\n\n◉ trailing junk\n",
            sample_rendered()
        );
        assert_eq!(parse(&body).unwrap(), sample_doc());
    }

    #[test]
    fn test_needs_restack_annotation_is_stripped() {
        let body = sample_rendered().replace(
            "feat-a: Fix login bug (#101)",
            "feat-a: Fix login bug (#101) (needs restack)",
        );
        let doc = parse(&body).unwrap();
        let node = doc.get("feat-a").unwrap();
        assert!(node.needs_restack);
        assert_eq!(node.pr_title, "Fix login bug");
        assert_eq!(node.pr_number, Some(101));
    }

    #[test]
    fn test_other_version_is_rejected() {
        let body = sample_rendered()
            .replace("begin v2", "begin v1")
            .replace("end v2", "end v1");
        let err = parse(&body).unwrap_err();
        assert!(err.to_string().contains("unsupported version v1"));
    }

    #[test]
    fn test_legacy_format_is_rejected() {
        let err = parse("### Stack\n- Fix login (#1)\n").unwrap_err();
        assert!(matches!(err, Error::CommentParse(_)));
    }

    #[test]
    fn test_missing_end_sentinel() {
        let body = sample_rendered().replace("<!-- gt-stack:end v2 -->", "");
        assert!(parse(&body).unwrap_err().to_string().contains("end sentinel"));
    }

    #[test]
    fn test_empty_region() {
        let body = "<!-- gt-stack:begin v2 -->\n### Stack\n<!-- gt-stack:end v2 -->";
        assert!(parse(body).is_err());
    }

    #[test]
    fn test_requires_exactly_one_current() {
        let none = sample_rendered().replace("**feat-b: Add validation (#102) ⬅️**", "feat-b: Add validation (#102)");
        assert!(parse(&none).is_err());

        let two = sample_rendered().replace("feat-c (PR pending)", "**feat-c (PR pending) ⬅️**");
        assert!(parse(&two).is_err());
    }

    #[test]
    fn test_trunk_with_pr_is_rejected() {
        let body = sample_rendered().replace("\nmain\n", "\nmain (#1)\n");
        assert!(parse(&body).unwrap_err().to_string().contains("trunk"));
    }

    #[test]
    fn test_invalid_branch_name_is_rejected() {
        let body = sample_rendered().replace("feat-c (PR pending)", "feat c (PR pending)");
        assert!(parse(&body).unwrap_err().to_string().contains("invalid branch name"));
    }
}
