//! PR-description summary block.
//!
//! The generated summary lives in the PR body under a hidden HTML marker so
//! reruns replace the previous block instead of stacking new ones.

use lazy_static::lazy_static;
use regex::Regex;

/// Hidden marker delimiting the managed summary block in the PR body.
pub const SUMMARY_MARKER: &str = "<!-- pr-ai:summary -->";

lazy_static! {
    /// Everything from the marker to the end of the body is managed by us.
    static ref RE_SUMMARY_BLOCK: Regex =
        Regex::new(r"(?s)<!-- pr-ai:summary -->.*\z").unwrap();
}

/// Splices a fresh summary into the PR body.
///
/// Replaces the managed block when the marker is present; otherwise
/// prepends the block above the human-written description.
pub fn splice(current_body: Option<&str>, summary: &str) -> String {
    let block = format!("{SUMMARY_MARKER}\n## PR Summary\n\n{summary}");
    match current_body {
        Some(body) if body.contains(SUMMARY_MARKER) => {
            RE_SUMMARY_BLOCK.replace(body, block.as_str()).into_owned()
        }
        Some(body) if !body.trim().is_empty() => format!("{block}\n\n{body}"),
        _ => block,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_when_marker_absent() {
        let out = splice(Some("Human text."), "- Adds the widget.");
        assert!(out.starts_with(SUMMARY_MARKER));
        assert!(out.ends_with("Human text."));
        assert!(out.contains("- Adds the widget."));
    }

    #[test]
    fn replaces_existing_block() {
        let body = format!("Intro.\n\n{SUMMARY_MARKER}\n## PR Summary\n\n- Old item.");
        let out = splice(Some(&body), "- New item.");
        assert!(out.starts_with("Intro."));
        assert!(out.contains("- New item."));
        assert!(!out.contains("- Old item."));
        assert_eq!(out.matches(SUMMARY_MARKER).count(), 1);
    }

    #[test]
    fn empty_body_becomes_just_the_block() {
        let out = splice(None, "- Only item.");
        assert!(out.starts_with(SUMMARY_MARKER));
        assert!(out.contains("- Only item."));
    }
}
