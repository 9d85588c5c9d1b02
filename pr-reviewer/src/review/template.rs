//! Prompt template and request builder.
//!
//! [`PromptTemplate`] is the single immutable source of truth for the wire
//! format shared by the prompt and the reply parser: the no-issues marker,
//! the severity vocabulary, and the reply format version. Both sides are
//! injected with the same value so they can never drift apart.
//!
//! Prompt construction is pure text production — the template never
//! executes the model call.

use crate::parser::DiffPayload;

/// Reply format understood by the parser in `review::reply`.
///
/// v1: entries delimited by `###` headings; header line
/// `[Line N] - [Severity] - [Category] - description` with `[Line N]`
/// optional; optional `Explanation:` text and `Code:` / `Suggested Fix:`
/// fenced ```diff blocks.
pub const REPLY_FORMAT_VERSION: u32 = 1;

/// Immutable wire-format configuration shared by builder and parser.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Literal the model must return verbatim when nothing is worth
    /// flagging. Compared whitespace-insensitively on the way back.
    pub no_issues_marker: &'static str,
    /// Recognized severity labels, ordered least to most severe.
    pub severities: [&'static str; 3],
    /// Version stamp for the reply grammar.
    pub format_version: u32,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            no_issues_marker: "No critical issues found",
            severities: ["Warning", "Error", "Critical"],
            format_version: REPLY_FORMAT_VERSION,
        }
    }
}

impl PromptTemplate {
    /// System text sent alongside every review prompt.
    pub fn system_text(&self) -> String {
        "You are an AI code reviewer with expertise in multiple programming languages. \
         You analyze Git diffs and identify errors, security issues, performance \
         bottlenecks, and bad practices."
            .to_string()
    }

    /// Builds the review prompt for one file and one diff payload.
    ///
    /// Deterministic: the same inputs always render the same string.
    pub fn build_review_prompt(&self, file_content: &str, payload: &DiffPayload) -> String {
        let mut s = String::new();
        s.push_str("Review the following changes. Your review is strictly limited to the ");
        s.push_str("lines highlighted in the diff; the full file is shown only for context.\n");
        s.push_str("\n# Review guidelines\n");
        s.push_str("- Focus on meaningful structural changes, ignoring formatting or comments.\n");
        s.push_str("- Provide clear explanations and actionable suggestions.\n");
        s.push_str(&format!(
            "- Categorize issues by severity: {}.\n",
            self.severities.join(", ")
        ));
        s.push_str(&format!(
            "- If the change introduces no new problems, respond with \"{}\" and nothing else.\n",
            self.no_issues_marker
        ));
        s.push_str("\n# Output format\n");
        s.push_str("Report each issue as one entry starting with a `###` heading line:\n\n");
        s.push_str("### [Line {line_number}] - [{severity}] - [{category}] - {description}\n\n");
        s.push_str("where {line_number} counts from 1 at the first line of the diff hunk ");
        s.push_str("you are shown. Omit `[Line N]` for remarks about the file as a whole.\n");
        s.push_str("After the heading you may add:\n\n");
        s.push_str("**Explanation:**\n{explanation}\n\n");
        s.push_str("**Code:**\n```diff\n{code}\n```\n\n");
        s.push_str("**Suggested Fix:**\n```diff\n{suggested_fix}\n```\n");
        s.push_str("\n# Diff under review\n```diff\n");
        s.push_str(&payload.as_unified());
        s.push_str("```\n");
        s.push_str("\n# Full file (context only)\n```\n");
        s.push_str(file_content);
        if !file_content.ends_with('\n') {
            s.push('\n');
        }
        s.push_str("```\n");
        s
    }

    /// Builds the prompt used to refresh the PR-description summary.
    pub fn build_summary_prompt(&self, file_changes: &[(String, String)]) -> String {
        let mut s = String::new();
        s.push_str("Write a short summary of this pull request for its description.\n");
        s.push_str("- One bullet per file, strong verbs, no filler.\n");
        s.push_str("- Mention the main action and the affected component.\n");
        s.push_str("\n# Changed files\n");
        for (path, snippet) in file_changes {
            s.push_str(&format!("\n## {path}\n```\n{snippet}\n```\n"));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DiffChunk, DiffPayload, segment};

    fn chunk() -> DiffChunk {
        segment("@@ -1,2 +1,3 @@\n context\n+added\n context2\n")
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn prompt_is_deterministic() {
        let t = PromptTemplate::default();
        let payload = DiffPayload::Chunk(chunk());
        let a = t.build_review_prompt("fn main() {}\n", &payload);
        let b = t.build_review_prompt("fn main() {}\n", &payload);
        assert_eq!(a, b);
    }

    #[test]
    fn prompt_carries_marker_vocab_and_diff() {
        let t = PromptTemplate::default();
        let payload = DiffPayload::Chunk(chunk());
        let p = t.build_review_prompt("fn main() {}\n", &payload);
        assert!(p.contains(t.no_issues_marker));
        assert!(p.contains("Warning, Error, Critical"));
        assert!(p.contains("+added"));
        assert!(p.contains("fn main() {}"));
    }

    #[test]
    fn raw_text_payload_uses_same_path() {
        let t = PromptTemplate::default();
        let raw = DiffPayload::RawText("@@ -1,1 +1,1 @@\n-x\n+y\n".into());
        let p = t.build_review_prompt("y\n", &raw);
        assert!(p.contains("+y"));
    }
}
