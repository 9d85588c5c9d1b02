//! Terminal comment artifact and its byte-stable markdown rendering.
//!
//! The duplicate gate compares fully rendered bodies across runs, so
//! rendering must be deterministic down to the byte: fixed header line,
//! fixed block order, fenced ```diff blocks for code and fix.

use crate::review::reply::{IssueLocation, IssueRecord};

/// A comment ready to hand to the posting collaborator.
///
/// `line == None` means a general (file-level) comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub file_path: String,
    pub line: Option<u32>,
    pub body: String,
}

impl Comment {
    /// Renders a resolved issue record into its final posted form.
    pub fn from_record(record: &IssueRecord, file_path: &str) -> Self {
        let line = match record.location {
            IssueLocation::AbsoluteLine(n) => Some(n),
            IssueLocation::DiffRelativeLine(_) | IssueLocation::Unresolved => None,
        };
        Self {
            file_path: file_path.to_string(),
            line,
            body: render_body(record),
        }
    }
}

/// Renders the markdown body for one record.
///
/// Structured records get a `### [Severity] - [Category]` header, the
/// description, then the optional explanation / code / fix blocks in fixed
/// order. Unstructured records are passed through verbatim (trimmed).
pub fn render_body(record: &IssueRecord) -> String {
    let Some(severity) = record.severity else {
        return record.description.trim().to_string();
    };

    let category = record.category.as_deref().unwrap_or("General");
    let mut s = format!("### [{}] - [{}]\n\n{}", severity.as_str(), category, record.description);

    if let Some(explanation) = &record.explanation {
        s.push_str("\n\n**Explanation:**\n");
        s.push_str(explanation);
    }
    if let Some(code) = &record.code_excerpt {
        s.push_str("\n\n**Code:**\n```diff\n");
        s.push_str(code);
        s.push_str("\n```");
    }
    if let Some(fix) = &record.suggested_fix {
        s.push_str("\n\n**Suggested Fix:**\n```diff\n");
        s.push_str(fix);
        s.push_str("\n```");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::reply::{IssueLocation, Severity};

    fn record() -> IssueRecord {
        IssueRecord {
            severity: Some(Severity::Critical),
            category: Some("Security".into()),
            description: "Token written to logs.".into(),
            explanation: Some("Anyone with log access can read it.".into()),
            code_excerpt: Some("+ log.info(token)".into()),
            suggested_fix: Some("- log.info(token)".into()),
            location: IssueLocation::AbsoluteLine(13),
        }
    }

    #[test]
    fn rendering_is_byte_stable() {
        let r = record();
        assert_eq!(render_body(&r), render_body(&r));
    }

    #[test]
    fn rendered_body_keeps_the_three_literal_components() {
        let body = render_body(&record());
        assert!(body.starts_with("### [Critical] - [Security]"));
        assert!(body.contains("**Code:**\n```diff\n+ log.info(token)\n```"));
        assert!(body.contains("**Suggested Fix:**\n```diff\n- log.info(token)\n```"));
    }

    #[test]
    fn absolute_line_becomes_inline_placement() {
        let c = Comment::from_record(&record(), "src/auth.rs");
        assert_eq!(c.line, Some(13));
        assert_eq!(c.file_path, "src/auth.rs");
    }

    #[test]
    fn unresolved_record_becomes_file_level_comment() {
        let mut r = record();
        r.location = IssueLocation::Unresolved;
        let c = Comment::from_record(&r, "src/auth.rs");
        assert_eq!(c.line, None);
    }

    #[test]
    fn unstructured_record_rendered_verbatim() {
        let r = IssueRecord {
            severity: None,
            category: None,
            description: "  free-form remark  ".into(),
            explanation: None,
            code_excerpt: None,
            suggested_fix: None,
            location: IssueLocation::Unresolved,
        };
        assert_eq!(render_body(&r), "free-form remark");
    }
}
