//! Model-reply parser (reply format v1).
//!
//! Grammar, one recognizer per field, composed:
//!
//! ```text
//! reply       := no_issues | entry*
//! entry       := "###" header-line block*
//! header-line := [ "[Line " N "]" " - " ] "[" severity "]" " - " "[" category "]" " - " description
//! block       := explanation | code | fix
//! explanation := "Explanation:" text            (until next block or end)
//! code        := "Code:" fenced-diff-block
//! fix         := "Suggested Fix:" fenced-diff-block
//! ```
//!
//! Entries are split on lines beginning with `###` (the one canonical
//! delimiter; blank-line splitting would tear fenced blocks apart). Entries
//! whose header does not match are preserved as *unstructured* records —
//! nothing the model sends is silently dropped. Field markers may be bolded
//! (`**Code:**`) or plain (`Code:`); both spellings are recognized.

use lazy_static::lazy_static;
use regex::Regex;

use crate::review::template::PromptTemplate;

/// Severity vocabulary recognized in reply headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Maps a header label to a severity, honoring the template vocabulary.
    pub fn from_label(label: &str, template: &PromptTemplate) -> Option<Self> {
        let label = label.trim();
        if !template.severities.contains(&label) {
            return None;
        }
        match label {
            "Warning" => Some(Self::Warning),
            "Error" => Some(Self::Error),
            "Critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Critical => "Critical",
        }
    }
}

/// Where an issue points, as reported by the model and later rewritten by
/// the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLocation {
    /// 1-based line counted from the start of the hunk the model was shown.
    DiffRelativeLine(u32),
    /// 1-based line in the file at the head revision (resolver output).
    AbsoluteLine(u32),
    /// No line marker; surfaces as a file-level comment.
    Unresolved,
}

/// One parsed issue from the model reply.
///
/// Unstructured records (header did not match) carry the raw entry text in
/// `description` and `None` everywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub severity: Option<Severity>,
    pub category: Option<String>,
    pub description: String,
    pub explanation: Option<String>,
    pub code_excerpt: Option<String>,
    pub suggested_fix: Option<String>,
    pub location: IssueLocation,
}

impl IssueRecord {
    pub fn is_structured(&self) -> bool {
        self.severity.is_some()
    }
}

lazy_static! {
    /// Entry delimiter: a line starting with `###` (leading blanks allowed).
    static ref RE_ENTRY_SPLIT: Regex = Regex::new(r"(?m)^[ \t]*###").unwrap();

    /// Header line. Group 1: optional line number; 2: severity label;
    /// 3: category; 4: description tail.
    static ref RE_HEADER: Regex = Regex::new(
        r"^\s*\**\s*(?:\[Line\s*(\d+)\s*\]\s*-\s*)?\[([A-Za-z]+)\]\s*-\s*\[([^\]\n]+)\]\s*-\s*([^\n]+)"
    )
    .unwrap();

    /// `Code:` marker followed by a fenced ```diff block.
    static ref RE_CODE: Regex =
        Regex::new(r"(?s)\**Code:\**\s*```(?:diff)?[ \t]*\n(.*?)\n?```").unwrap();

    /// `Suggested Fix:` marker followed by a fenced ```diff block.
    static ref RE_FIX: Regex =
        Regex::new(r"(?s)\**Suggested\s+Fix:\**\s*```(?:diff)?[ \t]*\n(.*?)\n?```").unwrap();

    /// `Explanation:` free text, up to the next field marker or end of entry.
    static ref RE_EXPLANATION: Regex =
        Regex::new(r"(?s)\**Explanation:\**\s*(.*?)(?:\n\s*\**(?:Code|Suggested\s+Fix):|$)")
            .unwrap();
}

/// True when the reply is the designated no-findings terminal state.
///
/// The comparison strips *all* whitespace on both sides, so any whitespace
/// variant of the marker short-circuits parsing.
pub fn is_no_issues_reply(raw: &str, template: &PromptTemplate) -> bool {
    let squeeze = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    let raw = squeeze(raw);
    raw.is_empty() || raw.starts_with(&squeeze(template.no_issues_marker))
}

/// Parses the raw model reply into issue records.
///
/// Returns an empty vector for empty replies and for the no-issues marker.
/// Every `###` entry yields exactly zero (blank) or one record, so the
/// output length never exceeds the entry count.
pub fn parse_reply(raw: &str, template: &PromptTemplate) -> Vec<IssueRecord> {
    if is_no_issues_reply(raw, template) {
        return Vec::new();
    }

    let mut records = Vec::new();
    for entry in RE_ENTRY_SPLIT.split(raw.trim()) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        records.push(parse_entry(entry, template));
    }
    records
}

/// Parses a single entry, falling back to an unstructured record when the
/// header does not match the v1 grammar.
fn parse_entry(entry: &str, template: &PromptTemplate) -> IssueRecord {
    let Some(caps) = RE_HEADER.captures(entry) else {
        return unstructured(entry);
    };

    let severity = caps
        .get(2)
        .and_then(|m| Severity::from_label(m.as_str(), template));
    let Some(severity) = severity else {
        // Header-shaped but outside the vocabulary: keep the text verbatim.
        return unstructured(entry);
    };

    let location = match caps.get(1) {
        Some(n) => match n.as_str().parse::<u32>() {
            Ok(n) => IssueLocation::DiffRelativeLine(n),
            Err(_) => IssueLocation::Unresolved,
        },
        None => IssueLocation::Unresolved,
    };

    let category = caps.get(3).map(|m| m.as_str().trim().to_string());
    let description = caps
        .get(4)
        .map(|m| m.as_str().trim().trim_end_matches('*').trim().to_string())
        .unwrap_or_default();

    let explanation = RE_EXPLANATION
        .captures(entry)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    let code_excerpt = RE_CODE
        .captures(entry)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    let suggested_fix = RE_FIX
        .captures(entry)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    IssueRecord {
        severity: Some(severity),
        category,
        description,
        explanation,
        code_excerpt,
        suggested_fix,
        location,
    }
}

fn unstructured(entry: &str) -> IssueRecord {
    IssueRecord {
        severity: None,
        category: None,
        description: entry.to_string(),
        explanation: None,
        code_excerpt: None,
        suggested_fix: None,
        location: IssueLocation::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> PromptTemplate {
        PromptTemplate::default()
    }

    const FULL_ENTRY: &str = "\
### [Line 2] - [Error] - [Logical Error] - Wrong method name used when saving.

**Explanation:**
`saved()` does not exist on the model; the write silently never happens.

**Code:**
```diff
- await record.saved()
+ await record.save()
```

**Suggested Fix:**
```diff
+ await record.save()
```
";

    #[test]
    fn no_issues_marker_short_circuits() {
        let t = template();
        assert!(parse_reply("No critical issues found", &t).is_empty());
        assert!(parse_reply("  No   critical\nissues   found  ", &t).is_empty());
        assert!(parse_reply("Nocriticalissuesfound", &t).is_empty());
        assert!(parse_reply("", &t).is_empty());
    }

    #[test]
    fn marker_with_trailing_text_still_short_circuits() {
        let t = template();
        assert!(parse_reply("No critical issues found in this diff.", &t).is_empty());
    }

    #[test]
    fn full_entry_parses_every_field() {
        let records = parse_reply(FULL_ENTRY, &template());
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.severity, Some(Severity::Error));
        assert_eq!(r.category.as_deref(), Some("Logical Error"));
        assert_eq!(r.description, "Wrong method name used when saving.");
        assert_eq!(r.location, IssueLocation::DiffRelativeLine(2));
        assert!(r.explanation.as_deref().unwrap().contains("silently never happens"));
        assert_eq!(
            r.code_excerpt.as_deref(),
            Some("- await record.saved()\n+ await record.save()")
        );
        assert_eq!(r.suggested_fix.as_deref(), Some("+ await record.save()"));
    }

    #[test]
    fn entry_without_line_marker_is_unresolved_not_dropped() {
        let raw = "### [Warning] - [Style] - Function is doing too much.\n";
        let records = parse_reply(raw, &template());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, IssueLocation::Unresolved);
        assert_eq!(records[0].severity, Some(Severity::Warning));
    }

    #[test]
    fn malformed_entry_preserved_as_unstructured() {
        let raw = "### I could not follow the requested format, but this loop never terminates.\n";
        let records = parse_reply(raw, &template());
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_structured());
        assert!(records[0].description.contains("never terminates"));
        assert_eq!(records[0].location, IssueLocation::Unresolved);
    }

    #[test]
    fn unknown_severity_label_falls_back_to_unstructured() {
        let raw = "### [Line 3] - [Blocker] - [Style] - Not in the vocabulary.\n";
        let records = parse_reply(raw, &template());
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_structured());
    }

    #[test]
    fn record_count_never_exceeds_entry_count() {
        let raw = format!("{FULL_ENTRY}\n###\n\n### [Critical] - [Security] - Token logged.\n");
        let records = parse_reply(&raw, &template());
        // Three delimiters, one of them blank: two records.
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn missing_blocks_are_not_errors() {
        let raw = "### [Line 1] - [Critical] - [Security] - Secret committed.";
        let r = &parse_reply(raw, &template())[0];
        assert!(r.explanation.is_none());
        assert!(r.code_excerpt.is_none());
        assert!(r.suggested_fix.is_none());
    }

    #[test]
    fn plain_field_markers_recognized() {
        let raw = "### [Line 1] - [Warning] - [Perf] - Quadratic scan.\n\nCode:\n```diff\n+ for x in xs\n```\n";
        let r = &parse_reply(raw, &template())[0];
        assert_eq!(r.code_excerpt.as_deref(), Some("+ for x in xs"));
    }
}
