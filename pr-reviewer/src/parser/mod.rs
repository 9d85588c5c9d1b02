//! Unified-diff segmenter.
//!
//! Features:
//! - Works even if file headers (---/+++) are missing (hunks-only input).
//! - Ignores `\ No newline at end of file` marker lines.
//! - Binary patch heuristics (`GIT binary patch`, `Binary files ... differ`).
//!
//! Output is a sequence of [`DiffChunk`]s — one hunk per chunk, in file
//! order — each independently reviewable and safe to enumerate repeatedly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ParseError;

/// Classification of a single line inside a diff hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLineKind {
    Added,
    Removed,
    Context,
}

/// One line of a diff hunk: its classification plus the text without the
/// leading `+`/`-`/space marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub text: String,
}

/// A diff hunk (continuous block of changes).
///
/// Invariants upheld by [`segment`]:
/// - `new_start >= 1` (pure-deletion hunks with `+0,0` are dropped);
/// - the count of context+added lines equals `new_lines` for well-formed
///   input (checked in tests, not enforced at parse time — providers
///   occasionally emit sloppy counts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// Number of lines this hunk occupies on the new side of the file.
    pub fn new_side_line_count(&self) -> u32 {
        self.lines
            .iter()
            .filter(|l| matches!(l.kind, DiffLineKind::Added | DiffLineKind::Context))
            .count() as u32
    }

    /// Renders the hunk back into unified-diff text (header plus prefixed
    /// lines). Line texts round-trip exactly; context lines are normalized
    /// to a leading space.
    pub fn to_unified(&self) -> String {
        let mut s = format!(
            "@@ -{},{} +{},{} @@\n",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        );
        for line in &self.lines {
            let prefix = match line.kind {
                DiffLineKind::Added => '+',
                DiffLineKind::Removed => '-',
                DiffLineKind::Context => ' ',
            };
            s.push(prefix);
            s.push_str(&line.text);
            s.push('\n');
        }
        s
    }
}

/// One independently reviewable unit of change. Immutable once produced.
///
/// The default chunking policy is one hunk per chunk, which bounds each
/// model request to a locally coherent change and keeps line-offset math
/// tractable per chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffChunk {
    pub hunks: Vec<DiffHunk>,
}

impl DiffChunk {
    /// The hunk whose header anchors line-offset math for this chunk.
    pub fn anchor_hunk(&self) -> Option<&DiffHunk> {
        self.hunks.first()
    }

    /// Renders all hunks back into unified-diff text.
    pub fn to_unified(&self) -> String {
        self.hunks.iter().map(DiffHunk::to_unified).collect()
    }
}

/// Diff payload handed to the prompt builder: either raw provider text or
/// an already-segmented chunk. One code path per variant, no shape sniffing.
#[derive(Debug, Clone)]
pub enum DiffPayload {
    RawText(String),
    Chunk(DiffChunk),
}

impl DiffPayload {
    /// Unified-diff text of the payload, whichever variant it is.
    pub fn as_unified(&self) -> String {
        match self {
            DiffPayload::RawText(s) => s.clone(),
            DiffPayload::Chunk(c) => c.to_unified(),
        }
    }
}

/// Segments unified-diff text for one file into reviewable chunks.
///
/// Empty or hunk-free input yields an empty vector — "no changes" is not an
/// error. Prelude lines before the first `@@` header are skipped, as are
/// `\ No newline at end of file` markers. Returns an owned, re-enumerable
/// sequence with no side effects.
pub fn segment(diff_text: &str) -> Vec<DiffChunk> {
    let hunks = parse_unified_diff(diff_text);
    hunks
        .into_iter()
        .map(|h| DiffChunk { hunks: vec![h] })
        .collect()
}

/// Parses unified diff text into hunks. Only `@@` headers are required;
/// file headers are optional.
pub fn parse_unified_diff(s: &str) -> Vec<DiffHunk> {
    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut current: Option<DiffHunk> = None;

    for line in s.lines() {
        if line.starts_with("@@") {
            flush_hunk(&mut hunks, current.take());
            match parse_hunk_header(line) {
                Ok(h) => current = Some(h),
                Err(e) => {
                    debug!("segment: {e}, skipped");
                }
            }
            continue;
        }

        // "\ No newline at end of file" is metadata, not diff content.
        if line.starts_with("\\ ") {
            continue;
        }

        let Some(hunk) = current.as_mut() else {
            // Prelude (diff --git, ---/+++ headers) before the first @@.
            continue;
        };

        let (kind, text) = if let Some(rest) = line.strip_prefix('+') {
            (DiffLineKind::Added, rest)
        } else if let Some(rest) = line.strip_prefix('-') {
            (DiffLineKind::Removed, rest)
        } else if let Some(rest) = line.strip_prefix(' ') {
            (DiffLineKind::Context, rest)
        } else {
            // Weird unprefixed line: treat as context.
            (DiffLineKind::Context, line)
        };
        hunk.lines.push(DiffLine { kind, text: text.to_string() });
    }

    flush_hunk(&mut hunks, current.take());
    hunks
}

fn flush_hunk(hunks: &mut Vec<DiffHunk>, hunk: Option<DiffHunk>) {
    match hunk {
        Some(h) if h.lines.is_empty() => {}
        Some(h) if h.new_start == 0 => {
            // Pure deletion: nothing on the new side to anchor a comment to.
            debug!("segment: dropping pure-deletion hunk -{},{}", h.old_start, h.old_lines);
        }
        Some(h) => hunks.push(h),
        None => {}
    }
}

/// Parses a `@@ -oldStart,oldLen +newStart,newLen @@` header into an empty
/// hunk. Trailing section headings after the closing `@@` are ignored.
fn parse_hunk_header(line: &str) -> Result<DiffHunk, ParseError> {
    try_parse_hunk_header(line).ok_or_else(|| ParseError::InvalidHunkHeader(line.to_string()))
}

fn try_parse_hunk_header(line: &str) -> Option<DiffHunk> {
    let inner = line.strip_prefix("@@")?;
    let (ranges, _heading) = inner.split_once("@@")?;
    let mut parts = ranges.split_whitespace();
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    let (old_start, old_lines) = split_nums(old)?;
    let (new_start, new_lines) = split_nums(new)?;
    Some(DiffHunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
        lines: Vec::new(),
    })
}

/// Splits "12,7" or "12" into (start, len). A missing length means 1 in the
/// unified-diff format.
fn split_nums(s: &str) -> Option<(u32, u32)> {
    if let Some((a, b)) = s.split_once(',') {
        Some((a.parse().ok()?, b.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

/// Simple heuristic to detect binary patches or messages in unified diff.
pub fn looks_like_binary_patch(s: &str) -> bool {
    s.contains("GIT binary patch")
        || s.starts_with("Binary files ")
        || (s.starts_with("Files ") && s.contains(" differ"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_HUNKS: &str = "\
diff --git a/src/app.py b/src/app.py
--- a/src/app.py
+++ b/src/app.py
@@ -10,3 +12,4 @@ def handler():
 context line
-removed line
+added line one
+added line two
 trailing context
@@ -30,2 +33,2 @@
 keep
-old
+new
";

    #[test]
    fn one_hunk_per_chunk_in_order() {
        let chunks = segment(TWO_HUNKS);
        assert_eq!(chunks.len(), 2);
        let first = chunks[0].anchor_hunk().unwrap();
        assert_eq!((first.old_start, first.old_lines), (10, 3));
        assert_eq!((first.new_start, first.new_lines), (12, 4));
        let second = chunks[1].anchor_hunk().unwrap();
        assert_eq!(second.new_start, 33);
    }

    #[test]
    fn line_kinds_classified() {
        let chunks = segment(TWO_HUNKS);
        let lines = &chunks[0].hunks[0].lines;
        assert_eq!(lines[0].kind, DiffLineKind::Context);
        assert_eq!(lines[1].kind, DiffLineKind::Removed);
        assert_eq!(lines[2].kind, DiffLineKind::Added);
        assert_eq!(lines[2].text, "added line one");
        assert_eq!(lines[4].kind, DiffLineKind::Context);
    }

    #[test]
    fn new_side_count_matches_header() {
        let chunks = segment(TWO_HUNKS);
        for chunk in &chunks {
            let h = chunk.anchor_hunk().unwrap();
            assert_eq!(h.new_side_line_count(), h.new_lines);
        }
    }

    #[test]
    fn malformed_header_reports_invalid_and_is_skipped() {
        let err = parse_hunk_header("@@ not a range @@").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHunkHeader(_)));
        // Segmentation carries on with the hunks that do parse.
        let chunks = segment("@@ not a range @@\n+x\n@@ -1,1 +1,1 @@\n+y\n");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].anchor_hunk().unwrap().new_start, 1);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(segment("").is_empty());
        assert!(segment("no hunks here\njust text\n").is_empty());
    }

    #[test]
    fn round_trips_hunk_lines() {
        let hunks = parse_unified_diff(TWO_HUNKS);
        let rendered: String = hunks.iter().map(DiffHunk::to_unified).collect();
        let reparsed = parse_unified_diff(&rendered);
        assert_eq!(hunks, reparsed);
        // Line texts reproduce the original content exactly.
        assert!(rendered.contains("+added line one\n"));
        assert!(rendered.contains("-removed line\n"));
        assert!(rendered.contains(" trailing context\n"));
    }

    #[test]
    fn no_newline_marker_ignored() {
        let diff = "@@ -1,1 +1,1 @@\n-old\n+new\n\\ No newline at end of file\n";
        let hunks = parse_unified_diff(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].lines.len(), 2);
    }

    #[test]
    fn single_line_ranges_default_to_length_one() {
        let diff = "@@ -3 +4 @@\n-old\n+new\n";
        let hunks = parse_unified_diff(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!((hunks[0].old_start, hunks[0].old_lines), (3, 1));
        assert_eq!((hunks[0].new_start, hunks[0].new_lines), (4, 1));
    }

    #[test]
    fn pure_deletion_hunk_dropped() {
        let diff = "@@ -1,3 +0,0 @@\n-a\n-b\n-c\n";
        assert!(segment(diff).is_empty());
    }

    #[test]
    fn binary_patch_heuristics() {
        assert!(looks_like_binary_patch("Binary files a/x.png and b/x.png differ"));
        assert!(!looks_like_binary_patch(TWO_HUNKS));
    }
}
