//! Line resolver: hunk-relative line references to file-absolute lines.
//!
//! The model numbers lines starting at 1 within the hunk it was shown, so
//! the file-absolute line is `new_start + reported - 1`. References outside
//! `[1, total_file_lines]` are rejected; a chunk without a parsed hunk
//! header rejects its whole batch (fail closed — never guess a position).

use tracing::warn;

use crate::errors::{ParseError, ReviewResult};
use crate::parser::DiffChunk;
use crate::review::reply::{IssueLocation, IssueRecord};

/// Why a single record was dropped during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Reported line was not a positive integer.
    NonPositiveLine,
    /// Computed absolute line falls outside `[1, total_file_lines]`.
    OutOfRange { absolute: u64, total: u32 },
}

/// Resolves one record's location against the chunk's anchor hunk.
///
/// - `DiffRelativeLine(n)` is rewritten to `AbsoluteLine(new_start + n - 1)`
///   when in bounds, rejected otherwise.
/// - `AbsoluteLine(n)` is bounds-checked and passed through.
/// - `Unresolved` passes through untouched (file-level comment downstream).
pub fn resolve_record(
    mut record: IssueRecord,
    new_start: u32,
    total_file_lines: u32,
) -> Result<IssueRecord, RejectReason> {
    match record.location {
        IssueLocation::DiffRelativeLine(n) => {
            if n == 0 {
                return Err(RejectReason::NonPositiveLine);
            }
            // Widened before adding: `n` comes straight from the model and
            // may be anything up to u32::MAX, which must reject, not wrap.
            let absolute = u64::from(new_start) + u64::from(n) - 1;
            if absolute < 1 || absolute > u64::from(total_file_lines) {
                return Err(RejectReason::OutOfRange { absolute, total: total_file_lines });
            }
            record.location = IssueLocation::AbsoluteLine(absolute as u32);
            Ok(record)
        }
        IssueLocation::AbsoluteLine(n) => {
            if n < 1 || n > total_file_lines {
                return Err(RejectReason::OutOfRange { absolute: n.into(), total: total_file_lines });
            }
            Ok(record)
        }
        IssueLocation::Unresolved => Ok(record),
    }
}

/// Resolves a chunk's whole batch of records.
///
/// Returns `Err(ParseError::MissingHunkContext)` when the chunk carries no
/// hunk header — the entire batch is discarded rather than positioned by
/// guesswork. Individual rejections are logged and skipped; the rest of the
/// batch proceeds.
pub fn resolve_batch(
    records: Vec<IssueRecord>,
    chunk: &DiffChunk,
    total_file_lines: u32,
) -> ReviewResult<Vec<IssueRecord>> {
    let anchor = chunk
        .anchor_hunk()
        .ok_or(ParseError::MissingHunkContext)?;

    let mut resolved = Vec::with_capacity(records.len());
    for record in records {
        match resolve_record(record, anchor.new_start, total_file_lines) {
            Ok(r) => resolved.push(r),
            Err(reason) => {
                warn!(?reason, "resolve: dropping record with unresolvable location");
            }
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::segment;
    use crate::review::reply::{IssueLocation, IssueRecord, Severity};

    fn record(location: IssueLocation) -> IssueRecord {
        IssueRecord {
            severity: Some(Severity::Warning),
            category: Some("Test".into()),
            description: "d".into(),
            explanation: None,
            code_excerpt: None,
            suggested_fix: None,
            location,
        }
    }

    #[test]
    fn hunk_relative_line_two_lands_on_thirteen() {
        // Hunk header @@ -10,3 +12,4 @@ with model-reported [Line 2].
        let r = resolve_record(record(IssueLocation::DiffRelativeLine(2)), 12, 100).unwrap();
        assert_eq!(r.location, IssueLocation::AbsoluteLine(13));
    }

    #[test]
    fn zero_line_rejected() {
        let err = resolve_record(record(IssueLocation::DiffRelativeLine(0)), 12, 100).unwrap_err();
        assert_eq!(err, RejectReason::NonPositiveLine);
    }

    #[test]
    fn beyond_file_end_rejected() {
        let err = resolve_record(record(IssueLocation::DiffRelativeLine(5)), 98, 100).unwrap_err();
        assert_eq!(err, RejectReason::OutOfRange { absolute: 102, total: 100 });
    }

    #[test]
    fn huge_reported_line_rejected_not_wrapped() {
        // u32 addition would wrap 12 + (u32::MAX - 1) back into bounds.
        let err =
            resolve_record(record(IssueLocation::DiffRelativeLine(u32::MAX)), 12, 100).unwrap_err();
        assert_eq!(
            err,
            RejectReason::OutOfRange { absolute: u64::from(u32::MAX) + 11, total: 100 }
        );
    }

    #[test]
    fn unresolved_passes_through() {
        let r = resolve_record(record(IssueLocation::Unresolved), 12, 100).unwrap();
        assert_eq!(r.location, IssueLocation::Unresolved);
    }

    #[test]
    fn batch_continues_past_rejections() {
        let chunk = &segment("@@ -10,3 +12,4 @@\n a\n-b\n+c\n+d\n e\n")[0];
        let records = vec![
            record(IssueLocation::DiffRelativeLine(2)),
            record(IssueLocation::DiffRelativeLine(5000)),
            record(IssueLocation::Unresolved),
        ];
        let out = resolve_batch(records, chunk, 100).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].location, IssueLocation::AbsoluteLine(13));
        assert_eq!(out[1].location, IssueLocation::Unresolved);
    }

    #[test]
    fn missing_hunk_context_rejects_whole_batch() {
        let chunk = crate::parser::DiffChunk { hunks: vec![] };
        let records = vec![record(IssueLocation::DiffRelativeLine(1))];
        assert!(resolve_batch(records, &chunk, 100).is_err());
    }
}
