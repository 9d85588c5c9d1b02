//! Duplicate gate and comment posting.
//!
//! The gate is the sole duplicate-suppression mechanism: a candidate is
//! dropped when its trimmed body exactly matches a body already on the PR.
//! The existing-comment snapshot is taken once per file immediately before
//! posting, so only duplicates that existed *before* the run are filtered;
//! two comments produced by the same run are never deduplicated against
//! each other. No fuzzy matching — reworded re-reviews count as new.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::errors::ReviewResult;
use crate::git_host::GitHubClient;
use crate::review::comment::Comment;

/// Configuration for the posting step.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// If true, log what would be posted without calling the API.
    pub dry_run: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self { dry_run: false }
    }
}

impl PublishConfig {
    pub fn from_env() -> Self {
        Self { dry_run: env_bool("PR_AI_PUBLISH_DRY_RUN", false) }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

/// Snapshot of existing comment bodies, normalized by trimming.
pub type ExistingCommentSet = HashSet<String>;

/// Builds the normalized snapshot from raw comment bodies.
pub fn snapshot(bodies: impl IntoIterator<Item = String>) -> ExistingCommentSet {
    bodies.into_iter().map(|b| b.trim().to_string()).collect()
}

/// Drops candidates whose trimmed body already exists on the PR.
///
/// Exact match only, against the pre-run snapshot. Candidates are compared
/// to the snapshot, never to each other.
pub fn filter_new(candidates: Vec<Comment>, existing: &ExistingCommentSet) -> Vec<Comment> {
    candidates
        .into_iter()
        .filter(|c| {
            let duplicate = existing.contains(c.body.trim());
            if duplicate {
                debug!(file = %c.file_path, "publish: duplicate body skipped");
            }
            !duplicate
        })
        .collect()
}

/// Outcome counters for one file's posting pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct PublishStats {
    pub posted: usize,
    pub skipped_duplicates: usize,
    pub failed: usize,
}

/// Posts one file's surviving comments sequentially, in diff order.
///
/// Inline placement is attempted for comments carrying a line; when the
/// host refuses the anchor (line outside the posted diff, stale commit)
/// the comment falls back to a general comment rather than being lost.
/// Individual post failures are logged and counted, never fatal.
pub async fn publish_file_comments(
    host: &GitHubClient,
    head_sha: &str,
    candidates: Vec<Comment>,
    existing: &ExistingCommentSet,
    cfg: &PublishConfig,
) -> ReviewResult<PublishStats> {
    let t0 = Instant::now();
    let before = candidates.len();
    let to_post = filter_new(candidates, existing);

    let mut stats = PublishStats {
        skipped_duplicates: before - to_post.len(),
        ..PublishStats::default()
    };

    for comment in &to_post {
        if cfg.dry_run {
            info!(
                file = %comment.file_path,
                line = ?comment.line,
                "publish: dry-run, would post:\n{}",
                comment.body
            );
            continue;
        }

        let result = match comment.line {
            Some(line) => {
                match host
                    .post_review_comment(&comment.body, head_sha, &comment.file_path, line)
                    .await
                {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        warn!(
                            file = %comment.file_path,
                            line,
                            error = %e,
                            "publish: inline anchor refused, falling back to general comment"
                        );
                        host.post_general_comment(&comment.body).await
                    }
                }
            }
            None => host.post_general_comment(&comment.body).await,
        };

        match result {
            Ok(()) => stats.posted += 1,
            Err(e) => {
                stats.failed += 1;
                tracing::error!(file = %comment.file_path, error = %e, "publish: post failed");
            }
        }
    }

    info!(
        posted = stats.posted,
        skipped = stats.skipped_duplicates,
        failed = stats.failed,
        took_ms = t0.elapsed().as_millis(),
        "publish: file done"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(body: &str) -> Comment {
        Comment {
            file_path: "src/app.py".into(),
            line: Some(13),
            body: body.into(),
        }
    }

    #[test]
    fn exact_duplicates_suppressed() {
        let existing = snapshot(vec!["### [Error] - [Logic]\n\nBad loop.".to_string()]);
        let out = filter_new(vec![comment("### [Error] - [Logic]\n\nBad loop.")], &existing);
        assert!(out.is_empty());
    }

    #[test]
    fn whitespace_trimmed_before_compare() {
        let existing = snapshot(vec!["  body text \n".to_string()]);
        let out = filter_new(vec![comment("body text")], &existing);
        assert!(out.is_empty());
    }

    #[test]
    fn unseen_bodies_pass() {
        let existing = snapshot(vec!["something else".to_string()]);
        let out = filter_new(vec![comment("body text")], &existing);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn rerun_on_unchanged_diff_posts_nothing() {
        // First run's output becomes the second run's existing set.
        let first_run = vec![comment("finding one"), comment("finding two")];
        let existing = snapshot(first_run.iter().map(|c| c.body.clone()));
        let second_run = vec![comment("finding one"), comment("finding two")];
        assert!(filter_new(second_run, &existing).is_empty());
    }

    #[test]
    fn same_run_candidates_not_deduped_against_each_other() {
        let existing = snapshot(Vec::<String>::new());
        let out = filter_new(vec![comment("same"), comment("same")], &existing);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn reworded_bodies_treated_as_new() {
        let existing = snapshot(vec!["The loop is wrong.".to_string()]);
        let out = filter_new(vec![comment("This loop is wrong.")], &existing);
        assert_eq!(out.len(), 1);
    }
}
