//! Public entry for the pr-reviewer pipeline.
//!
//! Single high-level function to run the whole pipeline for a pull request:
//!
//! 1) **Step 1 — Host I/O**: fetch PR metadata (head SHA) and the changed
//!    files with their per-file unified diffs; apply path/extension filters.
//! 2) **Step 2 — Summary**: refresh the managed summary block in the PR
//!    description (best effort, never fatal).
//! 3) **Step 3 — Per-file review**: segment the diff into chunks, prompt
//!    the model per chunk, parse/resolve the reply into comments.
//! 4) **Step 4 — Publish**: snapshot existing comments, drop exact
//!    duplicates, post the rest (inline where a line resolved).
//!
//! Files are processed strictly sequentially and one file's failure never
//! aborts the run; it is logged and counted in the returned [`RunSummary`].
//! The pipeline uses `tracing` for logging and avoids `async-trait` and
//! heap trait objects; collaborator dispatch is plain `async fn` on
//! concrete clients.

pub mod config;
pub mod errors;
pub mod git_host;
pub mod parser;
pub mod publish;
pub mod review;

use std::time::Instant;
use tracing::{debug, error, info, warn};

use config::ReviewConfig;
use errors::ReviewResult;
use git_host::{ChangedFile, GitHubClient};
use llm_service::LlmService;
use publish::PublishConfig;
use review::template::PromptTemplate;

/// Outcome counters for a whole run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub files_changed: usize,
    pub files_reviewed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub comments_posted: usize,
    pub duplicates_skipped: usize,
}

/// Run the whole pipeline for a single pull request.
///
/// Returns `Err` only for setup-level failures (host unreachable, PR
/// missing); per-file review failures are logged and reflected in the
/// summary instead.
pub async fn run_review(
    cfg: &ReviewConfig,
    llm: &LlmService,
    publish_cfg: &PublishConfig,
) -> ReviewResult<RunSummary> {
    let t0 = Instant::now();
    let template = PromptTemplate::default();

    debug!("step1: init host client");
    let host = GitHubClient::new(cfg.host.clone())?;

    debug!("step1: fetch pull request meta");
    let meta = host.get_pull_request().await?;
    info!(
        pr = meta.number,
        head_sha = %meta.head_sha,
        state = %meta.state,
        "step1: meta ok"
    );

    debug!("step1: fetch changed files");
    let files = host.list_changed_files().await?;
    let mut summary = RunSummary { files_changed: files.len(), ..RunSummary::default() };

    let reviewable: Vec<&ChangedFile> = files
        .iter()
        .filter(|f| {
            let keep = cfg.should_review(&f.path) && eligible_patch(f);
            if !keep {
                debug!(file = %f.path, "step1: filtered out");
            }
            keep
        })
        .collect();
    summary.files_skipped = summary.files_changed - reviewable.len();
    info!(
        changed = summary.files_changed,
        reviewable = reviewable.len(),
        "step1: changed files fetched"
    );

    if reviewable.is_empty() {
        info!("step1: nothing to review");
        return Ok(summary);
    }

    // Step 2: PR summary (best effort).
    if let Err(e) = refresh_summary(&host, llm, &template, &meta.body, &reviewable).await {
        warn!(error = %e, "step2: summary refresh failed, continuing");
    }

    // Steps 3–4: per-file review and publish, sequential in diff order.
    for file in reviewable {
        let t_file = Instant::now();
        info!(file = %file.path, "step3: reviewing file");
        match review_and_publish(&host, llm, &template, publish_cfg, &meta.head_sha, file).await {
            Ok(stats) => {
                summary.files_reviewed += 1;
                summary.comments_posted += stats.posted;
                summary.duplicates_skipped += stats.skipped_duplicates;
                debug!(
                    file = %file.path,
                    took_ms = t_file.elapsed().as_millis(),
                    "step4: file published"
                );
            }
            Err(e) => {
                summary.files_failed += 1;
                error!(file = %file.path, error = %e, "review failed for file, continuing");
            }
        }
    }

    info!(
        reviewed = summary.files_reviewed,
        failed = summary.files_failed,
        posted = summary.comments_posted,
        duplicates = summary.duplicates_skipped,
        took_ms = t0.elapsed().as_millis(),
        "run done"
    );
    Ok(summary)
}

/// A file is reviewable when the host inlined a non-binary unified diff.
fn eligible_patch(file: &ChangedFile) -> bool {
    match &file.patch {
        Some(p) => !parser::looks_like_binary_patch(p),
        None => false,
    }
}

/// Step 2: regenerate the PR-description summary block.
async fn refresh_summary(
    host: &GitHubClient,
    llm: &LlmService,
    template: &PromptTemplate,
    current_body: &Option<String>,
    files: &[&ChangedFile],
) -> ReviewResult<()> {
    const SNIPPET_LIMIT: usize = 1000;

    let changes: Vec<(String, String)> = files
        .iter()
        .filter_map(|f| {
            f.patch
                .as_ref()
                .map(|p| (f.path.clone(), truncate(p, SNIPPET_LIMIT)))
        })
        .collect();
    if changes.is_empty() {
        return Ok(());
    }

    let prompt = template.build_summary_prompt(&changes);
    let generated = llm.generate(&prompt, None).await?;
    let new_body = review::summary::splice(current_body.as_deref(), generated.trim());
    host.update_pull_request_body(&new_body).await?;
    info!("step2: PR summary updated");
    Ok(())
}

/// Steps 3–4 for one file: segment, review, snapshot, gate, post.
async fn review_and_publish(
    host: &GitHubClient,
    llm: &LlmService,
    template: &PromptTemplate,
    publish_cfg: &PublishConfig,
    head_sha: &str,
    file: &ChangedFile,
) -> ReviewResult<publish::PublishStats> {
    // `eligible_patch` guaranteed the patch is present.
    let patch = file.patch.as_deref().unwrap_or_default();
    let chunks = parser::segment(patch);
    if chunks.is_empty() {
        debug!(file = %file.path, "step3: no hunks, skipping");
        return Ok(publish::PublishStats::default());
    }

    let Some(content) = host.get_file_at_ref(&file.path, head_sha).await? else {
        warn!(file = %file.path, "step3: file missing at head, skipping");
        return Ok(publish::PublishStats::default());
    };

    let candidates = review::review_file(llm, template, &file.path, &content, &chunks).await?;
    if candidates.is_empty() {
        return Ok(publish::PublishStats::default());
    }

    // Snapshot once per file, immediately before posting decisions, to
    // bound the race window against other writers.
    let existing = publish::snapshot(host.list_existing_comment_bodies().await?);
    publish::publish_file_comments(host, head_sha, candidates, &existing, publish_cfg).await
}

fn truncate(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        return s.to_string();
    }
    s.chars().take(n).collect::<String>() + "…"
}

pub use review::comment::Comment;
pub use review::reply::{IssueLocation, IssueRecord, Severity};
