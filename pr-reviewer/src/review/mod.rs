//! Per-file review orchestration: prompt → model → parse → resolve → render.
//!
//! Chunks are processed strictly in diff order, one model request per
//! chunk. A chunk whose batch cannot be positioned (missing hunk context)
//! is discarded with a warning; a model failure aborts only the current
//! file and surfaces to the caller.

pub mod comment;
pub mod reply;
pub mod resolve;
pub mod summary;
pub mod template;

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::{Error, ParseError, ReviewResult};
use crate::parser::{DiffChunk, DiffPayload};
use comment::Comment;
use llm_service::LlmService;
use template::PromptTemplate;

/// Reviews one file's chunks and returns candidate comments in diff order.
///
/// The returned comments have byte-stable bodies; duplicate suppression
/// happens later in `publish`.
pub async fn review_file(
    llm: &LlmService,
    template: &PromptTemplate,
    file_path: &str,
    file_content: &str,
    chunks: &[DiffChunk],
) -> ReviewResult<Vec<Comment>> {
    let t0 = Instant::now();
    let total_file_lines = file_content.lines().count() as u32;
    let system = template.system_text();

    let mut comments: Vec<Comment> = Vec::new();
    for (idx, chunk) in chunks.iter().enumerate() {
        let t_one = Instant::now();
        let prompt = template.build_review_prompt(file_content, &DiffPayload::Chunk(chunk.clone()));

        let raw = llm.generate(&prompt, Some(&system)).await?;
        if reply::is_no_issues_reply(&raw, template) {
            debug!(file = file_path, chunk = idx, "review: no issues reported");
            continue;
        }

        let records = reply::parse_reply(&raw, template);
        let resolved = match resolve::resolve_batch(records, chunk, total_file_lines) {
            Ok(r) => r,
            Err(Error::Parse(ParseError::MissingHunkContext)) => {
                warn!(file = file_path, chunk = idx, "review: chunk without hunk context, batch discarded");
                continue;
            }
            Err(e) => return Err(e),
        };

        debug!(
            file = file_path,
            chunk = idx,
            records = resolved.len(),
            took_ms = t_one.elapsed().as_millis(),
            "review: chunk done"
        );
        comments.extend(resolved.iter().map(|r| Comment::from_record(r, file_path)));
    }

    info!(
        file = file_path,
        chunks = chunks.len(),
        candidates = comments.len(),
        took_ms = t0.elapsed().as_millis(),
        "review: file done"
    );
    Ok(comments)
}
