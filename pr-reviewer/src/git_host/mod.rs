//! Pull-request host layer (GitHub).
//!
//! One concrete client, plain `async fn`, no async-trait and no
//! `Box<dyn ...>`. All collaborator I/O of the pipeline goes through here:
//! PR metadata, changed files with their unified diffs, raw file content at
//! a ref, and comment reads/writes.

pub mod github;

pub use github::GitHubClient;

use serde::{Deserialize, Serialize};

/// Runtime configuration for the host client.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Access token (PAT or installation token).
    pub token: String,
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Pull request number.
    pub pull_number: u64,
}

/// High-level metadata for a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestMeta {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Head commit SHA; inline comments are bound to it.
    pub head_sha: String,
}

/// One changed file as reported by the host, with its per-file unified diff.
///
/// `patch` is absent for binary files and for very large diffs the host
/// refuses to inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: String,
    pub patch: Option<String>,
}
