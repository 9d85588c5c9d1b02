//! GitHub REST client.
//!
//! Endpoints used:
//! - GET   /repos/{owner}/{repo}/pulls/{number}
//! - PATCH /repos/{owner}/{repo}/pulls/{number}
//! - GET   /repos/{owner}/{repo}/pulls/{number}/files   ("patch" is unified diff)
//! - GET   /repos/{owner}/{repo}/contents/{path}?ref=   (raw media type)
//! - GET   /repos/{owner}/{repo}/issues/{number}/comments
//! - GET   /repos/{owner}/{repo}/pulls/{number}/comments
//! - POST  /repos/{owner}/{repo}/issues/{number}/comments
//! - POST  /repos/{owner}/{repo}/pulls/{number}/comments (line + side form)

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use super::{ChangedFile, HostConfig, PullRequestMeta};
use crate::errors::{HostError, ReviewResult};

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    cfg: HostConfig,
}

impl GitHubClient {
    /// Builds a client with auth headers and transport timeouts baked in.
    pub fn new(cfg: HostConfig) -> ReviewResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("pr-ai/0.1"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cfg.token))
                .map_err(|e| HostError::InvalidResponse(format!("bad token header: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, cfg })
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.cfg.base_api.trim_end_matches('/'),
            self.cfg.owner,
            self.cfg.repo,
            tail
        )
    }

    /// Fetches PR metadata, including the head commit SHA.
    pub async fn get_pull_request(&self) -> ReviewResult<PullRequestMeta> {
        #[derive(Deserialize)]
        struct Head {
            sha: String,
        }
        #[derive(Deserialize)]
        struct Pr {
            number: u64,
            title: String,
            body: Option<String>,
            state: String,
            html_url: String,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
            head: Head,
        }

        let url = self.repo_url(&format!("pulls/{}", self.cfg.pull_number));
        debug!("host: GET {url}");
        let pr: Pr = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(PullRequestMeta {
            number: pr.number,
            title: pr.title,
            body: pr.body,
            state: pr.state,
            html_url: pr.html_url,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            head_sha: pr.head.sha,
        })
    }

    /// Replaces the PR description.
    pub async fn update_pull_request_body(&self, new_body: &str) -> ReviewResult<()> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            body: &'a str,
        }
        let url = self.repo_url(&format!("pulls/{}", self.cfg.pull_number));
        debug!("host: PATCH {url}");
        self.http
            .patch(&url)
            .json(&Req { body: new_body })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Lists the PR's changed files with their per-file unified diffs.
    pub async fn list_changed_files(&self) -> ReviewResult<Vec<ChangedFile>> {
        #[derive(Deserialize)]
        struct FileEntry {
            filename: String,
            status: String,
            patch: Option<String>,
        }

        let mut out = Vec::new();
        let mut page = 1u32;
        loop {
            let url = self.repo_url(&format!(
                "pulls/{}/files?per_page=100&page={page}",
                self.cfg.pull_number
            ));
            debug!("host: GET {url}");
            let batch: Vec<FileEntry> = self
                .http
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            let done = batch.len() < 100;
            out.extend(batch.into_iter().map(|f| ChangedFile {
                path: f.filename,
                status: f.status,
                patch: f.patch,
            }));
            if done {
                break;
            }
            page += 1;
        }
        Ok(out)
    }

    /// Fetches raw file content at a specific git ref.
    ///
    /// Returns `Ok(None)` if the path does not exist at that ref.
    pub async fn get_file_at_ref(&self, path: &str, git_ref: &str) -> ReviewResult<Option<String>> {
        let url = self.repo_url(&format!("contents/{path}?ref={git_ref}"));
        debug!("host: GET {url} (raw)");
        let resp = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.github.raw+json")
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = resp.error_for_status()?.text().await?;
        Ok(Some(text))
    }

    /// Snapshot of every comment body currently on the PR: general issue
    /// comments plus inline review comments, both paginated to the end so
    /// the duplicate gate never misses an older comment.
    pub async fn list_existing_comment_bodies(&self) -> ReviewResult<Vec<String>> {
        #[derive(Deserialize)]
        struct CommentEntry {
            body: Option<String>,
        }

        let mut bodies = Vec::new();
        for endpoint in [
            format!("issues/{}/comments", self.cfg.pull_number),
            format!("pulls/{}/comments", self.cfg.pull_number),
        ] {
            let mut page = 1u32;
            loop {
                let url = self.repo_url(&format!("{endpoint}?per_page=100&page={page}"));
                debug!("host: GET {url}");
                let batch: Vec<CommentEntry> = self
                    .http
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                let done = batch.len() < 100;
                bodies.extend(batch.into_iter().filter_map(|c| c.body));
                if done {
                    break;
                }
                page += 1;
            }
        }
        Ok(bodies)
    }

    /// Posts a general (file-level or PR-level) comment.
    pub async fn post_general_comment(&self, body: &str) -> ReviewResult<()> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            body: &'a str,
        }
        let url = self.repo_url(&format!("issues/{}/comments", self.cfg.pull_number));
        debug!("host: POST {url}");
        self.http
            .post(&url)
            .json(&Req { body })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Posts an inline review comment anchored to a line on the new side of
    /// the diff at the given commit.
    pub async fn post_review_comment(
        &self,
        body: &str,
        commit_id: &str,
        path: &str,
        line: u32,
    ) -> ReviewResult<()> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            body: &'a str,
            commit_id: &'a str,
            path: &'a str,
            line: u32,
            side: &'a str,
        }
        let url = self.repo_url(&format!("pulls/{}/comments", self.cfg.pull_number));
        debug!("host: POST {url} path={path} line={line}");
        self.http
            .post(&url)
            .json(&Req {
                body,
                commit_id,
                path,
                line,
                side: "RIGHT",
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
