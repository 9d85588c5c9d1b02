//! Environment-driven configuration for a review run.
//!
//! Required variables mirror the GitHub Actions surface:
//! - `GITHUB_TOKEN`       host access token
//! - `GITHUB_REPOSITORY`  "owner/repo" slug
//! - `GITHUB_PR_NUMBER`   pull request number
//!
//! Optional:
//! - `GITHUB_API_URL`     API base (default "https://api.github.com")
//! - `TARGET_EXTENSIONS`  comma-separated extension allowlist
//! - `EXCLUDED_PATHS`     comma-separated path-prefix denylist

use crate::errors::{ConfigError, ReviewResult};
use crate::git_host::HostConfig;

const DEFAULT_TARGET_EXTENSIONS: &str = "kt,java,py,js,ts,swift,c,cpp,rs";
const DEFAULT_EXCLUDED_PATHS: &str = ".github/workflows";

/// Validated configuration for one review run.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub host: HostConfig,
    /// File extensions eligible for review (no leading dot).
    pub target_extensions: Vec<String>,
    /// Path prefixes excluded from review.
    pub excluded_prefixes: Vec<String>,
}

impl ReviewConfig {
    /// Loads and validates the configuration from the environment.
    ///
    /// # Errors
    /// [`ConfigError::MissingVar`] for each absent required variable, and
    /// [`ConfigError::InvalidValue`] for malformed slugs or numbers.
    pub fn from_env() -> ReviewResult<Self> {
        let token = must_env("GITHUB_TOKEN")?;
        let slug = must_env("GITHUB_REPOSITORY")?;
        let (owner, repo) = slug.split_once('/').ok_or(ConfigError::InvalidValue {
            var: "GITHUB_REPOSITORY",
            reason: "expected owner/repo",
        })?;
        let pull_number = must_env("GITHUB_PR_NUMBER")?
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue {
                var: "GITHUB_PR_NUMBER",
                reason: "expected u64",
            })?;
        let base_api = std::env::var("GITHUB_API_URL")
            .unwrap_or_else(|_| "https://api.github.com".to_string());

        Ok(Self {
            host: HostConfig {
                base_api,
                token,
                owner: owner.to_string(),
                repo: repo.to_string(),
                pull_number,
            },
            target_extensions: csv_env("TARGET_EXTENSIONS", DEFAULT_TARGET_EXTENSIONS),
            excluded_prefixes: csv_env("EXCLUDED_PATHS", DEFAULT_EXCLUDED_PATHS),
        })
    }

    /// Whether a changed file should be reviewed at all.
    pub fn should_review(&self, path: &str) -> bool {
        if self
            .excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }
        match path.rsplit_once('.') {
            Some((_, ext)) => self
                .target_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

fn must_env(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

fn csv_env(var: &str, default: &str) -> Vec<String> {
    std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ReviewConfig {
        ReviewConfig {
            host: HostConfig {
                base_api: "https://api.github.com".into(),
                token: "t".into(),
                owner: "o".into(),
                repo: "r".into(),
                pull_number: 1,
            },
            target_extensions: vec!["rs".into(), "py".into()],
            excluded_prefixes: vec![".github/workflows".into()],
        }
    }

    #[test]
    fn excluded_prefix_wins() {
        let cfg = config();
        assert!(!cfg.should_review(".github/workflows/ci.py"));
    }

    #[test]
    fn extension_allowlist_applies() {
        let cfg = config();
        assert!(cfg.should_review("src/main.rs"));
        assert!(cfg.should_review("tools/gen.PY"));
        assert!(!cfg.should_review("README.md"));
        assert!(!cfg.should_review("Makefile"));
    }
}
