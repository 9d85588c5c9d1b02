use std::error::Error;

use llm_service::LlmService;
use pr_reviewer::config::ReviewConfig;
use pr_reviewer::publish::PublishConfig;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from a .env file when one is present;
    // in CI everything comes from the job environment instead.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,pr_reviewer=info,llm_service=info"))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Only pull request events carry a diff to review; anything else
    // (push, schedule, manual dispatch) exits cleanly without work.
    let event = std::env::var("GITHUB_EVENT_NAME").unwrap_or_default();
    if event != "pull_request" {
        tracing::info!(event = %event, "not a pull_request event, nothing to do");
        return Ok(());
    }
    if std::env::var("GITHUB_PR_NUMBER").map(|v| v.trim().is_empty()).unwrap_or(true) {
        tracing::error!("GITHUB_PR_NUMBER is not set, nothing to do");
        return Ok(());
    }

    let cfg = ReviewConfig::from_env()?;
    let llm = LlmService::from_env()?;
    let publish_cfg = PublishConfig::from_env();

    let summary = pr_reviewer::run_review(&cfg, &llm, &publish_cfg).await?;
    tracing::info!(
        changed = summary.files_changed,
        reviewed = summary.files_reviewed,
        skipped = summary.files_skipped,
        failed = summary.files_failed,
        posted = summary.comments_posted,
        duplicates = summary.duplicates_skipped,
        "review run finished"
    );

    Ok(())
}
