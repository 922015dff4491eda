//! Auto-Approve Action entry point
//!
//! Parses the action inputs from the environment (or command line),
//! then hands off to the approval engine. Any failure is logged once
//! and converted into a non-zero exit code for the workflow runner.

use anyhow::{Context, Result};
use auto_approve::api::GitHubClient;
use auto_approve::approve::approve;
use auto_approve::context::{parse_bool_input, ActionContext};
use clap::Parser;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Auto-Approve Action
#[derive(Parser, Debug)]
#[command(name = "auto-approve")]
#[command(about = "Approve GitHub pull requests from a workflow")]
#[command(version)]
struct Args {
    /// GitHub token used to submit the review
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    github_token: String,

    /// Repository in format owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// Path to the triggering event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Pull request number; overrides the triggering event's payload
    #[arg(long, env = "INPUT_PULL-REQUEST-NUMBER")]
    pull_request_number: Option<String>,

    /// Body message attached to the approving review
    #[arg(long, env = "INPUT_REVIEW-MESSAGE")]
    review_message: Option<String>,

    /// Submit a review even when an approval is already in place
    /// ("true"/"false", case-insensitive)
    #[arg(long, env = "INPUT_FORCE-REVIEW")]
    force_review: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    api_url: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Unset optional action inputs arrive as empty strings
    let pr_number_override = match args.pull_request_number.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<u64>()
                .with_context(|| format!("Invalid `pull-request-number` input: {}", raw))?,
        ),
    };
    let review_message = args.review_message.filter(|message| !message.is_empty());
    let force_review = parse_bool_input(args.force_review.as_deref())
        .context("Invalid `force-review` input")?;

    let context = ActionContext::new(
        &args.repository,
        args.event_path.as_deref(),
        pr_number_override,
        review_message,
        force_review,
    )?;
    let client = GitHubClient::new(&args.github_token, &args.api_url);

    approve(&client, &context).await?;
    Ok(())
}
