//! Invocation Context
//!
//! Resolves the repository coordinates and the target pull request from
//! the action inputs and the ambient GitHub Actions environment.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parameters of one invocation, built once in `main` and then read-only.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub owner: String,
    pub repo: String,
    event_pr_number: Option<u64>,
    pr_number_override: Option<u64>,
    pub review_message: Option<String>,
    pub force_review: bool,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<EventPullRequest>,
}

#[derive(Debug, Deserialize)]
struct EventPullRequest {
    number: u64,
}

impl ActionContext {
    pub fn new(
        repository: &str,
        event_path: Option<&Path>,
        pr_number_override: Option<u64>,
        review_message: Option<String>,
        force_review: bool,
    ) -> Result<Self> {
        let (owner, repo) = split_repository(repository)?;
        Ok(Self {
            owner,
            repo,
            event_pr_number: event_path.and_then(read_event_pull_request),
            pr_number_override,
            review_message,
            force_review,
        })
    }

    /// Target pull request. The explicit input takes priority over the
    /// triggering event's payload; `None` means the action cannot run.
    pub fn pull_request_number(&self) -> Option<u64> {
        self.pr_number_override.or(self.event_pr_number)
    }
}

fn split_repository(repository: &str) -> Result<(String, String)> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => bail!(
            "Invalid repository format: {}. Expected: owner/repo",
            repository
        ),
    }
}

/// Best effort: a missing or malformed payload just means no triggering
/// pull request, which the caller reports as a precondition failure.
fn read_event_pull_request(path: &Path) -> Option<u64> {
    let data = fs::read(path).ok()?;
    let payload: EventPayload = serde_json::from_slice(&data).ok()?;
    Some(payload.pull_request?.number)
}

/// Parse a boolean action input. GitHub leaves unset optional inputs as
/// empty strings rather than omitting the variable, so empty means false.
pub fn parse_bool_input(value: Option<&str>) -> Result<bool> {
    match value.map(str::trim) {
        None | Some("") => Ok(false),
        Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(true),
        Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(false),
        Some(raw) => bail!("Invalid boolean input value: {}", raw),
    }
}
