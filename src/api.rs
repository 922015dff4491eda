//! GitHub REST API Client
//!
//! Thin reqwest wrapper over the four pull request endpoints this action
//! needs. Failures are split into status-tagged API errors and transport
//! errors so callers can map them onto actionable diagnostics.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const USER_AGENT: &str = "auto-approve-action";
const API_VERSION: &str = "2022-11-28";

/// Failure of a single API call. `Status` carries the HTTP status code
/// so the caller can classify it; everything else is `Transport`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GitHub API error ({status}): {message}")]
    Status { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// HTTP status of the failing call, if the API answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Response from `GET /user`
#[derive(Debug, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reviewer {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Head {
    pub sha: String,
}

/// Subset of `GET /repos/{owner}/{repo}/pulls/{number}` this action reads
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub head: Head,
    /// Users with an outstanding review request on the pull request.
    /// Absent from some token scopes, so tolerate a missing field.
    #[serde(default)]
    pub requested_reviewers: Vec<Reviewer>,
}

/// One entry of the pull request's review history, oldest first
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    /// `None` when the reviewing account has since been deleted
    pub user: Option<Reviewer>,
    pub commit_id: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
struct CreateReviewRequest<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

/// GitHub error payloads look like `{ "message": "..." }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Identity of the account behind the token.
    pub async fn authenticated_user(&self) -> ApiResult<AuthenticatedUser> {
        self.get(format!("{}/user", self.base_url)).await
    }

    pub async fn pull_request(&self, owner: &str, repo: &str, number: u64) -> ApiResult<PullRequest> {
        self.get(format!(
            "{}/repos/{}/{}/pulls/{}",
            self.base_url, owner, repo, number
        ))
        .await
    }

    pub async fn list_reviews(&self, owner: &str, repo: &str, number: u64) -> ApiResult<Vec<Review>> {
        self.get(format!(
            "{}/repos/{}/{}/pulls/{}/reviews",
            self.base_url, owner, repo, number
        ))
        .await
    }

    /// Submit an approving review, optionally carrying a body message.
    pub async fn create_review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        message: Option<&str>,
    ) -> ApiResult<()> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/reviews",
            self.base_url, owner, repo, number
        );
        let request_body = CreateReviewRequest {
            event: "APPROVE",
            body: message,
        };

        let response = self.send(self.client.post(&url).json(&request_body)).await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: String) -> ApiResult<T> {
        let response = self.send(self.client.get(&url)).await?;
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        Ok(request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?)
    }

    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(ApiError::Status { status, message })
    }
}
