//! Approval Decision Engine
//!
//! Resolves the acting user and the pull request's current state, decides
//! whether a new approving review is needed, and submits one. API
//! failures are classified by HTTP status into actionable messages.

use crate::api::{ApiError, GitHubClient, PullRequest, Review};
use crate::context::ActionContext;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::info;

/// Login reported for the platform-issued `GITHUB_TOKEN`, whose own
/// identity cannot be queried (`GET /user` answers 403 for it).
const GITHUB_ACTIONS_BOT: &str = "github-actions[bot]";

#[derive(Debug, Error)]
pub enum ApproveError {
    #[error(
        "Event payload missing `pull_request` key, and no `pull-request-number` provided as \
         input. Make sure you're triggering this action on the `pull_request` or \
         `pull_request_target` events."
    )]
    MissingPullRequest,
    #[error("{}", classify(.0))]
    Api(#[from] ApiError),
}

/// Approve the pull request named by `context`, unless the acting user's
/// approval is already in place for the current head commit.
pub async fn approve(client: &GitHubClient, context: &ActionContext) -> Result<(), ApproveError> {
    let pr_number = context
        .pull_request_number()
        .ok_or(ApproveError::MissingPullRequest)?;

    info!("Getting current user and pull request #{} state", pr_number);
    let state = resolve(client, &context.owner, &context.repo, pr_number).await?;
    info!("Current user is {}", state.identity);
    info!("Commit SHA is {}", state.pull.head.sha);

    if !context.force_review && !needs_review(&state.identity, &state.pull, &state.reviews) {
        info!(
            "Current user already approved pull request #{}, nothing to do",
            pr_number
        );
        return Ok(());
    }

    info!(
        "Pull request #{} has not been approved yet, creating approving review",
        pr_number
    );
    client
        .create_review(
            &context.owner,
            &context.repo,
            pr_number,
            context.review_message.as_deref(),
        )
        .await?;
    info!("Approved pull request #{}", pr_number);
    Ok(())
}

struct ResolvedState {
    identity: String,
    pull: PullRequest,
    reviews: Vec<Review>,
}

/// Fan out the three independent reads for one pull request.
///
/// Only the identity query gets its 403 swallowed; the same status from
/// the pull request or review queries is a real permission failure and
/// propagates.
async fn resolve(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<ResolvedState, ApiError> {
    let (user, pull, reviews) = tokio::join!(
        client.authenticated_user(),
        client.pull_request(owner, repo, number),
        client.list_reviews(owner, repo, number),
    );

    let identity = match user {
        Ok(user) => user.login,
        Err(err) if err.status() == Some(StatusCode::FORBIDDEN) => GITHUB_ACTIONS_BOT.to_string(),
        Err(err) => return Err(err),
    };

    Ok(ResolvedState {
        identity,
        pull: pull?,
        reviews: reviews?,
    })
}

/// Whether a new approving review must be submitted.
///
/// The review list is ordered oldest first, so the last entry authored by
/// `identity` reflects their current standing. An approval only counts if
/// it targets the current head commit, and an outstanding review request
/// for the identity always forces a fresh review.
fn needs_review(identity: &str, pull: &PullRequest, reviews: &[Review]) -> bool {
    let last_own_review = reviews
        .iter()
        .filter(|review| {
            review
                .user
                .as_ref()
                .is_some_and(|user| user.login == identity)
        })
        .last();

    let already_approved = last_own_review
        .is_some_and(|review| review.state == "APPROVED" && review.commit_id == pull.head.sha);
    let review_requested = pull
        .requested_reviewers
        .iter()
        .any(|reviewer| reviewer.login == identity);

    !already_approved || review_requested
}

/// Map an API failure onto user-facing guidance, keyed by HTTP status.
fn classify(error: &ApiError) -> String {
    let ApiError::Status { status, message } = error else {
        return error.to_string();
    };
    match status.as_u16() {
        401 => format!(
            "{}. Please check that the `github-token` input parameter is set correctly.",
            message
        ),
        403 => format!(
            "{}. In some cases, the GitHub token used for actions triggered from \
             `pull_request` events are read-only, which can cause this problem. Switching to \
             the `pull_request_target` event typically resolves this issue.",
            message
        ),
        404 => format!(
            "{}. This typically means the token you're using doesn't have access to this \
             repository. Use the built-in `${{{{ secrets.GITHUB_TOKEN }}}}` token, or review \
             the scopes assigned to your personal access token.",
            message
        ),
        422 => format!(
            "{}. This typically happens when you try to approve the pull request with the \
             same user account that created the pull request. Try using the built-in \
             `${{{{ secrets.GITHUB_TOKEN }}}}` token, or if you're using a personal access \
             token, use one that belongs to a dedicated bot account.",
            message
        ),
        _ => format!("Error (code {}): {}", status.as_u16(), message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Head, Reviewer};

    fn pull(head_sha: &str, requested: &[&str]) -> PullRequest {
        PullRequest {
            head: Head {
                sha: head_sha.to_string(),
            },
            requested_reviewers: requested
                .iter()
                .map(|login| Reviewer {
                    login: login.to_string(),
                })
                .collect(),
        }
    }

    fn review(login: Option<&str>, commit_id: &str, state: &str) -> Review {
        Review {
            user: login.map(|login| Reviewer {
                login: login.to_string(),
            }),
            commit_id: commit_id.to_string(),
            state: state.to_string(),
        }
    }

    #[test]
    fn no_reviews_needs_one() {
        assert!(needs_review("hmarr", &pull("abc", &[]), &[]));
    }

    #[test]
    fn current_approval_skips_submission() {
        let reviews = vec![review(Some("hmarr"), "abc", "APPROVED")];
        assert!(!needs_review("hmarr", &pull("abc", &[]), &reviews));
    }

    #[test]
    fn approval_for_older_commit_does_not_count() {
        let reviews = vec![review(Some("hmarr"), "old", "APPROVED")];
        assert!(needs_review("hmarr", &pull("abc", &[]), &reviews));
    }

    #[test]
    fn later_review_by_same_user_wins() {
        let reviews = vec![
            review(Some("hmarr"), "abc", "APPROVED"),
            review(Some("hmarr"), "abc", "DISMISSED"),
        ];
        assert!(needs_review("hmarr", &pull("abc", &[]), &reviews));
    }

    #[test]
    fn non_approved_states_need_a_review() {
        for state in ["PENDING", "DISMISSED", "CHANGES_REQUESTED", "COMMENTED"] {
            let reviews = vec![review(Some("hmarr"), "abc", state)];
            assert!(needs_review("hmarr", &pull("abc", &[]), &reviews), "{}", state);
        }
    }

    #[test]
    fn outstanding_request_forces_a_review() {
        let reviews = vec![review(Some("hmarr"), "abc", "APPROVED")];
        assert!(needs_review("hmarr", &pull("abc", &["hmarr"]), &reviews));
    }

    #[test]
    fn other_users_reviews_are_ignored() {
        let reviews = vec![
            review(Some("someone-else"), "abc", "APPROVED"),
            review(None, "abc", "APPROVED"),
        ];
        assert!(needs_review("hmarr", &pull("abc", &[]), &reviews));
    }

    #[test]
    fn classifies_statuses_into_guidance() {
        let status_error = |status: u16| ApiError::Status {
            status: StatusCode::from_u16(status).unwrap(),
            message: "Oops".to_string(),
        };

        assert!(classify(&status_error(401)).contains("`github-token` input"));
        assert!(classify(&status_error(403)).contains("pull_request_target"));
        assert!(classify(&status_error(404)).contains("doesn't have access"));
        assert!(classify(&status_error(422)).contains("same user account"));
        assert_eq!(classify(&status_error(500)), "Error (code 500): Oops");
    }
}
