//! Auto-Approve Action
//!
//! Approves a pull request on behalf of the configured GitHub token.
//! The binary resolves the acting user, the pull request's head commit
//! and review history, decides whether a fresh approving review is
//! needed, and submits one through the GitHub REST API.
//!
//! ## Usage
//!
//! ```bash
//! # Inside a workflow, inputs arrive through the environment
//! GITHUB_REPOSITORY=hmarr/test \
//! GITHUB_EVENT_PATH=/github/workflow/event.json \
//! INPUT_GITHUB-TOKEN=<TOKEN> \
//! auto-approve
//!
//! # Or with an explicit pull request number
//! auto-approve \
//!   --repository hmarr/test \
//!   --github-token <TOKEN> \
//!   --pull-request-number 123
//! ```

pub mod api;
pub mod approve;
pub mod context;
