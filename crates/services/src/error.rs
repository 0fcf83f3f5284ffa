//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::{ParseIdError, TestDefinitionError};

/// Errors emitted by the REST collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidTest(#[from] TestDefinitionError),
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
}

/// Errors surfaced by `SessionController`.
///
/// Both load and submit failures are terminal for the session; the controller has
/// already moved to `Phase::Failed` when one of these is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("could not load the test")]
    Load(#[source] ApiError),
    #[error("could not submit the answers")]
    Submit(#[source] ApiError),
    #[error("submission task stopped before completing")]
    Interrupted,
}
