//! Collaborators the session reaches over REST.

mod http;
mod memory;
mod wire;

use async_trait::async_trait;

use assess_core::model::{ResultId, ResultSummary, Submission, TestDefinition, TestId};

use crate::error::ApiError;
use crate::grading_service::GradeSubmission;

pub use http::HttpApi;
pub use memory::InMemoryApi;

/// Read-only source of test definitions.
#[async_trait]
pub trait TestSource: Send + Sync {
    /// Fetch a test with its questions. Answer keys are never part of the response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown test, or other transport errors.
    async fn fetch_test(&self, id: &TestId) -> Result<TestDefinition, ApiError>;
}

/// Endpoint that scores a submission.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` when the submission is rejected or cannot be delivered.
    async fn submit(&self, test_id: &TestId, submission: &Submission)
    -> Result<ResultId, ApiError>;
}

#[async_trait]
pub trait ResultSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown result, or other transport errors.
    async fn fetch_result(&self, id: &ResultId) -> Result<ResultSummary, ApiError>;
}

/// Endpoint receiving an instructor's marks for a physical answer copy.
#[async_trait]
pub trait GradeSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` when the grade cannot be stored.
    async fn submit_grade(&self, grade: &GradeSubmission) -> Result<(), ApiError>;
}
