use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use assess_core::model::{ResultId, ResultSummary, Submission, TestDefinition, TestId};

use super::{GradeSink, ResultSink, ResultSource, TestSource};
use crate::error::ApiError;
use crate::grading_service::GradeSubmission;

/// Simple in-memory backend for tests and offline prototyping.
#[derive(Clone, Default)]
pub struct InMemoryApi {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    tests: HashMap<TestId, TestDefinition>,
    results: HashMap<ResultId, ResultSummary>,
    submissions: Vec<(TestId, Submission)>,
    grades: Vec<GradeSubmission>,
    reject_submissions: bool,
    submit_delay: Option<Duration>,
    next_result: u64,
    fetches: u64,
}

impl InMemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn with_test(self, test: TestDefinition) -> Self {
        self.insert_test(test);
        self
    }

    pub fn insert_test(&self, test: TestDefinition) {
        self.state().tests.insert(test.id().clone(), test);
    }

    pub fn insert_result(&self, result: ResultSummary) {
        self.state().results.insert(result.id.clone(), result);
    }

    /// Make every following submit fail with a 500 until switched back.
    pub fn reject_submissions(&self, reject: bool) {
        self.state().reject_submissions = reject;
    }

    /// Delay each submit, so tests can act while a request is in flight.
    pub fn set_submit_delay(&self, delay: Option<Duration>) {
        self.state().submit_delay = delay;
    }

    /// Accepted submissions, in arrival order.
    #[must_use]
    pub fn submissions(&self) -> Vec<(TestId, Submission)> {
        self.state().submissions.clone()
    }

    /// Number of submit calls that reached the sink, accepted or not.
    #[must_use]
    pub fn submit_calls(&self) -> u64 {
        self.state().next_result
    }

    /// Number of test fetches served, found or not.
    #[must_use]
    pub fn fetch_calls(&self) -> u64 {
        self.state().fetches
    }

    #[must_use]
    pub fn grades(&self) -> Vec<GradeSubmission> {
        self.state().grades.clone()
    }
}

#[async_trait]
impl TestSource for InMemoryApi {
    async fn fetch_test(&self, id: &TestId) -> Result<TestDefinition, ApiError> {
        let mut state = self.state();
        state.fetches += 1;
        state.tests.get(id).cloned().ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl ResultSink for InMemoryApi {
    async fn submit(
        &self,
        test_id: &TestId,
        submission: &Submission,
    ) -> Result<ResultId, ApiError> {
        let delay = {
            let mut state = self.state();
            state.next_result += 1;
            state.submit_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        if state.reject_submissions {
            return Err(ApiError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR));
        }
        if !state.tests.contains_key(test_id) {
            return Err(ApiError::NotFound);
        }
        state.submissions.push((test_id.clone(), submission.clone()));
        let id = format!("result-{}", state.next_result);
        Ok(ResultId::new(id)?)
    }
}

#[async_trait]
impl ResultSource for InMemoryApi {
    async fn fetch_result(&self, id: &ResultId) -> Result<ResultSummary, ApiError> {
        self.state().results.get(id).cloned().ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl GradeSink for InMemoryApi {
    async fn submit_grade(&self, grade: &GradeSubmission) -> Result<(), ApiError> {
        self.state().grades.push(grade.clone());
        Ok(())
    }
}
