use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use assess_core::model::{ResultId, ResultSummary, Submission, TestDefinition, TestId};

use super::wire::{Envelope, ResultPayload, SubmitResponseDto, TestDto};
use super::{GradeSink, ResultSink, ResultSource, TestSource};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::grading_service::GradeSubmission;

/// REST adapter for every collaborator the client talks to.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    config: ClientConfig,
}

impl HttpApi {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.config.api_root())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status));
        }
        let bytes = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        Ok(envelope.into_inner())
    }
}

#[async_trait]
impl TestSource for HttpApi {
    async fn fetch_test(&self, id: &TestId) -> Result<TestDefinition, ApiError> {
        let url = self.url(&format!("tests/{id}"));
        debug!(%url, "fetching test");
        let response = self.authorize(self.client.get(url)).send().await?;
        let dto: TestDto = Self::read(response).await?;
        TestDefinition::try_from(dto)
    }
}

#[async_trait]
impl ResultSink for HttpApi {
    async fn submit(
        &self,
        test_id: &TestId,
        submission: &Submission,
    ) -> Result<ResultId, ApiError> {
        let url = self.url(&format!("tests/{test_id}/submit"));
        debug!(%url, answers = submission.answers.len(), "posting submission");
        let response = self
            .authorize(self.client.post(url))
            .json(submission)
            .send()
            .await?;
        let dto: SubmitResponseDto = Self::read(response).await?;
        ResultId::try_from(dto)
    }
}

#[async_trait]
impl ResultSource for HttpApi {
    async fn fetch_result(&self, id: &ResultId) -> Result<ResultSummary, ApiError> {
        let url = self.url(&format!("tests/results/{id}"));
        let response = self.authorize(self.client.get(url)).send().await?;
        let payload: ResultPayload = Self::read(response).await?;
        ResultSummary::try_from(payload)
    }
}

#[async_trait]
impl GradeSink for HttpApi {
    async fn submit_grade(&self, grade: &GradeSubmission) -> Result<(), ApiError> {
        let url = self.url("physicaltest/answer-copies/grade");
        let response = self
            .authorize(self.client.post(url))
            .json(grade)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status));
        }
        Ok(())
    }
}
