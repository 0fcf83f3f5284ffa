use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use assess_core::model::{AnswerCopyId, LetterGrade, Recommendation, ScoreSheet};

use crate::api::GradeSink;
use crate::error::ApiError;

/// Marks for one physical answer copy, as posted to the grading endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSubmission {
    pub answer_copy_id: AnswerCopyId,
    pub score: u64,
    pub grade: LetterGrade,
    pub recommendations: Vec<Recommendation>,
    pub feedback: String,
}

impl GradeSubmission {
    #[must_use]
    pub fn from_sheet(answer_copy_id: AnswerCopyId, sheet: &ScoreSheet, feedback: &str) -> Self {
        Self {
            answer_copy_id,
            score: sheet.total(),
            grade: sheet.grade(),
            recommendations: sheet.recommendations(),
            feedback: feedback.trim().to_string(),
        }
    }
}

/// Sends an instructor's rubric for a scanned answer copy.
#[derive(Clone)]
pub struct GradingService {
    sink: Arc<dyn GradeSink>,
}

impl GradingService {
    #[must_use]
    pub fn new(sink: Arc<dyn GradeSink>) -> Self {
        Self { sink }
    }

    /// Total the sheet, derive the grade and post it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the grading endpoint rejects the request.
    pub async fn submit(
        &self,
        answer_copy_id: AnswerCopyId,
        sheet: &ScoreSheet,
        feedback: &str,
    ) -> Result<GradeSubmission, ApiError> {
        let submission = GradeSubmission::from_sheet(answer_copy_id, sheet, feedback);
        self.sink.submit_grade(&submission).await?;
        info!(
            answer_copy = %submission.answer_copy_id,
            score = submission.score,
            grade = %submission.grade,
            "answer copy graded"
        );
        Ok(submission)
    }
}
