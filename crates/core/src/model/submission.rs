use serde::Serialize;

use crate::model::answers::AnswerBuffer;
use crate::model::ids::{QuestionId, StudentId};
use crate::model::test_definition::TestDefinition;

/// Sent for questions the student never answered.
pub const UNANSWERED: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub selected_answer: String,
}

/// Payload handed to the result sink.
///
/// Lists every question of the test, in test order, so the server scores
/// non-attempts instead of treating them as missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub student_id: StudentId,
    pub answers: Vec<SubmittedAnswer>,
    pub time_spent_seconds: u32,
    pub auto_submitted: bool,
}

impl Submission {
    #[must_use]
    pub fn build(
        test: &TestDefinition,
        buffer: &AnswerBuffer,
        student_id: StudentId,
        time_spent_seconds: u32,
        auto_submitted: bool,
    ) -> Self {
        let answers = test
            .questions()
            .iter()
            .map(|question| SubmittedAnswer {
                question_id: question.id().clone(),
                selected_answer: buffer.get(question.id()).unwrap_or(UNANSWERED).to_string(),
            })
            .collect();

        Self {
            student_id,
            answers,
            time_spent_seconds,
            auto_submitted,
        }
    }

    #[must_use]
    pub fn answer_for(&self, question: &QuestionId) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| &a.question_id == question)
            .map(|a| a.selected_answer.as_str())
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.selected_answer == UNANSWERED)
            .count()
    }
}
