//! JSON shapes exchanged with the backend.
//!
//! Responses may arrive bare or wrapped in `{ "data": ... }`, and document ids may be
//! spelled `id` or `_id`.

use serde::Deserialize;

use assess_core::model::{
    Question, QuestionId, ResultId, ResultSummary, TestDefinition, TestId, TimeAllowance,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TestDto {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default, alias = "testName")]
    name: Option<String>,
    #[serde(default, alias = "timeLimit")]
    time_limit_minutes: Option<f64>,
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionDto {
    #[serde(alias = "_id")]
    id: String,
    #[serde(alias = "text")]
    question_text: String,
    #[serde(default)]
    options: Vec<String>,
}

impl TryFrom<TestDto> for TestDefinition {
    type Error = ApiError;

    fn try_from(dto: TestDto) -> Result<Self, Self::Error> {
        let questions = dto
            .questions
            .into_iter()
            .map(|q| -> Result<Question, ApiError> {
                Ok(Question::new(QuestionId::new(q.id)?, q.question_text, q.options))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TestDefinition::new(
            TestId::new(dto.id)?,
            dto.name.unwrap_or_default(),
            TimeAllowance::from_minutes(dto.time_limit_minutes),
            questions,
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitResponseDto {
    #[serde(alias = "_id")]
    result_id: String,
}

impl TryFrom<SubmitResponseDto> for ResultId {
    type Error = ApiError;

    fn try_from(dto: SubmitResponseDto) -> Result<Self, Self::Error> {
        Ok(ResultId::new(dto.result_id)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ResultPayload {
    Nested { result: ResultDto },
    Flat(ResultDto),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultDto {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    correct_answers: u32,
    #[serde(default)]
    total_questions: u32,
    #[serde(default, alias = "timeSpent")]
    time_spent_seconds: u32,
}

impl TryFrom<ResultPayload> for ResultSummary {
    type Error = ApiError;

    fn try_from(payload: ResultPayload) -> Result<Self, Self::Error> {
        let dto = match payload {
            ResultPayload::Nested { result } | ResultPayload::Flat(result) => result,
        };
        Ok(ResultSummary {
            id: ResultId::new(dto.id)?,
            score: dto.score,
            correct_answers: dto.correct_answers,
            total_questions: dto.total_questions,
            time_spent_seconds: dto.time_spent_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_test(value: serde_json::Value) -> Result<TestDefinition, ApiError> {
        let envelope: Envelope<TestDto> = serde_json::from_value(value)?;
        TestDefinition::try_from(envelope.into_inner())
    }

    #[test]
    fn parses_wrapped_test_with_legacy_field_names() {
        let test = parse_test(json!({
            "success": true,
            "data": {
                "_id": "t1",
                "name": "Fractions",
                "timeLimit": 2,
                "questions": [
                    { "_id": "q1", "questionText": "1/2 + 1/4?", "options": ["3/4", "2/6"], "correctAnswer": "3/4" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(test.id().as_str(), "t1");
        assert_eq!(test.name(), "Fractions");
        assert_eq!(test.time_allowance_secs(), 120);
        assert_eq!(test.questions()[0].options(), ["3/4", "2/6"]);
    }

    #[test]
    fn parses_bare_test_and_defaults_missing_limit() {
        let test = parse_test(json!({
            "id": "t2",
            "questions": [{ "id": "q1", "questionText": "?" }]
        }))
        .unwrap();

        assert_eq!(test.time_allowance_secs(), 3_600);
        assert_eq!(test.name(), "Test");
        assert!(test.questions()[0].options().is_empty());
    }

    #[test]
    fn fractional_limit_rounds_to_seconds() {
        let test = parse_test(json!({
            "_id": "t1",
            "timeLimit": 1.5,
            "questions": [{ "_id": "q1", "questionText": "?" }]
        }))
        .unwrap();

        assert_eq!(test.time_allowance_secs(), 90);
    }

    #[test]
    fn test_without_questions_is_rejected() {
        let err = parse_test(json!({ "id": "t3", "timeLimitMinutes": 5, "questions": [] }))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTest(_)));
    }

    #[test]
    fn parses_submit_response_spellings() {
        let wrapped: Envelope<SubmitResponseDto> =
            serde_json::from_value(json!({ "data": { "_id": "r1" } })).unwrap();
        let bare: Envelope<SubmitResponseDto> =
            serde_json::from_value(json!({ "resultId": "r2" })).unwrap();

        assert_eq!(ResultId::try_from(wrapped.into_inner()).unwrap().as_str(), "r1");
        assert_eq!(ResultId::try_from(bare.into_inner()).unwrap().as_str(), "r2");
    }

    #[test]
    fn parses_nested_result() {
        let envelope: Envelope<ResultPayload> = serde_json::from_value(json!({
            "data": {
                "testId": "t1",
                "result": { "_id": "r1", "score": 7.5, "correctAnswers": 3, "totalQuestions": 4, "timeSpent": 95 }
            }
        }))
        .unwrap();

        let summary = ResultSummary::try_from(envelope.into_inner()).unwrap();
        assert_eq!(summary.correct_answers, 3);
        assert_eq!(summary.time_spent_seconds, 95);
        assert_eq!(summary.percentage(), 75);
    }
}
