use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{QuestionId, ResultId, TopicId};

//
// ─── PERCENTAGE & GRADES ───────────────────────────────────────────────────────
//

/// Rounded percentage of `correct` over `total`; 0 when `total` is 0.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn percentage(correct: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// Grade scale used for scored online tests.
    #[must_use]
    pub fn for_result(percentage: u32) -> Self {
        match percentage {
            90.. => Self::APlus,
            80..=89 => Self::A,
            70..=79 => Self::B,
            60..=69 => Self::C,
            50..=59 => Self::D,
            _ => Self::F,
        }
    }

    /// Grade scale used when an instructor marks a physical answer copy.
    #[must_use]
    pub fn for_rubric(percentage: u32) -> Self {
        match percentage {
            90.. => Self::APlus,
            80..=89 => Self::A,
            70..=79 => Self::BPlus,
            60..=69 => Self::B,
            50..=59 => Self::C,
            40..=49 => Self::D,
            _ => Self::F,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── RESULT SUMMARY ────────────────────────────────────────────────────────────
//

/// Scored outcome of one submission, as returned by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub id: ResultId,
    pub score: f64,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub time_spent_seconds: u32,
}

impl ResultSummary {
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(
            u64::from(self.correct_answers),
            u64::from(self.total_questions),
        )
    }

    #[must_use]
    pub fn grade(&self) -> LetterGrade {
        LetterGrade::for_result(self.percentage())
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.total_questions.saturating_sub(self.correct_answers)
    }
}

//
// ─── SCORE SHEET ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreSheetError {
    #[error("question {0} is not on this score sheet")]
    UnknownQuestion(QuestionId),

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),
}

/// A question on a physical test together with the marks it is worth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricItem {
    pub question_id: QuestionId,
    pub topic_id: Option<TopicId>,
    pub max_score: u32,
}

/// Question the student did not get full marks on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub question_id: QuestionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<TopicId>,
    pub score: u32,
}

/// Per-question marks an instructor awards to a scanned answer copy.
///
/// Every score is kept within `[0, max_score]` of its question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSheet {
    items: Vec<RubricItem>,
    scores: BTreeMap<QuestionId, u32>,
}

impl ScoreSheet {
    /// # Errors
    ///
    /// Returns `ScoreSheetError::DuplicateQuestion` when a question is listed twice.
    pub fn new(items: Vec<RubricItem>) -> Result<Self, ScoreSheetError> {
        let mut scores = BTreeMap::new();
        for item in &items {
            if scores.insert(item.question_id.clone(), 0).is_some() {
                return Err(ScoreSheetError::DuplicateQuestion(item.question_id.clone()));
            }
        }
        Ok(Self { items, scores })
    }

    fn item(&self, question: &QuestionId) -> Result<&RubricItem, ScoreSheetError> {
        self.items
            .iter()
            .find(|item| &item.question_id == question)
            .ok_or_else(|| ScoreSheetError::UnknownQuestion(question.clone()))
    }

    /// Record marks for a question, clamped to the question's maximum.
    ///
    /// Negative input is clamped to 0. Returns the stored value.
    ///
    /// # Errors
    ///
    /// Returns `ScoreSheetError::UnknownQuestion` for a question not on the sheet.
    pub fn set_score(&mut self, question: &QuestionId, value: i64) -> Result<u32, ScoreSheetError> {
        let max = self.item(question)?.max_score;
        let clamped = u32::try_from(value.clamp(0, i64::from(max))).unwrap_or(max);
        self.scores.insert(question.clone(), clamped);
        Ok(clamped)
    }

    /// # Errors
    ///
    /// Returns `ScoreSheetError::UnknownQuestion` for a question not on the sheet.
    pub fn mark_right(&mut self, question: &QuestionId) -> Result<u32, ScoreSheetError> {
        let max = self.item(question)?.max_score;
        self.set_score(question, i64::from(max))
    }

    /// # Errors
    ///
    /// Returns `ScoreSheetError::UnknownQuestion` for a question not on the sheet.
    pub fn mark_wrong(&mut self, question: &QuestionId) -> Result<u32, ScoreSheetError> {
        self.set_score(question, 0)
    }

    #[must_use]
    pub fn score(&self, question: &QuestionId) -> Option<u32> {
        self.scores.get(question).copied()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.scores.values().copied().map(u64::from).sum()
    }

    #[must_use]
    pub fn total_possible(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.max_score)).sum()
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.total(), self.total_possible())
    }

    #[must_use]
    pub fn grade(&self) -> LetterGrade {
        LetterGrade::for_rubric(self.percentage())
    }

    /// Questions scored below full marks, in sheet order.
    #[must_use]
    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.items
            .iter()
            .filter_map(|item| {
                let score = self.score(&item.question_id).unwrap_or(0);
                (score < item.max_score).then(|| Recommendation {
                    question_id: item.question_id.clone(),
                    topic_id: item.topic_id.clone(),
                    score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn sheet() -> ScoreSheet {
        ScoreSheet::new(vec![
            RubricItem {
                question_id: qid("q1"),
                topic_id: Some(TopicId::new("algebra").unwrap()),
                max_score: 5,
            },
            RubricItem {
                question_id: qid("q2"),
                topic_id: None,
                max_score: 5,
            },
        ])
        .unwrap()
    }

    #[test]
    fn percentage_rounds_and_handles_zero_total() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn grade_buckets() {
        assert_eq!(LetterGrade::for_result(90), LetterGrade::APlus);
        assert_eq!(LetterGrade::for_result(75), LetterGrade::B);
        assert_eq!(LetterGrade::for_result(49), LetterGrade::F);
        assert_eq!(LetterGrade::for_rubric(75), LetterGrade::BPlus);
        assert_eq!(LetterGrade::for_rubric(45), LetterGrade::D);
        assert_eq!(LetterGrade::for_rubric(39), LetterGrade::F);
    }

    #[test]
    fn scores_are_clamped_to_question_marks() {
        let mut sheet = sheet();
        assert_eq!(sheet.set_score(&qid("q1"), 9).unwrap(), 5);
        assert_eq!(sheet.set_score(&qid("q2"), -3).unwrap(), 0);
        assert_eq!(sheet.total(), 5);
        assert_eq!(sheet.total_possible(), 10);
        assert_eq!(sheet.percentage(), 50);
        assert_eq!(sheet.grade(), LetterGrade::C);
    }

    #[test]
    fn totals_hold_marks_beyond_u32() {
        let mut sheet = ScoreSheet::new(vec![
            RubricItem {
                question_id: qid("q1"),
                topic_id: None,
                max_score: u32::MAX,
            },
            RubricItem {
                question_id: qid("q2"),
                topic_id: None,
                max_score: 1,
            },
        ])
        .unwrap();
        sheet.set_score(&qid("q1"), 1).unwrap();
        sheet.mark_right(&qid("q2")).unwrap();

        assert_eq!(sheet.total(), 2);
        assert_eq!(sheet.total_possible(), u64::from(u32::MAX) + 1);
        assert_eq!(sheet.percentage(), 0);
        assert_eq!(sheet.grade(), LetterGrade::F);

        sheet.mark_right(&qid("q1")).unwrap();
        assert_eq!(sheet.total(), u64::from(u32::MAX) + 1);
        assert_eq!(sheet.percentage(), 100);
    }

    #[test]
    fn recommendations_track_partial_marks() {
        let mut sheet = sheet();
        sheet.set_score(&qid("q1"), 3).unwrap();
        sheet.mark_right(&qid("q2")).unwrap();

        let recs = sheet.recommendations();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].question_id, qid("q1"));
        assert_eq!(recs[0].score, 3);

        sheet.mark_right(&qid("q1")).unwrap();
        assert!(sheet.recommendations().is_empty());

        sheet.mark_wrong(&qid("q2")).unwrap();
        assert_eq!(sheet.recommendations()[0].score, 0);
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut sheet = sheet();
        let err = sheet.set_score(&qid("q9"), 1).unwrap_err();
        assert_eq!(err, ScoreSheetError::UnknownQuestion(qid("q9")));
    }

    #[test]
    fn result_summary_grade() {
        let summary = ResultSummary {
            id: ResultId::new("r1").unwrap(),
            score: 8.0,
            correct_answers: 8,
            total_questions: 10,
            time_spent_seconds: 120,
        };
        assert_eq!(summary.percentage(), 80);
        assert_eq!(summary.grade(), LetterGrade::A);
        assert_eq!(summary.incorrect_answers(), 2);
    }
}
