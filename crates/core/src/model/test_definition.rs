use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{QuestionId, TestId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestDefinitionError {
    #[error("test has no questions")]
    NoQuestions,

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),
}

//
// ─── TIME ALLOWANCE ────────────────────────────────────────────────────────────
//

/// Allowance applied when the backend sends no usable limit (one hour).
pub const DEFAULT_TIME_ALLOWANCE_SECS: u32 = 3_600;

/// Total time a student has for one attempt, normalized to seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAllowance(u32);

impl TimeAllowance {
    /// Normalizes a limit expressed in minutes.
    ///
    /// Fractional minutes round to the nearest second. A missing, zero, negative or
    /// non-finite limit falls back to [`DEFAULT_TIME_ALLOWANCE_SECS`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_minutes(minutes: Option<f64>) -> Self {
        match minutes {
            Some(m) if m.is_finite() && m > 0.0 => {
                Self::from_secs((m * 60.0).round().min(f64::from(u32::MAX)) as u32)
            }
            _ => Self(DEFAULT_TIME_ALLOWANCE_SECS),
        }
    }

    /// Allowance in seconds. Zero falls back to the default.
    #[must_use]
    pub fn from_secs(secs: u32) -> Self {
        if secs == 0 {
            Self(DEFAULT_TIME_ALLOWANCE_SECS)
        } else {
            Self(secs)
        }
    }

    #[must_use]
    pub fn secs(self) -> u32 {
        self.0
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question as delivered to the client.
///
/// Answer keys and point values stay on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            id,
            text: text.into(),
            options,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

//
// ─── TEST DEFINITION ───────────────────────────────────────────────────────────
//

/// Immutable description of a test: its questions and time allowance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    id: TestId,
    name: String,
    allowance: TimeAllowance,
    questions: Vec<Question>,
}

impl TestDefinition {
    /// Creates a validated test definition.
    ///
    /// # Errors
    ///
    /// Returns `TestDefinitionError::NoQuestions` for an empty question list and
    /// `DuplicateQuestion` when two questions share an id.
    pub fn new(
        id: TestId,
        name: impl Into<String>,
        allowance: TimeAllowance,
        questions: Vec<Question>,
    ) -> Result<Self, TestDefinitionError> {
        if questions.is_empty() {
            return Err(TestDefinitionError::NoQuestions);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(TestDefinitionError::DuplicateQuestion(question.id().clone()));
            }
        }

        let name = name.into();
        let name = if name.trim().is_empty() {
            "Test".to_string()
        } else {
            name
        };

        Ok(Self {
            id,
            name,
            allowance,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &TestId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn time_allowance_secs(&self) -> u32 {
        self.allowance.secs()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Always at least one.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn find_question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn contains_question(&self, id: &QuestionId) -> bool {
        self.find_question(id).is_some()
    }
}
