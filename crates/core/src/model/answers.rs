use std::collections::BTreeMap;

use crate::model::ids::QuestionId;

/// The student's current selection per question.
///
/// One entry per question at most; selecting again overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerBuffer {
    selections: BTreeMap<QuestionId, String>,
}

impl AnswerBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the selection for `question`.
    ///
    /// Returns the previously selected option, if any.
    pub fn select(&mut self, question: QuestionId, option: impl Into<String>) -> Option<String> {
        self.selections.insert(question, option.into())
    }

    #[must_use]
    pub fn get(&self, question: &QuestionId) -> Option<&str> {
        self.selections.get(question).map(String::as_str)
    }

    #[must_use]
    pub fn is_answered(&self, question: &QuestionId) -> bool {
        self.selections.contains_key(question)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &str)> {
        self.selections.iter().map(|(q, a)| (q, a.as_str()))
    }
}
