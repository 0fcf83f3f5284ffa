mod answers;
pub mod grading;
mod ids;
mod submission;
mod test_definition;

pub use ids::{AnswerCopyId, ParseIdError, QuestionId, ResultId, StudentId, TestId, TopicId};

pub use answers::AnswerBuffer;
pub use grading::{
    LetterGrade, Recommendation, ResultSummary, RubricItem, ScoreSheet, ScoreSheetError,
    percentage,
};
pub use submission::{Submission, SubmittedAnswer, UNANSWERED};
pub use test_definition::{
    DEFAULT_TIME_ALLOWANCE_SECS, Question, TestDefinition, TestDefinitionError, TimeAllowance,
};
