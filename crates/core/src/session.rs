use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::countdown::Countdown;
use crate::model::{
    AnswerBuffer, Question, QuestionId, ResultId, StudentId, Submission, TestDefinition,
};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one timed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Loading,
    InProgress,
    Submitting,
    Submitted,
    Failed,
}

/// What put the session into `Phase::Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The test definition could not be fetched. Recovery starts a fresh session.
    Load,
    /// The result sink failed. Answers are kept and the same payload can be re-sent.
    Submit,
}

//
// ─── SUBMIT PLUMBING ───────────────────────────────────────────────────────────
//

/// A submission that has claimed the session's single in-flight slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSubmit {
    pub attempt: u32,
    pub submission: Submission,
}

/// How the result sink answered a [`PendingSubmit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitResolution {
    Accepted(ResultId),
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is not running; nothing changed.
    Idle,
    Running { remaining_secs: u32 },
    /// This tick reached zero and claimed the submit slot.
    Expired(PendingSubmit),
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Cheap copy of everything a view needs to render one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub failure: Option<FailureKind>,
    pub test: Option<Arc<TestDefinition>>,
    pub answers: AnswerBuffer,
    pub remaining_secs: u32,
    pub current_index: usize,
    pub result_id: Option<ResultId>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.test.as_ref()?.question(self.current_index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.test.as_ref().map_or(0, |t| t.question_count())
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.question_count()
            .saturating_sub(self.answers.answered_count())
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One student's attempt at one test.
///
/// Purely synchronous: callers pass `now` from the services clock and perform the
/// network I/O themselves between `begin_submit` and `finish_submit`.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    student_id: StudentId,
    phase: Phase,
    failure: Option<FailureKind>,
    test: Option<Arc<TestDefinition>>,
    answers: AnswerBuffer,
    countdown: Option<Countdown>,
    current_index: usize,
    attempt: u32,
    last_submission: Option<Submission>,
    result_id: Option<ResultId>,
}

impl AssessmentSession {
    /// A session waiting for its test definition.
    #[must_use]
    pub fn loading(student_id: StudentId) -> Self {
        Self {
            student_id,
            phase: Phase::Loading,
            failure: None,
            test: None,
            answers: AnswerBuffer::new(),
            countdown: None,
            current_index: 0,
            attempt: 0,
            last_submission: None,
            result_id: None,
        }
    }

    /// Install the fetched test and start the clock.
    ///
    /// Returns `false` (and changes nothing) unless the session is `Loading`.
    pub fn begin(&mut self, test: Arc<TestDefinition>, now: DateTime<Utc>) -> bool {
        if self.phase != Phase::Loading {
            return false;
        }
        self.countdown = Some(Countdown::start(now, test.time_allowance_secs()));
        self.test = Some(test);
        self.current_index = 0;
        self.phase = Phase::InProgress;
        true
    }

    /// The test could not be loaded. Nothing but the failure marker is kept.
    pub fn fail_load(&mut self) -> bool {
        if self.phase != Phase::Loading {
            return false;
        }
        self.test = None;
        self.countdown = None;
        self.answers = AnswerBuffer::new();
        self.current_index = 0;
        self.phase = Phase::Failed;
        self.failure = Some(FailureKind::Load);
        true
    }

    /// Record the student's choice for a question of this test.
    ///
    /// Ignored outside `InProgress` and for questions the test does not contain.
    pub fn select_answer(&mut self, question: &QuestionId, option: impl Into<String>) -> bool {
        if self.phase != Phase::InProgress {
            return false;
        }
        let Some(test) = self.test.as_ref() else {
            return false;
        };
        if !test.contains_question(question) {
            return false;
        }
        self.answers.select(question.clone(), option);
        true
    }

    /// Move to the question at `index`; out-of-range indexes are ignored.
    pub fn navigate_to(&mut self, index: usize) -> bool {
        if index < self.question_count() {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        self.navigate_to(self.current_index.saturating_add(1))
    }

    pub fn previous(&mut self) -> bool {
        match self.current_index.checked_sub(1) {
            Some(index) => self.navigate_to(index),
            None => false,
        }
    }

    /// Observe the clock.
    ///
    /// The tick that brings the remaining time to zero also claims the submit slot,
    /// so no caller can see `InProgress` with nothing left on the clock.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.phase != Phase::InProgress {
            return TickOutcome::Idle;
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return TickOutcome::Idle;
        };
        let remaining_secs = countdown.tick(now);
        if remaining_secs > 0 {
            return TickOutcome::Running { remaining_secs };
        }
        match self.claim_submit(true) {
            Some(pending) => TickOutcome::Expired(pending),
            None => TickOutcome::Idle,
        }
    }

    /// Claim the single in-flight submit slot and build the payload.
    ///
    /// Returns `None` unless the session is `InProgress`; a second submit racing the
    /// first (a click landing on the expiring tick) is dropped here.
    pub fn begin_submit(&mut self, now: DateTime<Utc>, auto_submit: bool) -> Option<PendingSubmit> {
        if self.phase != Phase::InProgress {
            return None;
        }
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.tick(now);
        }
        self.claim_submit(auto_submit)
    }

    fn claim_submit(&mut self, auto_submit: bool) -> Option<PendingSubmit> {
        let test = self.test.as_ref()?;
        let elapsed = self.countdown.as_ref().map_or(0, Countdown::elapsed_secs);
        let submission = Submission::build(
            test,
            &self.answers,
            self.student_id.clone(),
            elapsed,
            auto_submit,
        );

        self.phase = Phase::Submitting;
        self.attempt = self.attempt.saturating_add(1);
        self.last_submission = Some(submission.clone());

        Some(PendingSubmit {
            attempt: self.attempt,
            submission,
        })
    }

    /// Apply the sink's answer to the submit identified by `attempt`.
    ///
    /// Stale or unexpected resolutions are ignored and return `false`.
    pub fn finish_submit(&mut self, attempt: u32, resolution: SubmitResolution) -> bool {
        if self.phase != Phase::Submitting || attempt != self.attempt {
            return false;
        }
        match resolution {
            SubmitResolution::Accepted(result_id) => {
                self.result_id = Some(result_id);
                self.phase = Phase::Submitted;
                self.failure = None;
            }
            SubmitResolution::Rejected => {
                self.phase = Phase::Failed;
                self.failure = Some(FailureKind::Submit);
            }
        }
        true
    }

    /// Re-send the payload of a failed submit.
    ///
    /// The answers and elapsed time are those of the first attempt.
    pub fn retry_submit(&mut self) -> Option<PendingSubmit> {
        if self.phase != Phase::Failed || self.failure != Some(FailureKind::Submit) {
            return None;
        }
        let submission = self.last_submission.clone()?;
        self.phase = Phase::Submitting;
        self.failure = None;
        self.attempt = self.attempt.saturating_add(1);
        Some(PendingSubmit {
            attempt: self.attempt,
            submission,
        })
    }

    #[must_use]
    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    #[must_use]
    pub fn test(&self) -> Option<&Arc<TestDefinition>> {
        self.test.as_ref()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerBuffer {
        &self.answers
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.as_ref().map_or(0, Countdown::remaining_secs)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.countdown.as_ref().map(Countdown::deadline)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.test.as_ref()?.question(self.current_index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.test.as_ref().map_or(0, |t| t.question_count())
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.question_count().saturating_sub(self.answered_count())
    }

    #[must_use]
    pub fn last_submission(&self) -> Option<&Submission> {
        self.last_submission.as_ref()
    }

    #[must_use]
    pub fn result_id(&self) -> Option<&ResultId> {
        self.result_id.as_ref()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            failure: self.failure,
            test: self.test.clone(),
            answers: self.answers.clone(),
            remaining_secs: self.remaining_secs(),
            current_index: self.current_index,
            result_id: self.result_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::model::{TestId, TimeAllowance};
    use crate::time::fixed_now;

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn two_question_test(allowance_secs: u32) -> Arc<TestDefinition> {
        let questions = vec![
            Question::new(qid("q1"), "First", vec!["A".into(), "B".into()]),
            Question::new(qid("q2"), "Second", vec!["A".into(), "B".into()]),
        ];
        Arc::new(
            TestDefinition::new(
                TestId::new("t1").unwrap(),
                "Quiz",
                TimeAllowance::from_secs(allowance_secs),
                questions,
            )
            .unwrap(),
        )
    }

    fn started(allowance_secs: u32) -> AssessmentSession {
        let mut session = AssessmentSession::loading(StudentId::new("s1").unwrap());
        assert!(session.begin(two_question_test(allowance_secs), fixed_now()));
        session
    }

    fn at(secs: i64) -> DateTime<Utc> {
        fixed_now() + Duration::seconds(secs)
    }

    #[test]
    fn begin_starts_in_progress_with_full_allowance() {
        let session = started(60);
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.remaining_secs(), 60);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_question().unwrap().id(), &qid("q1"));
    }

    #[test]
    fn failed_load_keeps_only_the_marker() {
        let mut session = AssessmentSession::loading(StudentId::new("s1").unwrap());
        assert!(session.fail_load());

        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.failure(), Some(FailureKind::Load));
        assert!(session.test().is_none());
        assert_eq!(session.remaining_secs(), 0);
        assert!(session.answers().is_empty());
        assert!(session.retry_submit().is_none());
    }

    #[test]
    fn reselecting_leaves_one_entry() {
        let mut session = started(60);
        assert!(session.select_answer(&qid("q1"), "A"));
        assert!(session.select_answer(&qid("q1"), "B"));

        assert_eq!(session.answered_count(), 1);
        assert_eq!(session.answers().get(&qid("q1")), Some("B"));
    }

    #[test]
    fn unknown_question_is_not_buffered() {
        let mut session = started(60);
        assert!(!session.select_answer(&qid("nope"), "A"));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn selecting_outside_in_progress_is_a_no_op() {
        let mut session = AssessmentSession::loading(StudentId::new("s1").unwrap());
        assert!(!session.select_answer(&qid("q1"), "A"));

        let mut session = started(60);
        session.begin_submit(at(1), false).unwrap();
        assert!(!session.select_answer(&qid("q1"), "A"));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn navigation_is_bounds_checked() {
        let mut session = started(60);
        assert!(!session.previous());
        assert!(session.next());
        assert_eq!(session.current_index(), 1);
        assert!(!session.next());
        assert!(!session.navigate_to(2));
        assert_eq!(session.current_index(), 1);
        assert!(session.navigate_to(0));
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn remaining_is_non_increasing_and_expiry_submits_on_the_same_tick() {
        let mut session = started(60);
        let mut last = session.remaining_secs();

        for second in 1..60 {
            match session.tick(at(second)) {
                TickOutcome::Running { remaining_secs } => {
                    assert!(remaining_secs <= last);
                    last = remaining_secs;
                }
                other => panic!("unexpected outcome at {second}s: {other:?}"),
            }
            assert_eq!(session.phase(), Phase::InProgress);
        }
        assert_eq!(last, 1);

        let TickOutcome::Expired(pending) = session.tick(at(60)) else {
            panic!("expected expiry");
        };
        assert_eq!(session.remaining_secs(), 0);
        assert_eq!(session.phase(), Phase::Submitting);
        assert!(pending.submission.auto_submitted);
        assert_eq!(session.tick(at(61)), TickOutcome::Idle);
    }

    #[test]
    fn expiry_submits_every_question_with_sentinel_for_unanswered() {
        let mut session = started(60);
        session.tick(at(10));
        session.select_answer(&qid("q1"), "B");

        let mut expired = None;
        for second in 11..=60 {
            if let TickOutcome::Expired(pending) = session.tick(at(second)) {
                expired = Some(pending);
            }
        }
        let pending = expired.expect("auto-submit at t=60");

        assert_eq!(pending.submission.answers.len(), 2);
        assert_eq!(pending.submission.answer_for(&qid("q1")), Some("B"));
        assert_eq!(pending.submission.answer_for(&qid("q2")), Some(""));
        assert_eq!(pending.submission.time_spent_seconds, 60);
    }

    #[test]
    fn second_submit_is_dropped() {
        let mut session = started(60);
        let first = session.begin_submit(at(5), false);
        let second = session.begin_submit(at(5), true);

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(session.phase(), Phase::Submitting);
    }

    #[test]
    fn manual_submit_reports_elapsed_time() {
        let mut session = started(60);
        session.select_answer(&qid("q1"), "A");
        session.select_answer(&qid("q2"), "B");
        for second in 1..=15 {
            session.tick(at(second));
        }
        assert_eq!(session.remaining_secs(), 45);

        let pending = session.begin_submit(at(15), false).unwrap();
        assert_eq!(pending.submission.time_spent_seconds, 15);
        assert_eq!(pending.submission.unanswered_count(), 0);

        let result = ResultId::new("r1").unwrap();
        assert!(session.finish_submit(pending.attempt, SubmitResolution::Accepted(result.clone())));
        assert_eq!(session.phase(), Phase::Submitted);
        assert_eq!(session.result_id(), Some(&result));
    }

    #[test]
    fn rejected_submit_keeps_answers_and_retries_the_same_payload() {
        let mut session = started(60);
        session.select_answer(&qid("q2"), "A");
        let pending = session.begin_submit(at(20), false).unwrap();

        assert!(session.finish_submit(pending.attempt, SubmitResolution::Rejected));
        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.failure(), Some(FailureKind::Submit));
        assert_eq!(session.answers().get(&qid("q2")), Some("A"));

        let retry = session.retry_submit().unwrap();
        assert_eq!(retry.submission, pending.submission);
        assert_ne!(retry.attempt, pending.attempt);
        assert_eq!(session.phase(), Phase::Submitting);
    }

    #[test]
    fn stale_resolution_is_ignored() {
        let mut session = started(60);
        let first = session.begin_submit(at(1), false).unwrap();
        session.finish_submit(first.attempt, SubmitResolution::Rejected);
        let retry = session.retry_submit().unwrap();

        assert!(!session.finish_submit(first.attempt, SubmitResolution::Rejected));
        assert_eq!(session.phase(), Phase::Submitting);
        assert!(session.finish_submit(
            retry.attempt,
            SubmitResolution::Accepted(ResultId::new("r").unwrap())
        ));
    }

    #[test]
    fn snapshot_reflects_session() {
        let mut session = started(60);
        session.select_answer(&qid("q1"), "A");
        session.next();
        let snapshot = session.snapshot();

        assert_eq!(snapshot.phase, Phase::InProgress);
        assert_eq!(snapshot.question_count(), 2);
        assert_eq!(snapshot.unanswered_count(), 1);
        assert_eq!(snapshot.current_question().unwrap().id(), &qid("q2"));
    }
}
