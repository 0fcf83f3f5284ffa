use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use assess_core::Clock;
use assess_core::model::{QuestionId, ResultId, StudentId, TestId};
use assess_core::session::{
    AssessmentSession, PendingSubmit, Phase, SessionSnapshot, SubmitResolution, TickOutcome,
};

use super::timer::TimerHandle;
use crate::api::{ResultSink, TestSource};
use crate::error::{ApiError, SessionError};

/// What became of a submit request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The sink scored the attempt.
    Accepted(ResultId),
    /// Another submit already owns the session, or the session is not running.
    Ignored,
}

/// What became of a load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The test was fetched and the countdown is running.
    Started,
    /// The session was already loaded, failed or closed; nothing was fetched or changed.
    Ignored,
}

struct Inner {
    clock: Clock,
    tests: Arc<dyn TestSource>,
    results: Arc<dyn ResultSink>,
    session: Mutex<AssessmentSession>,
    updates: watch::Sender<SessionSnapshot>,
    timer: Mutex<Option<TimerHandle>>,
    closed: AtomicBool,
}

impl Inner {
    fn session(&self) -> MutexGuard<'_, AssessmentSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the session and publish the resulting snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut AssessmentSession) -> R) -> R {
        let mut session = self.session();
        let out = f(&mut session);
        self.updates.send_replace(session.snapshot());
        out
    }

    fn cancel_timer(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            timer.cancel();
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn resolve(&self, attempt: u32, outcome: &Result<ResultId, ApiError>) {
        if self.is_closed() {
            debug!(attempt, "session closed; ignoring submit resolution");
            return;
        }
        let resolution = match outcome {
            Ok(result_id) => SubmitResolution::Accepted(result_id.clone()),
            Err(_) => SubmitResolution::Rejected,
        };
        let applied = self.update(|session| session.finish_submit(attempt, resolution));
        if !applied {
            debug!(attempt, "stale submit resolution ignored");
        }
    }
}

/// Drives one timed attempt: load, countdown, answer buffer and a single submit.
///
/// Cheap to clone; every clone controls the same session. The session lives until
/// [`SessionController::close`] (or the last clone is dropped). Recovering from a
/// failure means building a fresh controller with [`SessionController::restart`].
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        clock: Clock,
        student_id: StudentId,
        tests: Arc<dyn TestSource>,
        results: Arc<dyn ResultSink>,
    ) -> Self {
        let session = AssessmentSession::loading(student_id);
        let (updates, _) = watch::channel(session.snapshot());
        Self {
            inner: Arc::new(Inner {
                clock,
                tests,
                results,
                session: Mutex::new(session),
                updates,
                timer: Mutex::new(None),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// A new controller for the same student and collaborators. This one is closed.
    #[must_use]
    pub fn restart(&self) -> Self {
        self.close();
        let student_id = self.inner.session().student_id().clone();
        Self::new(
            self.inner.clock.clone(),
            student_id,
            Arc::clone(&self.inner.tests),
            Arc::clone(&self.inner.results),
        )
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.session().snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.session().phase()
    }

    /// Receives a fresh snapshot after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Fetch the test and start the attempt.
    ///
    /// Only a session still `Loading` fetches; any other phase returns
    /// `LoadOutcome::Ignored` without touching the source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` for an empty id or a failed fetch; the session is
    /// then `Failed` and holds nothing but the failure marker.
    pub async fn load_test(&self, test_id: &str) -> Result<LoadOutcome, SessionError> {
        if self.inner.is_closed() || self.phase() != Phase::Loading {
            debug!(test_id, "session not awaiting a test; load ignored");
            return Ok(LoadOutcome::Ignored);
        }
        let test_id = match TestId::new(test_id) {
            Ok(id) => id,
            Err(err) => {
                self.inner.update(AssessmentSession::fail_load);
                return Err(SessionError::Load(err.into()));
            }
        };

        match self.inner.tests.fetch_test(&test_id).await {
            Ok(test) => {
                if self.inner.is_closed() {
                    debug!(%test_id, "session closed while loading");
                    return Ok(LoadOutcome::Ignored);
                }
                let questions = test.question_count();
                let allowance = test.time_allowance_secs();
                let now = self.inner.clock.now();
                let started = self.inner.update(|session| session.begin(Arc::new(test), now));
                if started {
                    info!(%test_id, questions, allowance, "test attempt started");
                    Ok(LoadOutcome::Started)
                } else {
                    debug!(%test_id, "session already loaded; ignoring fetched test");
                    Ok(LoadOutcome::Ignored)
                }
            }
            Err(err) => {
                warn!(%test_id, error = %err, "failed to load test");
                self.inner.update(AssessmentSession::fail_load);
                Err(SessionError::Load(err))
            }
        }
    }

    /// Returns `false` when the selection was ignored.
    pub fn select_answer(&self, question: &QuestionId, option: &str) -> bool {
        self.inner
            .update(|session| session.select_answer(question, option))
    }

    pub fn navigate_to(&self, index: usize) -> bool {
        self.inner.update(|session| session.navigate_to(index))
    }

    pub fn next(&self) -> bool {
        self.inner.update(AssessmentSession::next)
    }

    pub fn previous(&self) -> bool {
        self.inner.update(AssessmentSession::previous)
    }

    /// Observe the clock once. Reaching zero starts the auto-submit in the same call.
    ///
    /// Returns the phase after the tick. Must run inside a tokio runtime.
    pub fn tick(&self) -> Phase {
        let now = self.inner.clock.now();
        let outcome = self.inner.update(|session| session.tick(now));
        match outcome {
            TickOutcome::Expired(pending) => {
                info!(attempt = pending.attempt, "time is up; submitting automatically");
                self.inner.cancel_timer();
                // Detached: the auto-submit resolves through `Inner::resolve`.
                drop(self.dispatch(pending));
                Phase::Submitting
            }
            TickOutcome::Running { .. } => Phase::InProgress,
            TickOutcome::Idle => self.phase(),
        }
    }

    /// Submit the buffered answers.
    ///
    /// Only the first call while `InProgress` reaches the sink; later or concurrent
    /// calls return `SubmitOutcome::Ignored`. Unanswered questions do not block.
    ///
    /// The request runs detached, so dropping this future does not abort it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` when the sink fails; the answers are kept and
    /// [`SessionController::retry_submit`] re-sends the same payload.
    pub async fn submit(&self, auto_submit: bool) -> Result<SubmitOutcome, SessionError> {
        let now = self.inner.clock.now();
        let Some(pending) = self
            .inner
            .update(|session| session.begin_submit(now, auto_submit))
        else {
            debug!(auto_submit, "submit ignored; session not in progress");
            return Ok(SubmitOutcome::Ignored);
        };
        self.inner.cancel_timer();
        info!(
            attempt = pending.attempt,
            auto_submit,
            unanswered = pending.submission.unanswered_count(),
            "submitting answers"
        );
        self.await_dispatch(pending).await
    }

    /// Re-send the payload of a failed submit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` if the sink fails again.
    pub async fn retry_submit(&self) -> Result<SubmitOutcome, SessionError> {
        let Some(pending) = self.inner.update(AssessmentSession::retry_submit) else {
            debug!("retry ignored; no failed submit to resend");
            return Ok(SubmitOutcome::Ignored);
        };
        info!(attempt = pending.attempt, "retrying submission");
        self.await_dispatch(pending).await
    }

    async fn await_dispatch(&self, pending: PendingSubmit) -> Result<SubmitOutcome, SessionError> {
        match self.dispatch(pending).await {
            Ok(Ok(result_id)) => Ok(SubmitOutcome::Accepted(result_id)),
            Ok(Err(err)) => Err(SessionError::Submit(err)),
            Err(join_err) => {
                warn!(error = %join_err, "submission task did not complete");
                Err(SessionError::Interrupted)
            }
        }
    }

    fn dispatch(&self, pending: PendingSubmit) -> JoinHandle<Result<ResultId, ApiError>> {
        let inner = Arc::clone(&self.inner);
        let test_id = inner
            .session()
            .test()
            .map(|test| test.id().clone());

        tokio::spawn(async move {
            let Some(test_id) = test_id else {
                inner.resolve(pending.attempt, &Err(ApiError::NotFound));
                return Err(ApiError::NotFound);
            };
            let outcome = inner.results.submit(&test_id, &pending.submission).await;
            match &outcome {
                Ok(result_id) => info!(%test_id, %result_id, "submission accepted"),
                Err(err) => warn!(%test_id, error = %err, "submission failed"),
            }
            inner.resolve(pending.attempt, &outcome);
            outcome
        })
    }

    /// Start the periodic countdown. Replaces (and cancels) any running timer.
    ///
    /// The task holds only a weak reference to the session and stops as soon as the
    /// session leaves `InProgress`, is closed, or is dropped.
    pub fn start_timer(&self, period: Duration) {
        if self.inner.is_closed() {
            return;
        }
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let timer = TimerHandle::spawn(period, move || {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            if inner.is_closed() {
                return false;
            }
            SessionController { inner }.tick() == Phase::InProgress
        });
        let previous = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        drop(previous);
    }

    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Tear down: stop the timer and ignore any submit that resolves later.
    ///
    /// An in-flight submit request is not aborted.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!("session controller closed");
        }
        self.inner.cancel_timer();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
