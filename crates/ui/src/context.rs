use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use assess_core::model::{StudentId, TestId};
use services::{Clock, ResultSink, ResultSource, SessionController, TestSource};

pub trait UiApp: Send + Sync {
    fn student_id(&self) -> StudentId;
    /// Test opened straight away on launch, if any.
    fn launch_test_id(&self) -> Option<TestId>;
    fn clock(&self) -> Clock;
    fn tick_interval(&self) -> Duration;

    fn tests(&self) -> Arc<dyn TestSource>;
    fn results(&self) -> Arc<dyn ResultSink>;
    fn result_source(&self) -> Arc<dyn ResultSource>;
}

#[derive(Clone)]
pub struct AppContext {
    student_id: StudentId,
    launch_test_id: Option<TestId>,
    open_test_on_launch_once: Arc<AtomicBool>,
    clock: Clock,
    tick_interval: Duration,

    tests: Arc<dyn TestSource>,
    results: Arc<dyn ResultSink>,
    result_source: Arc<dyn ResultSource>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let launch_test_id = app.launch_test_id();
        Self {
            student_id: app.student_id(),
            open_test_on_launch_once: Arc::new(AtomicBool::new(launch_test_id.is_some())),
            launch_test_id,
            clock: app.clock(),
            tick_interval: app.tick_interval(),
            tests: app.tests(),
            results: app.results(),
            result_source: app.result_source(),
        }
    }

    #[must_use]
    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    #[must_use]
    pub fn launch_test_id(&self) -> Option<&TestId> {
        self.launch_test_id.as_ref()
    }

    /// The launch test, the first time it is asked for.
    #[must_use]
    pub fn take_launch_test(&self) -> Option<TestId> {
        if self.open_test_on_launch_once.swap(false, Ordering::AcqRel) {
            self.launch_test_id.clone()
        } else {
            None
        }
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub fn result_source(&self) -> Arc<dyn ResultSource> {
        Arc::clone(&self.result_source)
    }

    /// A fresh, unloaded session for the current student.
    #[must_use]
    pub fn new_session(&self) -> SessionController {
        SessionController::new(
            self.clock.clone(),
            self.student_id.clone(),
            Arc::clone(&self.tests),
            Arc::clone(&self.results),
        )
    }
}

// Provided by the composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
