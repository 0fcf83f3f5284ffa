use std::sync::Arc;
use std::time::Duration;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

use assess_core::model::{StudentId, TestId};
use assess_core::time::fixed_clock;
use services::{Clock, InMemoryApi, ResultSink, ResultSource, TestSource};

use crate::context::{UiApp, build_app_context};
use crate::views::{ResultView, TestSessionView};

#[derive(Clone)]
struct TestApp {
    api: InMemoryApi,
}

impl UiApp for TestApp {
    fn student_id(&self) -> StudentId {
        StudentId::new("student-1").expect("student id")
    }

    fn launch_test_id(&self) -> Option<TestId> {
        None
    }

    fn clock(&self) -> Clock {
        fixed_clock()
    }

    fn tick_interval(&self) -> Duration {
        // Long enough that no tick lands inside a test.
        Duration::from_secs(3_600)
    }

    fn tests(&self) -> Arc<dyn TestSource> {
        Arc::new(self.api.clone())
    }

    fn results(&self) -> Arc<dyn ResultSink> {
        Arc::new(self.api.clone())
    }

    fn result_source(&self) -> Arc<dyn ResultSource> {
        Arc::new(self.api.clone())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    TestSession(String),
    Result(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::TestSession(test_id) => rsx! { TestSessionView { test_id } },
        ViewKind::Result(result_id) => rsx! { ResultView { result_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub api: InMemoryApi,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let pending resources resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind, api: InMemoryApi) -> ViewHarness {
    let app = Arc::new(TestApp { api: api.clone() });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness { dom, api }
}
