use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{HomeView, ResultView, TestSessionView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/tests/:test_id", TestSessionView)] TestSession { test_id: String },
        #[route("/results/:result_id", ResultView)] TestResult { result_id: String },
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();
    let student = ctx.student_id().to_string();

    rsx! {
        div { class: "app",
            header { class: "topbar",
                Link { class: "topbar__brand", to: Route::Home {}, "Assessments" }
                span { class: "topbar__student", "Student: {student}" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
