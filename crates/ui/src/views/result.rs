use dioxus::prelude::*;
use dioxus_router::Link;

use assess_core::model::ResultId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::ResultVm;

#[component]
pub fn ResultView(result_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let results = ctx.result_source();

    let mut resource = use_resource(move || {
        let results = results.clone();
        let result_id = result_id.clone();
        async move {
            let id = ResultId::new(result_id).map_err(|_| ViewError::NotFound)?;
            let summary = results
                .fetch_result(&id)
                .await
                .map_err(|err| ViewError::from(&err))?;
            Ok(ResultVm::from(&summary))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page result-page",
            h2 { "Test Result" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(vm) => rsx! {
                    div { class: "result-grid",
                        div { class: "result-card {vm.tone.class()}",
                            h3 { "Score" }
                            p { class: "result-card__value", "{vm.score_label}" }
                            p { "{vm.percentage_label}" }
                        }
                        div { class: "result-card",
                            h3 { "Correct" }
                            p { class: "result-card__value", "{vm.correct}" }
                        }
                        div { class: "result-card",
                            h3 { "Incorrect" }
                            p { class: "result-card__value", "{vm.incorrect}" }
                        }
                        div { class: "result-card",
                            h3 { "Time Taken" }
                            p { class: "result-card__value", "{vm.time_label}" }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
            }

            Link { class: "btn btn-secondary", to: Route::Home {}, "Back to start" }
        }
    }
}
