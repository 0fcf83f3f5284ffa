use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut test_id = use_signal(|| {
        ctx.launch_test_id()
            .map(ToString::to_string)
            .unwrap_or_default()
    });

    use_effect(move || {
        if let Some(launch) = ctx.take_launch_test() {
            let _ = navigator.replace(Route::TestSession {
                test_id: launch.to_string(),
            });
        }
    });

    let can_start = !test_id.read().trim().is_empty();

    rsx! {
        div { class: "page",
            h2 { "Start a test" }
            p { class: "muted", "Enter the id of the test you were given." }
            form {
                class: "start-form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    let id = test_id.read().trim().to_string();
                    if !id.is_empty() {
                        let _ = navigator.push(Route::TestSession { test_id: id });
                    }
                },
                input {
                    r#type: "text",
                    placeholder: "Test id",
                    value: "{test_id}",
                    oninput: move |evt| test_id.set(evt.value()),
                }
                button { class: "btn btn-primary", r#type: "submit", disabled: !can_start, "Start test" }
            }
        }
    }
}
