use dioxus::prelude::*;
use dioxus_router::Router;

use crate::routes::Route;

#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }

        // Window title only; the session header names the open test.
        document::Title { "Assessments" }

        div { class: "app-root",
            // Outside the router, so a crash in any route lands here. An attempt that
            // crashed was never submitted.
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "The assessment stopped unexpectedly" }
                        p { "Answers that were not submitted are lost. Restart the app to begin again." }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
