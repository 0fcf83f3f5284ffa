use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_router::use_navigator;
use tracing::debug;

use assess_core::model::QuestionId;
use assess_core::session::Phase;
use services::{LoadOutcome, SessionController};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::QuestionPanel;
use crate::vm::{SessionBanner, TestSessionVm};

/// The controller currently backing the view. Replaced when a failed load is retried.
#[derive(Clone)]
struct SessionSlot(Rc<RefCell<SessionController>>);

impl SessionSlot {
    fn new(controller: SessionController) -> Self {
        Self(Rc::new(RefCell::new(controller)))
    }

    fn current(&self) -> SessionController {
        self.0.borrow().clone()
    }

    fn replace(&self, controller: SessionController) {
        *self.0.borrow_mut() = controller;
    }
}

#[component]
pub fn TestSessionView(test_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let tick_interval = ctx.tick_interval();

    let session = use_hook(|| SessionSlot::new(ctx.new_session()));
    let snapshot = use_signal(|| session.current().snapshot());
    let mut confirm = use_signal(|| None::<String>);

    // Leaving the screen stops the countdown; a submit already sent still completes.
    use_drop({
        let session = session.clone();
        move || session.current().close()
    });

    let loader = use_resource({
        let session = session.clone();
        move || {
            let controller = session.current();
            let test_id = test_id.clone();
            let mut snapshot = snapshot;
            async move {
                let mut updates = controller.subscribe();
                if let Ok(LoadOutcome::Started) = controller.load_test(&test_id).await {
                    controller.start_timer(tick_interval);
                }
                loop {
                    snapshot.set(updates.borrow_and_update().clone());
                    if updates.changed().await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    use_effect(move || {
        let result_id = snapshot.read().result_id.clone();
        if let Some(result_id) = result_id {
            let _ = navigator.replace(Route::TestResult {
                result_id: result_id.to_string(),
            });
        }
    });

    let select = {
        let session = session.clone();
        use_callback(move |(question, option): (QuestionId, String)| {
            session.current().select_answer(&question, &option);
        })
    };
    let navigate = {
        let session = session.clone();
        use_callback(move |index: usize| {
            session.current().navigate_to(index);
        })
    };
    let next = {
        let session = session.clone();
        use_callback(move |()| {
            session.current().next();
        })
    };
    let previous = {
        let session = session.clone();
        use_callback(move |()| {
            session.current().previous();
        })
    };
    let submit = {
        let session = session.clone();
        use_callback(move |()| {
            confirm.set(None);
            let controller = session.current();
            spawn(async move {
                if let Err(err) = controller.submit(false).await {
                    debug!(error = %err, "manual submit failed");
                }
            });
        })
    };
    let request_submit = use_callback(move |()| {
        let vm = TestSessionVm::from_snapshot(&snapshot.read());
        match vm.confirm_prompt() {
            Some(prompt) => confirm.set(Some(prompt)),
            None => submit.call(()),
        }
    });
    let retry = {
        let session = session.clone();
        use_callback(move |banner: SessionBanner| match banner {
            SessionBanner::SubmitFailed => {
                let controller = session.current();
                spawn(async move {
                    if let Err(err) = controller.retry_submit().await {
                        debug!(error = %err, "retried submit failed");
                    }
                });
            }
            SessionBanner::LoadFailed => {
                let fresh = session.current().restart();
                let mut snapshot = snapshot;
                let mut loader = loader;
                snapshot.set(fresh.snapshot());
                session.replace(fresh);
                loader.restart();
            }
        })
    };

    let vm = TestSessionVm::from_snapshot(&snapshot.read());
    let accepts_input = vm.accepts_input();
    let prompt = confirm().filter(|_| accepts_input);

    rsx! {
        div { class: "page test-page",
            header { class: "test-header",
                div { class: "test-header__heading",
                    h2 { "{vm.title}" }
                    if !vm.progress_label.is_empty() {
                        p { class: "muted", "{vm.progress_label}" }
                    }
                }
                div { class: "test-header__stats",
                    span { class: "timer", "{vm.timer_label}" }
                    span { class: "answered", "{vm.answered_label}" }
                }
            }

            if let Some(banner) = vm.banner {
                div { class: "banner banner--error", role: "alert",
                    p { "{banner.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| retry.call(banner),
                        "{banner.retry_label()}"
                    }
                }
            }

            if vm.phase == Phase::Loading {
                p { "Loading..." }
            }

            div { class: "test-layout",
                if let Some(question) = vm.question.clone() {
                    div { class: "test-main",
                        QuestionPanel { question, enabled: accepts_input, on_select: select }
                        div { class: "test-main__nav",
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                disabled: !vm.can_go_previous,
                                onclick: move |_| previous.call(()),
                                "Previous"
                            }
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                disabled: !vm.can_go_next,
                                onclick: move |_| next.call(()),
                                "Next"
                            }
                        }
                    }
                }
                if !vm.navigator.is_empty() {
                    aside { class: "navigator",
                        h3 { "Question Navigator" }
                        div { class: "navigator__grid",
                            for item in vm.navigator.iter().cloned() {
                                button {
                                    key: "{item.index}",
                                    class: item.status.class(),
                                    r#type: "button",
                                    disabled: !accepts_input,
                                    onclick: move |_| navigate.call(item.index),
                                    "{item.label}"
                                }
                            }
                        }
                        ul { class: "navigator__legend",
                            li { class: "legend legend--answered", "Answered" }
                            li { class: "legend legend--current", "Current" }
                            li { class: "legend", "Not Answered" }
                        }
                        button {
                            class: "btn btn-danger submit-btn",
                            r#type: "button",
                            disabled: !vm.can_submit,
                            onclick: move |_| request_submit.call(()),
                            "{vm.submit_label}"
                        }
                    }
                }
            }

            if let Some(prompt) = prompt {
                div { class: "modal-backdrop",
                    div { class: "modal", role: "dialog", aria_modal: "true",
                        h3 { "Confirm Submission" }
                        p { "{prompt}" }
                        div { class: "modal__actions",
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| confirm.set(None),
                                "Cancel"
                            }
                            button {
                                class: "btn btn-danger",
                                r#type: "button",
                                onclick: move |_| submit.call(()),
                                "Submit"
                            }
                        }
                    }
                }
            }
        }
    }
}
