use assess_core::model::QuestionId;
use dioxus::prelude::*;

use crate::vm::QuestionVm;

/// One question with its options as radio buttons.
#[component]
pub fn QuestionPanel(
    question: QuestionVm,
    enabled: bool,
    on_select: EventHandler<(QuestionId, String)>,
) -> Element {
    let group = format!("question-{}", question.id);

    rsx! {
        section { class: "question-panel",
            span { class: "question-panel__heading", "{question.heading}" }
            h3 { class: "question-panel__text", "{question.text}" }
            div { class: "question-panel__options", role: "radiogroup",
                for option in question.options.iter().cloned() {
                    label {
                        key: "{option.value}",
                        class: if option.selected { "option option--selected" } else { "option" },
                        input {
                            r#type: "radio",
                            name: "{group}",
                            value: "{option.value}",
                            checked: option.selected,
                            disabled: !enabled,
                            onchange: {
                                let id = question.id.clone();
                                let value = option.value.clone();
                                move |_| on_select.call((id.clone(), value.clone()))
                            },
                        }
                        span { "{option.value}" }
                    }
                }
            }
        }
    }
}
