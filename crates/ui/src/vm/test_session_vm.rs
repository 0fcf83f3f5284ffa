use assess_core::countdown::format_hms;
use assess_core::model::QuestionId;
use assess_core::session::{FailureKind, Phase, SessionSnapshot};

const SUBMIT_LABEL: &str = "Submit Test";
const SUBMITTING_LABEL: &str = "Submitting...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigatorStatus {
    Current,
    Answered,
    NotAnswered,
}

impl NavigatorStatus {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Current => "navigator__item navigator__item--current",
            Self::Answered => "navigator__item navigator__item--answered",
            Self::NotAnswered => "navigator__item",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigatorItemVm {
    pub index: usize,
    pub label: String,
    pub status: NavigatorStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub value: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub heading: String,
    pub text: String,
    pub options: Vec<OptionVm>,
}

/// Error shown above the test, with the matching way out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionBanner {
    LoadFailed,
    SubmitFailed,
}

impl SessionBanner {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::LoadFailed => "The test could not be loaded.",
            Self::SubmitFailed => {
                "Your answers could not be submitted. They have been kept, so you can try again."
            }
        }
    }

    #[must_use]
    pub fn retry_label(self) -> &'static str {
        match self {
            Self::LoadFailed => "Reload test",
            Self::SubmitFailed => "Retry submit",
        }
    }
}

/// Everything the test screen renders for one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestSessionVm {
    pub phase: Phase,
    pub title: String,
    pub progress_label: String,
    pub timer_label: String,
    pub answered_label: String,
    pub question: Option<QuestionVm>,
    pub navigator: Vec<NavigatorItemVm>,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub can_submit: bool,
    pub submit_label: &'static str,
    pub unanswered: usize,
    pub banner: Option<SessionBanner>,
}

impl TestSessionVm {
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let total = snapshot.question_count();
        let index = snapshot.current_index;
        let in_progress = snapshot.phase == Phase::InProgress;

        let question = snapshot.current_question().map(|question| QuestionVm {
            id: question.id().clone(),
            heading: format!("Question {}", index + 1),
            text: question.text().to_string(),
            options: question
                .options()
                .iter()
                .map(|option| OptionVm {
                    value: option.clone(),
                    selected: snapshot.answers.get(question.id()) == Some(option.as_str()),
                })
                .collect(),
        });

        let navigator = snapshot
            .test
            .as_ref()
            .map(|test| {
                test.questions()
                    .iter()
                    .enumerate()
                    .map(|(i, question)| NavigatorItemVm {
                        index: i,
                        label: (i + 1).to_string(),
                        status: if i == index {
                            NavigatorStatus::Current
                        } else if snapshot.answers.is_answered(question.id()) {
                            NavigatorStatus::Answered
                        } else {
                            NavigatorStatus::NotAnswered
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();

        let banner = match snapshot.failure {
            Some(FailureKind::Load) => Some(SessionBanner::LoadFailed),
            Some(FailureKind::Submit) => Some(SessionBanner::SubmitFailed),
            None => None,
        };

        Self {
            phase: snapshot.phase,
            title: snapshot
                .test
                .as_ref()
                .map_or_else(|| "Test".to_string(), |test| test.name().to_string()),
            progress_label: if total == 0 {
                String::new()
            } else {
                format!("Question {} of {total}", index + 1)
            },
            timer_label: format_hms(snapshot.remaining_secs),
            answered_label: format!("{}/{total} Answered", snapshot.answers.answered_count()),
            question,
            navigator,
            can_go_previous: in_progress && index > 0,
            can_go_next: in_progress && index + 1 < total,
            can_submit: in_progress,
            submit_label: if snapshot.phase == Phase::Submitting {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            unanswered: snapshot.unanswered_count(),
            banner,
        }
    }

    #[must_use]
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::InProgress
    }

    /// Prompt to show before a manual submit, if any question is still open.
    #[must_use]
    pub fn confirm_prompt(&self) -> Option<String> {
        (self.unanswered > 0).then(|| unanswered_confirmation(self.unanswered))
    }
}

#[must_use]
pub fn unanswered_confirmation(unanswered: usize) -> String {
    format!("You have {unanswered} unanswered questions. Are you sure you want to submit?")
}
