mod home;
mod question_panel;
mod result;
mod state;
mod test_session;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use home::HomeView;
pub use question_panel::QuestionPanel;
pub use result::ResultView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use test_session::TestSessionView;
