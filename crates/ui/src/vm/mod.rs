mod result_vm;
mod test_session_vm;

pub use result_vm::{ResultTone, ResultVm};
pub use test_session_vm::{
    NavigatorItemVm, NavigatorStatus, OptionVm, QuestionVm, SessionBanner, TestSessionVm,
    unanswered_confirmation,
};
