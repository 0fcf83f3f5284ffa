mod controller;
mod timer;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{LoadOutcome, SessionController, SubmitOutcome};
pub use timer::TimerHandle;
