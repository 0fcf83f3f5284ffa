#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod grading_service;
pub mod sessions;

pub use assess_core::Clock;
pub use sessions as session;

pub use api::{GradeSink, HttpApi, InMemoryApi, ResultSink, ResultSource, TestSource};
pub use config::ClientConfig;
pub use error::{ApiError, SessionError};
pub use grading_service::{GradeSubmission, GradingService};
pub use sessions::{LoadOutcome, SessionController, SubmitOutcome, TimerHandle};
