use thiserror::Error;

use crate::model::{ParseIdError, TestDefinitionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
    #[error(transparent)]
    InvalidTest(#[from] TestDefinitionError),
}
