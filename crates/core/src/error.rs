use thiserror::Error;

use crate::model::{BankError, ConfigError, QuestionError, SessionStartError};

/// Umbrella error for callers that don't care which domain rule failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    SessionStart(#[from] SessionStartError),
}
