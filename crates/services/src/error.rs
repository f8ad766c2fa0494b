//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SessionStartError;
use storage::StorageError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no active session")]
    NoActiveSession,
    #[error(transparent)]
    Start(#[from] SessionStartError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
