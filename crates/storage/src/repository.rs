use async_trait::async_trait;
use quiz_core::model::QuestionBank;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::json::JsonBankRepository;

/// Errors surfaced by question bank sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("question bank not found")]
    NotFound,

    #[error("failed to read question bank: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid question bank: {0}")]
    Invalid(#[from] quiz_core::Error),

    #[error("question bank lock poisoned: {0}")]
    Poisoned(String),
}

/// Source of the question bank a session draws from.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Load and validate the full question bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no bank is available, or a read,
    /// parse, or validation error.
    async fn load_bank(&self) -> Result<QuestionBank, StorageError>;
}

/// Simple in-memory repository for tests and embedding a fixed bank.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    bank: Arc<Mutex<Option<QuestionBank>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bank(bank: QuestionBank) -> Self {
        Self {
            bank: Arc::new(Mutex::new(Some(bank))),
        }
    }

    /// Replace the stored bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Poisoned` if the lock is poisoned.
    pub fn set_bank(&self, bank: QuestionBank) -> Result<(), StorageError> {
        let mut guard = self
            .bank
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        *guard = Some(bank);
        Ok(())
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryRepository {
    async fn load_bank(&self) -> Result<QuestionBank, StorageError> {
        let guard = self
            .bank
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        guard.clone().ok_or(StorageError::NotFound)
    }
}

/// Bank source behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub banks: Arc<dyn QuestionBankRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(bank: QuestionBank) -> Self {
        Self {
            banks: Arc::new(InMemoryRepository::with_bank(bank)),
        }
    }

    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            banks: Arc::new(JsonBankRepository::new(path)),
        }
    }
}
