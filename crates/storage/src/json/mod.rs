use async_trait::async_trait;
use quiz_core::model::QuestionBank;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::repository::{QuestionBankRepository, StorageError};

mod mapping;

pub use mapping::{QuestionBankRecord, QuestionRecord, parse_bank};

/// Reads the question bank from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct JsonBankRepository {
    path: PathBuf,
}

impl JsonBankRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QuestionBankRepository for JsonBankRepository {
    async fn load_bank(&self) -> Result<QuestionBank, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "question bank file missing");
                return Err(StorageError::NotFound);
            }
            Err(err) => {
                return Err(StorageError::Io(format!("{}: {err}", self.path.display())));
            }
        };

        let bank = parse_bank(&raw).inspect_err(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "question bank rejected");
        })?;
        tracing::info!(
            path = %self.path.display(),
            questions = bank.len(),
            declared = bank.preview_total(),
            "question bank loaded"
        );
        Ok(bank)
    }
}
