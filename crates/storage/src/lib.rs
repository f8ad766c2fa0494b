#![forbid(unsafe_code)]

pub mod json;
pub mod repository;

pub use json::JsonBankRepository;
pub use repository::{InMemoryRepository, QuestionBankRepository, Storage, StorageError};
