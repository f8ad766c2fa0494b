use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank has no questions")]
    Empty,

    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// The full, immutable pool of questions a session draws from.
///
/// `declared_total` is whatever the source advertised and is only meant for a
/// pre-session preview; [`QuestionBank::len`] is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    declared_total: u32,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from already-validated questions.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Empty` for an empty list and `BankError::DuplicateId`
    /// when two questions share an id.
    pub fn new(declared_total: u32, questions: Vec<Question>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(BankError::DuplicateId(question.id()));
            }
        }

        Ok(Self {
            declared_total,
            questions,
        })
    }

    /// Total advertised by the bank source, for display before a session starts.
    #[must_use]
    pub fn preview_total(&self) -> u32 {
        self.declared_total
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed bank; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }
}
