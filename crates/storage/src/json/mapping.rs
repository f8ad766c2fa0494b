use quiz_core::model::{Question, QuestionBank, QuestionId};
use serde::Deserialize;

use crate::repository::StorageError;

/// On-disk shape of a question bank file.
///
/// ```json
/// { "totalQuestions": 2, "questions": [ { "id": 1, "question": "...",
///   "options": ["A. ...", "B. ...", "C. ...", "D. ..."], "correctAnswer": 0 } ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankRecord {
    #[serde(default)]
    pub total_questions: Option<u32>,
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl QuestionRecord {
    /// Convert the record into a validated domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Invalid` when the record breaks a question rule.
    pub fn into_question(self) -> Result<Question, StorageError> {
        Question::new(
            QuestionId::new(self.id),
            self.question,
            self.options,
            self.correct_answer,
        )
        .map_err(|e| StorageError::Invalid(e.into()))
    }
}

impl QuestionBankRecord {
    /// Convert the record into a validated `QuestionBank`.
    ///
    /// A missing `totalQuestions` falls back to the number of questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Invalid` for the first malformed question, an
    /// empty list, or duplicate ids.
    pub fn into_bank(self) -> Result<QuestionBank, StorageError> {
        let fallback_total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let declared_total = self.total_questions.unwrap_or(fallback_total);
        let questions = self
            .questions
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect::<Result<Vec<_>, _>>()?;
        QuestionBank::new(declared_total, questions).map_err(|e| StorageError::Invalid(e.into()))
    }
}

/// Parse and validate a question bank from JSON text.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON and
/// `StorageError::Invalid` for well-formed JSON that breaks a domain rule.
pub fn parse_bank(json: &str) -> Result<QuestionBank, StorageError> {
    let record: QuestionBankRecord =
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;
    record.into_bank()
}
