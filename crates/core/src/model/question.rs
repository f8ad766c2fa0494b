use serde::Serialize;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

const OPTION_LETTERS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} has empty text")]
    EmptyText { id: QuestionId },

    #[error("question {id} has {found} options, expected 4")]
    OptionCount { id: QuestionId, found: usize },

    #[error("question {id} has correct answer index {index} outside 0..4")]
    CorrectAnswerOutOfRange { id: QuestionId, index: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question. Immutable once built.
///
/// Option texts are stored raw, including any leading `A.` style label; use
/// [`strip_option_label`] for display. `correct_answer` is always positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_answer: usize,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, the option count is not
    /// [`OPTION_COUNT`], or `correct_answer` does not index an option.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText { id });
        }
        if options.len() != OPTION_COUNT {
            return Err(QuestionError::OptionCount {
                id,
                found: options.len(),
            });
        }
        if correct_answer >= options.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                id,
                index: correct_answer,
            });
        }

        Ok(Self {
            id,
            text,
            options,
            correct_answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    /// Returns true if `option_index` is the correct option.
    #[must_use]
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_answer
    }
}

//
// ─── OPTION LABELS ─────────────────────────────────────────────────────────────
//

/// Positional letter for an option index (`0 -> 'A'`).
#[must_use]
pub fn option_letter(index: usize) -> Option<char> {
    OPTION_LETTERS.get(index).copied()
}

/// Removes a leading option label such as `"A. "` or `"C)"` from option text.
///
/// Only `A`–`D` followed by `.` or `)` count as a label. Text without a label
/// is returned unchanged.
#[must_use]
pub fn strip_option_label(text: &str) -> &str {
    let mut chars = text.char_indices();
    let Some((_, letter)) = chars.next() else {
        return text;
    };
    if !OPTION_LETTERS.contains(&letter) {
        return text;
    }
    match chars.next() {
        Some((pos, '.' | ')')) => text[pos + 1..].trim_start(),
        _ => text,
    }
}
