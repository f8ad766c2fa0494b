use serde::Serialize;

use crate::model::ids::QuestionId;
use crate::model::question::{Question, option_letter};

/// One option as shown on the review screen.
///
/// `is_user_choice` and `is_correct_choice` are independent: both are true
/// when the user picked the right answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOption {
    pub letter: char,
    /// Raw option text; strip labels with `strip_option_label` before display.
    pub text: String,
    pub is_user_choice: bool,
    pub is_correct_choice: bool,
}

/// Review line for a single question, in session order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    /// Zero-based position in the session.
    pub question_index: usize,
    pub question_id: QuestionId,
    pub question_text: String,
    pub options: Vec<ReviewOption>,
    pub user_choice: Option<usize>,
    /// False when unanswered.
    pub is_correct: bool,
}

impl ReviewEntry {
    #[must_use]
    pub fn new(question_index: usize, question: &Question, user_choice: Option<usize>) -> Self {
        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(idx, text)| ReviewOption {
                letter: option_letter(idx).unwrap_or('?'),
                text: text.clone(),
                is_user_choice: user_choice == Some(idx),
                is_correct_choice: question.is_correct(idx),
            })
            .collect();

        Self {
            question_index,
            question_id: question.id(),
            question_text: question.text().to_owned(),
            options,
            user_choice,
            is_correct: user_choice.is_some_and(|choice| question.is_correct(choice)),
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.user_choice.is_some()
    }
}
