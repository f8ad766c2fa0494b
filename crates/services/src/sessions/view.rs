use serde::Serialize;

use quiz_core::model::{
    Question, QuestionId, ReviewEntry, Session, SessionResult, option_letter, strip_option_label,
};

use super::progress::SessionProgress;

/// Presentation-agnostic snapshot of the active session.
///
/// No pre-formatted strings beyond label stripping; the presentation layer
/// decides how to render elapsed time, progress, and option states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub progress: SessionProgress,
    pub current_index: usize,
    pub question: QuestionView,
    pub elapsed_seconds: u64,
    pub is_first: bool,
    pub is_last: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let question = session.current_question();
        Self {
            progress: SessionProgress::from_session(session),
            current_index: session.current_index(),
            question: QuestionView::new(question, session.answer_for(question.id())),
            elapsed_seconds: session.elapsed_seconds(),
            is_first: session.is_first(),
            is_last: session.is_last(),
        }
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.progress.is_submitted
    }
}

/// The question on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<OptionView>,
    /// True once answered; options no longer accept input.
    pub locked: bool,
}

impl QuestionView {
    #[must_use]
    pub fn new(question: &Question, answer: Option<usize>) -> Self {
        let locked = answer.is_some();
        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(idx, raw)| OptionView {
                letter: option_letter(idx).unwrap_or('?'),
                text: strip_option_label(raw).to_owned(),
                is_selected: answer == Some(idx),
                // Only revealed after a choice is made.
                is_correct_choice: locked && question.is_correct(idx),
            })
            .collect();

        Self {
            id: question.id(),
            text: question.text().to_owned(),
            options,
            locked,
        }
    }
}

/// One option of the question on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub letter: char,
    pub text: String,
    pub is_selected: bool,
    pub is_correct_choice: bool,
}

/// Review line with display text, for a results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    /// One-based question number.
    pub number: usize,
    pub text: String,
    pub options: Vec<OptionView>,
    pub is_correct: bool,
    pub answered: bool,
}

impl ReviewView {
    #[must_use]
    pub fn from_entry(entry: &ReviewEntry) -> Self {
        Self {
            number: entry.question_index + 1,
            text: entry.question_text.clone(),
            options: entry
                .options
                .iter()
                .map(|opt| OptionView {
                    letter: opt.letter,
                    text: strip_option_label(&opt.text).to_owned(),
                    is_selected: opt.is_user_choice,
                    is_correct_choice: opt.is_correct_choice,
                })
                .collect(),
            is_correct: entry.is_correct,
            answered: entry.is_answered(),
        }
    }
}

/// `MM:SS` rendering of a seconds counter. Minutes keep growing past 59.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One-line summary of a result, e.g. `"4/5 correct (80%) in 01:05"`.
#[must_use]
pub fn result_line(result: &SessionResult) -> String {
    format!(
        "{}/{} correct ({}%) in {}",
        result.correct_count,
        result.total,
        result.score_percent,
        format_elapsed(result.elapsed_seconds)
    )
}
