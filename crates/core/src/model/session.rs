use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::Question;
use crate::model::result::{Score, SessionResult};
use crate::model::review::ReviewEntry;

/// Delay between answering a question and moving to the next one.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

/// Interval of the elapsed-time counter.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStartError {
    #[error("cannot start a session without questions")]
    Empty,
}

//
// ─── ANSWER OUTCOMES ───────────────────────────────────────────────────────────
//

/// What the presentation layer should do after a recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Move to the next question after `after`, but only if the session is
    /// still on `from_index` by then.
    AutoAdvance { after: Duration, from_index: usize },
    /// The answered question is the last one; offer submission instead.
    ReadyToSubmit,
}

/// Feedback for a freshly recorded answer. The chosen and the correct option
/// are revealed together, whether or not they coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question_id: QuestionId,
    pub chosen: usize,
    pub correct: usize,
    pub is_correct: bool,
    pub next: NextStep,
}

/// Result of `Session::select_option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Recorded(AnswerFeedback),
    /// The question already has an answer; the first one stands.
    Locked { recorded: usize },
    /// Submitted session, unknown question, or option index out of range.
    Ignored,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt over a fixed list of questions.
///
/// Answers are only ever added, the position moves by one step at a time and
/// never wraps, and once submitted the session is read-only. The score is
/// recomputed from the answer record on demand.
#[derive(Clone)]
pub struct Session {
    questions: Vec<Question>,
    answers: HashMap<QuestionId, usize>,
    current: usize,
    elapsed_seconds: u64,
    started_at: DateTime<Utc>,
    result: Option<SessionResult>,
}

impl Session {
    /// Start a running session at the first question.
    ///
    /// `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionStartError::Empty` if `questions` is empty.
    pub fn new(
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionStartError> {
        if questions.is_empty() {
            return Err(SessionStartError::Empty);
        }

        Ok(Self {
            questions,
            answers: HashMap::new(),
            current: 0,
            elapsed_seconds: 0,
            started_at,
            result: None,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; sessions are never built empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn answer_for(&self, id: QuestionId) -> Option<usize> {
        self.answers.get(&id).copied()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// True until the session is submitted.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.result.is_none()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Record the first answer for `question_id`.
    ///
    /// Later calls for the same question leave the record untouched.
    pub fn select_option(&mut self, question_id: QuestionId, option_index: usize) -> SelectOutcome {
        if self.is_submitted() {
            return SelectOutcome::Ignored;
        }
        let Some(question) = self.questions.iter().find(|q| q.id() == question_id) else {
            return SelectOutcome::Ignored;
        };
        if option_index >= question.options().len() {
            return SelectOutcome::Ignored;
        }
        if let Some(&recorded) = self.answers.get(&question_id) {
            return SelectOutcome::Locked { recorded };
        }

        let correct = question.correct_answer();
        self.answers.insert(question_id, option_index);

        let next = if self.is_last() {
            NextStep::ReadyToSubmit
        } else {
            NextStep::AutoAdvance {
                after: AUTO_ADVANCE_DELAY,
                from_index: self.current,
            }
        };

        SelectOutcome::Recorded(AnswerFeedback {
            question_id,
            chosen: option_index,
            correct,
            is_correct: option_index == correct,
            next,
        })
    }

    /// Step back one question. Returns false at the first question.
    pub fn go_prev(&mut self) -> bool {
        if self.is_submitted() || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Step forward one question. Returns false at the last question.
    pub fn go_next(&mut self) -> bool {
        if self.is_submitted() || self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Advance only if still positioned at `from_index`.
    ///
    /// Used by delayed auto-advance so a manual move in the meantime wins.
    pub fn advance_from(&mut self, from_index: usize) -> bool {
        if self.current != from_index {
            return false;
        }
        self.go_next()
    }

    /// Count one elapsed second. No effect once submitted.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.elapsed_seconds += 1;
        true
    }

    /// Score computed from the current answer record.
    #[must_use]
    pub fn score(&self) -> Score {
        let mut correct = 0_u32;
        let mut answered = 0_u32;
        for question in &self.questions {
            if let Some(&choice) = self.answers.get(&question.id()) {
                answered = answered.saturating_add(1);
                if question.is_correct(choice) {
                    correct = correct.saturating_add(1);
                }
            }
        }

        Score {
            total: u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
            correct,
            answered,
        }
    }

    /// Freeze the session and return its result.
    ///
    /// Submitting again returns the first result unchanged.
    pub fn submit(&mut self, submitted_at: DateTime<Utc>) -> SessionResult {
        if let Some(result) = &self.result {
            return result.clone();
        }
        let result = SessionResult::from_score(
            self.score(),
            self.elapsed_seconds,
            self.started_at,
            submitted_at,
        );
        self.result = Some(result.clone());
        result
    }

    /// Per-question review in session order.
    #[must_use]
    pub fn build_review(&self) -> Vec<ReviewEntry> {
        self.questions
            .iter()
            .enumerate()
            .map(|(idx, q)| ReviewEntry::new(idx, q, self.answer_for(q.id())))
            .collect()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("questions_len", &self.questions.len())
            .field("answers_len", &self.answers.len())
            .field("current", &self.current)
            .field("elapsed_seconds", &self.elapsed_seconds)
            .field("started_at", &self.started_at)
            .field("submitted", &self.is_submitted())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tier;
    use crate::time::fixed_now;

    fn build_question(id: u64, correct: usize) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["A. w".into(), "B. x".into(), "C. y".into(), "D. z".into()],
            correct,
        )
        .unwrap()
    }

    fn build_session(n: u64) -> Session {
        let questions = (1..=n).map(|id| build_question(id, (id % 4) as usize)).collect();
        Session::new(questions, fixed_now()).unwrap()
    }

    fn correct_of(session: &Session, idx: usize) -> usize {
        session.questions()[idx].correct_answer()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = Session::new(Vec::new(), fixed_now()).unwrap_err();
        assert_eq!(err, SessionStartError::Empty);
    }

    #[test]
    fn new_session_starts_running_at_zero() {
        let session = build_session(3);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.elapsed_seconds(), 0);
        assert!(session.is_running());
        assert!(session.is_first());
        assert_eq!(session.started_at(), fixed_now());
    }

    #[test]
    fn first_answer_is_final() {
        let mut session = build_session(3);
        let id = session.current_question().id();

        let first = session.select_option(id, 2);
        assert!(matches!(first, SelectOutcome::Recorded(_)));

        let second = session.select_option(id, 1);
        assert_eq!(second, SelectOutcome::Locked { recorded: 2 });
        assert_eq!(session.answer_for(id), Some(2));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn feedback_reveals_correct_option_on_wrong_choice() {
        let mut session = build_session(3);
        let q = session.current_question().clone();
        let wrong = (q.correct_answer() + 1) % 4;

        let SelectOutcome::Recorded(feedback) = session.select_option(q.id(), wrong) else {
            panic!("expected recorded outcome");
        };
        assert!(!feedback.is_correct);
        assert_eq!(feedback.chosen, wrong);
        assert_eq!(feedback.correct, q.correct_answer());
        assert_eq!(
            feedback.next,
            NextStep::AutoAdvance {
                after: AUTO_ADVANCE_DELAY,
                from_index: 0
            }
        );
    }

    #[test]
    fn last_question_signals_ready_to_submit() {
        let mut session = build_session(2);
        assert!(session.go_next());
        let q = session.current_question().clone();

        let SelectOutcome::Recorded(feedback) = session.select_option(q.id(), q.correct_answer())
        else {
            panic!("expected recorded outcome");
        };
        assert!(feedback.is_correct);
        assert_eq!(feedback.next, NextStep::ReadyToSubmit);
    }

    #[test]
    fn select_ignores_unknown_question_and_bad_index() {
        let mut session = build_session(2);
        assert_eq!(
            session.select_option(QuestionId::new(99), 0),
            SelectOutcome::Ignored
        );
        let id = session.current_question().id();
        assert_eq!(session.select_option(id, 4), SelectOutcome::Ignored);
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn navigation_is_bounded() {
        let mut session = build_session(3);
        assert!(!session.go_prev());
        assert_eq!(session.current_index(), 0);

        assert!(session.go_next());
        assert!(session.go_next());
        assert!(session.is_last());
        assert!(!session.go_next());
        assert_eq!(session.current_index(), 2);

        assert!(session.go_prev());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn navigation_does_not_require_answers() {
        let mut session = build_session(3);
        assert!(session.go_next());
        assert!(session.go_next());
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn advance_from_is_noop_after_manual_move() {
        let mut session = build_session(3);
        assert!(session.go_next());
        assert!(!session.advance_from(0));
        assert_eq!(session.current_index(), 1);
        assert!(session.advance_from(1));
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn ticks_stop_after_submit() {
        let mut session = build_session(1);
        for _ in 0..3 {
            assert!(session.tick());
        }
        assert_eq!(session.elapsed_seconds(), 3);

        let result = session.submit(fixed_now());
        assert_eq!(result.elapsed_seconds, 3);
        assert!(!session.tick());
        assert_eq!(session.elapsed_seconds(), 3);
    }

    #[test]
    fn submit_is_idempotent_and_freezes_session() {
        let mut session = build_session(2);
        let first = session.submit(fixed_now());
        let id = session.current_question().id();

        assert_eq!(session.select_option(id, 0), SelectOutcome::Ignored);
        assert!(!session.go_next());

        let later = fixed_now() + chrono::Duration::minutes(5);
        let second = session.submit(later);
        assert_eq!(first, second);
        assert_eq!(session.result(), Some(&first));
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        let mut session = build_session(4);
        let id = session.current_question().id();
        session.select_option(id, correct_of(&session, 0));

        let result = session.submit(fixed_now());
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.wrong_count, 3);
        assert_eq!(result.unanswered_count, 3);
        assert_eq!(result.correct_count + result.wrong_count, result.total);
        assert_eq!(result.score_percent, 25);
        assert_eq!(result.tier, Tier::NeedsReview);
    }

    #[test]
    fn all_correct_scores_excellent() {
        let mut session = build_session(4);
        for idx in 0..4 {
            let id = session.current_question().id();
            session.select_option(id, correct_of(&session, idx));
            session.go_next();
        }

        let result = session.submit(fixed_now());
        assert_eq!(result.correct_count, 4);
        assert_eq!(result.wrong_count, 0);
        assert_eq!(result.score_percent, 100);
        assert_eq!(result.tier, Tier::Excellent);
    }

    #[test]
    fn review_follows_session_order() {
        let mut session = build_session(3);
        let id = session.current_question().id();
        let wrong = (correct_of(&session, 0) + 1) % 4;
        session.select_option(id, wrong);

        let review = session.build_review();
        assert_eq!(review.len(), 3);
        assert_eq!(review[0].question_index, 0);
        assert_eq!(review[0].user_choice, Some(wrong));
        assert!(!review[0].is_correct);
        assert!(!review[1].is_answered());
        assert_eq!(review[2].question_id, QuestionId::new(3));
    }
}
