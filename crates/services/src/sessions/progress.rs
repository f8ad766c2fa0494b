use quiz_core::model::Session;
use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    /// One-based number of the question on screen.
    pub position: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub is_submitted: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let total = session.len();
        let answered = session.answered_count();
        Self {
            total,
            position: session.current_index() + 1,
            answered,
            unanswered: total.saturating_sub(answered),
            is_submitted: session.is_submitted(),
        }
    }

    /// Fraction of the way through the session by position, for a progress bar.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.position as f32 / self.total as f32
    }
}
