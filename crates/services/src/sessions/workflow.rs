use std::sync::Arc;

use quiz_core::model::{QuestionBank, SessionConfig};
use storage::QuestionBankRepository;

use super::controller::SessionController;
use crate::Clock;
use crate::error::SessionError;

/// Loads the question bank and hands out started session controllers.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    banks: Arc<dyn QuestionBankRepository>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, banks: Arc<dyn QuestionBankRepository>) -> Self {
        Self { clock, banks }
    }

    /// Load the bank from the repository.
    ///
    /// A failure here means no session can be started.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the bank is missing or invalid.
    pub async fn load_bank(&self) -> Result<QuestionBank, SessionError> {
        self.banks.load_bank().await.map_err(|err| {
            tracing::error!(error = %err, "question bank could not be loaded");
            SessionError::from(err)
        })
    }

    /// Declared question count of the bank, for display before a session starts.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the bank is missing or invalid.
    pub async fn preview_total(&self) -> Result<u32, SessionError> {
        Ok(self.load_bank().await?.preview_total())
    }

    /// A controller with no active session, sharing this service's clock.
    #[must_use]
    pub fn controller(&self) -> SessionController {
        SessionController::new(self.clock)
    }

    /// Load the bank and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for storage or session start failures.
    pub async fn start_session(
        &self,
        config: SessionConfig,
    ) -> Result<(QuestionBank, SessionController), SessionError> {
        let bank = self.load_bank().await?;
        let controller = self.controller();
        controller.start(&bank, config)?;
        Ok((bank, controller))
    }
}
