use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use quiz_core::Clock;
use quiz_core::model::{
    NextStep, QuestionBank, QuestionId, ReviewEntry, SelectOutcome, Session, SessionConfig,
    SessionResult, TICK_PERIOD,
};

use super::plan::{SessionBuilder, SessionPlan};
use super::progress::SessionProgress;
use super::view::SessionSnapshot;
use crate::error::SessionError;

//
// ─── SHARED STATE ──────────────────────────────────────────────────────────────
//

/// State shared between the controller handle and its background tasks.
///
/// `generation` changes whenever the active session is stopped or replaced.
/// Background tasks capture it when spawned and do nothing once it moves on.
struct Inner {
    session: Option<Session>,
    generation: u64,
    ticker: Option<JoinHandle<()>>,
    pending_advance: Option<JoinHandle<()>>,
}

impl Inner {
    /// Stop background work for the current session.
    ///
    /// The ticker is aborted before anything else so no tick can land after
    /// this returns.
    fn stop_tasks(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.cancel_advance();
    }

    fn cancel_advance(&mut self) {
        if let Some(pending) = self.pending_advance.take() {
            pending.abort();
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session, SessionError> {
        self.session.as_mut().ok_or(SessionError::NoActiveSession)
    }

    fn session(&self) -> Result<&Session, SessionError> {
        self.session.as_ref().ok_or(SessionError::NoActiveSession)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.stop_tasks();
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns the single active quiz session and its timers.
///
/// Every presentation action maps to one method here. The elapsed-time ticker
/// and the delayed auto-advance run as tokio tasks, so methods that start them
/// (`start`, `select_option`) must be called from within a tokio runtime.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionController {
    clock: Clock,
    inner: Arc<Mutex<Inner>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SessionController {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            clock,
            inner: Arc::new(Mutex::new(Inner {
                session: None,
                generation: 0,
                ticker: None,
                pending_advance: None,
            })),
            revision: Arc::new(revision),
        }
    }

    /// Receiver that changes whenever session state does, including timer
    /// ticks and auto-advances.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Start a fresh session, discarding any previous one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Start` if the plan selects no questions.
    pub fn start(
        &self,
        bank: &QuestionBank,
        config: SessionConfig,
    ) -> Result<SessionSnapshot, SessionError> {
        self.start_with_rng(bank, config, &mut rand::rng())
    }

    /// Like [`SessionController::start`] with a caller-provided RNG.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Start` if the plan selects no questions.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &self,
        bank: &QuestionBank,
        config: SessionConfig,
        rng: &mut R,
    ) -> Result<SessionSnapshot, SessionError> {
        let plan = SessionBuilder::new(bank).with_config(config).build(rng);
        self.start_plan(plan, config)
    }

    fn start_plan(
        &self,
        plan: SessionPlan,
        config: SessionConfig,
    ) -> Result<SessionSnapshot, SessionError> {
        let shuffled = plan.shuffled;
        let session = Session::new(plan.questions, self.clock.now())?;
        let snapshot = SessionSnapshot::from_session(&session);

        let mut inner = lock(&self.inner);
        inner.stop_tasks();
        let generation = inner.generation;
        inner.session = Some(session);
        inner.ticker = Some(self.spawn_ticker(generation));
        drop(inner);

        tracing::info!(
            generation,
            questions = snapshot.progress.total,
            count = %config.count,
            mode = %config.mode,
            shuffled,
            "quiz session started"
        );
        self.notify();
        Ok(snapshot)
    }

    /// Answer a question. The first answer per question is final.
    ///
    /// A freshly recorded answer on any but the last question schedules an
    /// advance to the next question after the auto-advance delay.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` without a session.
    pub fn select_option(
        &self,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<SelectOutcome, SessionError> {
        let mut inner = lock(&self.inner);
        let outcome = inner.session_mut()?.select_option(question_id, option_index);

        if let SelectOutcome::Recorded(feedback) = outcome {
            tracing::debug!(
                question = %feedback.question_id,
                chosen = feedback.chosen,
                correct = feedback.is_correct,
                "answer recorded"
            );
            if let NextStep::AutoAdvance { after, from_index } = feedback.next {
                self.schedule_advance(&mut inner, after, from_index);
            }
        }
        drop(inner);

        if matches!(outcome, SelectOutcome::Recorded(_)) {
            self.notify();
        }
        Ok(outcome)
    }

    /// Step back one question. Returns whether the position changed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` without a session.
    pub fn go_prev(&self) -> Result<bool, SessionError> {
        self.navigate(Session::go_prev)
    }

    /// Step forward one question. Returns whether the position changed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` without a session.
    pub fn go_next(&self) -> Result<bool, SessionError> {
        self.navigate(Session::go_next)
    }

    fn navigate(&self, step: fn(&mut Session) -> bool) -> Result<bool, SessionError> {
        let mut inner = lock(&self.inner);
        let moved = step(inner.session_mut()?);
        if moved {
            // A manual move supersedes any scheduled advance.
            inner.cancel_advance();
        }
        drop(inner);

        if moved {
            self.notify();
        }
        Ok(moved)
    }

    /// Stop the timer and score the session.
    ///
    /// Submitting again returns the same result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` without a session.
    pub fn submit(&self) -> Result<SessionResult, SessionError> {
        let mut inner = lock(&self.inner);
        let already_submitted = inner.session()?.is_submitted();
        if !already_submitted {
            inner.stop_tasks();
        }
        let submitted_at = self.clock.now();
        let result = inner.session_mut()?.submit(submitted_at);
        drop(inner);

        if !already_submitted {
            tracing::info!(
                correct = result.correct_count,
                total = result.total,
                percent = result.score_percent,
                elapsed = result.elapsed_seconds,
                tier = %result.tier,
                "quiz session submitted"
            );
            self.notify();
        }
        Ok(result)
    }

    /// Review of every question in session order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` without a session.
    pub fn review(&self) -> Result<Vec<ReviewEntry>, SessionError> {
        Ok(lock(&self.inner).session()?.build_review())
    }

    /// Discard the session entirely. Returns false if there was none.
    pub fn restart(&self) -> bool {
        let mut inner = lock(&self.inner);
        inner.stop_tasks();
        let discarded = inner.session.take().is_some();
        drop(inner);

        if discarded {
            tracing::info!("quiz session discarded");
            self.notify();
        }
        discarded
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        lock(&self.inner).session.is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        lock(&self.inner)
            .session
            .as_ref()
            .map(SessionSnapshot::from_session)
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        lock(&self.inner)
            .session
            .as_ref()
            .map(SessionProgress::from_session)
    }

    /// The submitted result, if the session has been submitted.
    #[must_use]
    pub fn result(&self) -> Option<SessionResult> {
        lock(&self.inner)
            .session
            .as_ref()
            .and_then(|s| s.result().cloned())
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    fn spawn_ticker(&self, generation: u64) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        let revision = Arc::clone(&self.revision);
        tokio::spawn(run_ticker(inner, revision, generation))
    }

    fn schedule_advance(&self, inner: &mut Inner, after: Duration, from_index: usize) {
        inner.cancel_advance();
        let generation = inner.generation;
        let weak = Arc::downgrade(&self.inner);
        let revision = Arc::clone(&self.revision);

        inner.pending_advance = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut guard = lock(&shared);
            if guard.generation != generation {
                tracing::trace!(generation, "stale auto-advance discarded");
                return;
            }
            guard.pending_advance = None;
            let moved = guard
                .session
                .as_mut()
                .is_some_and(|session| session.advance_from(from_index));
            drop(guard);

            if moved {
                revision.send_modify(|rev| *rev = rev.wrapping_add(1));
            } else {
                tracing::trace!(from_index, "auto-advance skipped, position changed");
            }
        }));
    }
}

async fn run_ticker(
    inner: Weak<Mutex<Inner>>,
    revision: Arc<watch::Sender<u64>>,
    generation: u64,
) {
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    loop {
        interval.tick().await;
        let Some(shared) = inner.upgrade() else {
            break;
        };
        let mut guard = lock(&shared);
        if guard.generation != generation {
            tracing::trace!(generation, "stale tick discarded");
            break;
        }
        let ticked = guard.session.as_mut().is_some_and(Session::tick);
        drop(guard);

        if !ticked {
            break;
        }
        revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("SessionController")
            .field("clock", &self.clock)
            .field("generation", &inner.generation)
            .field("session", &inner.session)
            .field("ticking", &inner.ticker.is_some())
            .field("advance_pending", &inner.pending_advance.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
