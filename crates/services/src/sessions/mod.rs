mod controller;
mod plan;
mod progress;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::SessionController;
pub use plan::{SessionBuilder, SessionPlan};
pub use progress::SessionProgress;
pub use view::{
    OptionView, QuestionView, ReviewView, SessionSnapshot, format_elapsed, result_line,
};
pub use workflow::QuizLoopService;
