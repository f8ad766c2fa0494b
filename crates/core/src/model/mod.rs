mod bank;
mod config;
mod ids;
mod question;
mod result;
mod review;
mod session;

pub use bank::{BankError, QuestionBank};
pub use config::{ConfigError, OrderMode, QuestionCount, SessionConfig};
pub use ids::{ParseIdError, QuestionId};
pub use question::{OPTION_COUNT, Question, QuestionError, option_letter, strip_option_label};
pub use result::{Score, SessionResult, Tier};
pub use review::{ReviewEntry, ReviewOption};
pub use session::{
    AUTO_ADVANCE_DELAY, AnswerFeedback, NextStep, SelectOutcome, Session, SessionStartError,
    TICK_PERIOD,
};
