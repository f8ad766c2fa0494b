use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid question count {0:?}: expected \"all\" or a positive integer")]
    InvalidCount(String),

    #[error("invalid order mode {0:?}: expected \"sequential\" or \"random\"")]
    InvalidMode(String),
}

//
// ─── QUESTION COUNT ────────────────────────────────────────────────────────────
//

/// How many questions a session should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionCount {
    #[default]
    All,
    /// At most this many; clamped to the bank size when larger.
    Limit(NonZeroUsize),
}

impl QuestionCount {
    /// Number of questions this count yields from a pool of `available`.
    #[must_use]
    pub fn resolve(self, available: usize) -> usize {
        match self {
            QuestionCount::All => available,
            QuestionCount::Limit(n) => n.get().min(available),
        }
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionCount::All => f.write_str("all"),
            QuestionCount::Limit(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for QuestionCount {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(QuestionCount::All);
        }
        trimmed
            .parse::<NonZeroUsize>()
            .map(QuestionCount::Limit)
            .map_err(|_| ConfigError::InvalidCount(s.to_string()))
    }
}

impl Serialize for QuestionCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuestionCount::All => serializer.serialize_str("all"),
            QuestionCount::Limit(n) => serializer.serialize_u64(n.get() as u64),
        }
    }
}

impl<'de> Deserialize<'de> for QuestionCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(QuestionCount::Limit)
                .ok_or_else(|| serde::de::Error::custom(ConfigError::InvalidCount(n.to_string()))),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

//
// ─── ORDER MODE ────────────────────────────────────────────────────────────────
//

/// Whether questions keep bank order or are shuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    #[default]
    Sequential,
    Random,
}

impl OrderMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderMode::Sequential => "sequential",
            OrderMode::Random => "random",
        }
    }
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(OrderMode::Sequential),
            "random" => Ok(OrderMode::Random),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

//
// ─── SESSION CONFIG ────────────────────────────────────────────────────────────
//

/// User-chosen shape of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub count: QuestionCount,
    #[serde(default)]
    pub mode: OrderMode,
}

impl SessionConfig {
    #[must_use]
    pub fn new(count: QuestionCount, mode: OrderMode) -> Self {
        Self { count, mode }
    }

    /// Shorthand for a sequential session of at most `n` questions.
    ///
    /// A zero `n` falls back to `QuestionCount::All`.
    #[must_use]
    pub fn first(n: usize) -> Self {
        let count = NonZeroUsize::new(n).map_or(QuestionCount::All, QuestionCount::Limit);
        Self::new(count, OrderMode::Sequential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_parses_all_and_numbers() {
        assert_eq!("all".parse::<QuestionCount>().unwrap(), QuestionCount::All);
        assert_eq!("ALL".parse::<QuestionCount>().unwrap(), QuestionCount::All);
        assert_eq!(
            "10".parse::<QuestionCount>().unwrap(),
            QuestionCount::Limit(NonZeroUsize::new(10).unwrap())
        );
    }

    #[test]
    fn count_rejects_zero_and_garbage() {
        assert!(matches!(
            "0".parse::<QuestionCount>(),
            Err(ConfigError::InvalidCount(_))
        ));
        assert!("-3".parse::<QuestionCount>().is_err());
        assert!("many".parse::<QuestionCount>().is_err());
    }

    #[test]
    fn count_resolve_clamps_to_available() {
        let limit = QuestionCount::Limit(NonZeroUsize::new(50).unwrap());
        assert_eq!(limit.resolve(12), 12);
        assert_eq!(limit.resolve(80), 50);
        assert_eq!(QuestionCount::All.resolve(7), 7);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Random".parse::<OrderMode>().unwrap(), OrderMode::Random);
        assert_eq!(
            "sequential".parse::<OrderMode>().unwrap(),
            OrderMode::Sequential
        );
        assert!(matches!(
            "shuffle".parse::<OrderMode>(),
            Err(ConfigError::InvalidMode(_))
        ));
    }

    #[test]
    fn config_deserializes_string_or_number_count() {
        let cfg: SessionConfig =
            serde_json::from_str(r#"{"count": 20, "mode": "random"}"#).unwrap();
        assert_eq!(cfg, SessionConfig::new("20".parse().unwrap(), OrderMode::Random));

        let cfg: SessionConfig = serde_json::from_str(r#"{"count": "all"}"#).unwrap();
        assert_eq!(cfg, SessionConfig::default());

        assert!(serde_json::from_str::<SessionConfig>(r#"{"count": 0}"#).is_err());
    }

    #[test]
    fn first_builds_sequential_limit() {
        let cfg = SessionConfig::first(2);
        assert_eq!(cfg.mode, OrderMode::Sequential);
        assert_eq!(cfg.count.resolve(5), 2);
        assert_eq!(SessionConfig::first(0).count, QuestionCount::All);
    }
}
