//! Configuration file for the quiz binary.
//!
//! Config file location:
//! - `--config <path>` on the command line
//! - otherwise `QUIZ_CONFIG_PATH`
//! - otherwise the platform config dir, e.g. `~/.config/quiz/config.toml` on Linux
//!
//! A missing file at the default location is not an error; a missing file that
//! was asked for explicitly is.

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use quiz_core::model::{OrderMode, QuestionCount, SessionConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "QUIZ_CONFIG_PATH";
pub const DEFAULT_BANK_PATH: &str = "questions.json";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Question bank JSON file.
    #[serde(default)]
    pub bank_path: Option<PathBuf>,

    #[serde(default)]
    pub count: QuestionCount,

    #[serde(default)]
    pub mode: OrderMode,

    /// `tracing` filter directive, used when `QUIZ_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Load configuration from `explicit`, or from the default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::read(path);
        }

        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if path.exists() {
            Self::read(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Default config file path: the env override, else the platform config dir.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }

        ProjectDirs::from("dev", "quiz", "quiz").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.count, self.mode)
    }

    pub fn bank_path(&self) -> PathBuf {
        self.bank_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BANK_PATH))
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
