mod config;
mod terminal;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use quiz_core::model::{OrderMode, QuestionCount};
use services::{Clock, QuizLoopService};
use storage::JsonBankRepository;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::terminal::Terminal;

const LOG_ENV: &str = "QUIZ_LOG";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCount { raw: String },
    InvalidMode { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --count value: {raw}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config_path: Option<PathBuf>,
    bank: Option<PathBuf>,
    count: Option<QuestionCount>,
    mode: Option<OrderMode>,
    help: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    parsed.config_path = Some(require_value(args, "--config")?.into());
                }
                "--bank" => {
                    parsed.bank = Some(require_value(args, "--bank")?.into());
                }
                "--count" => {
                    let value = require_value(args, "--count")?;
                    let count = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCount { raw: value.clone() })?;
                    parsed.count = Some(count);
                }
                "--mode" => {
                    let value = require_value(args, "--mode")?;
                    let mode = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMode { raw: value.clone() })?;
                    parsed.mode = Some(mode);
                }
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    /// Command-line flags win over the config file.
    fn apply_to(self, config: &mut AppConfig) {
        if let Some(bank) = self.bank {
            config.bank_path = Some(bank);
        }
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--config <path>] [--bank <path>]");
    eprintln!("                      [--count <n|all>] [--mode <sequential|random>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --bank questions.json");
    eprintln!("  --count all");
    eprintln!("  --mode sequential");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_CONFIG_PATH, QUIZ_LOG");
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    // stdout belongs to the quiz.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run() -> anyhow::Result<()> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).inspect_err(|e| {
        eprintln!("{e}");
        print_usage();
    })?;
    if args.help {
        print_usage();
        return Ok(());
    }

    let mut config = AppConfig::load(args.config_path.as_deref())?;
    args.apply_to(&mut config);
    init_logging(config.log_filter());

    let bank_path = config.bank_path();
    tracing::debug!(path = %bank_path.display(), "using question bank");
    let service = QuizLoopService::new(
        Clock::system(),
        Arc::new(JsonBankRepository::new(bank_path.clone())),
    );
    let bank = service.load_bank().await.with_context(|| {
        format!("Failed to load question bank from {}", bank_path.display())
    })?;

    let controller = service.controller();
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Terminal::new(stdin, std::io::stdout())
        .run(&bank, &controller, config.session_config())
        .await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
