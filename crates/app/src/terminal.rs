//! Line-oriented terminal front end driving a `SessionController`.

use std::io::Write;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use quiz_core::model::{
    NextStep, OrderMode, QuestionBank, QuestionCount, ReviewEntry, SelectOutcome, SessionConfig,
    SessionResult, Tier, option_letter,
};
use services::SessionController;
use services::session::{OptionView, ReviewView, SessionSnapshot, format_elapsed, result_line};

const UNKNOWN_QUIZ_COMMAND: &str =
    "Unknown command. a-d or 1-4 answer, n/p navigate, s submit, q quit.";
const AT_LAST_QUESTION: &str = "This is the last question. Type `s` to submit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Restart,
    Quit,
}

/// Input on the configuration screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigCommand {
    Start,
    Count(QuestionCount),
    Mode(OrderMode),
    Quit,
}

impl ConfigCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match word.to_ascii_lowercase().as_str() {
            "" | "start" => Ok(Self::Start),
            "q" | "quit" => Ok(Self::Quit),
            "count" => rest.parse().map(Self::Count).map_err(|e| e.to_string()),
            "mode" => rest.parse().map(Self::Mode).map_err(|e| e.to_string()),
            _ => Err(format!("unknown command: {line}")),
        }
    }
}

/// Input while a session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizCommand {
    Answer(usize),
    Next,
    Prev,
    Submit,
    Show,
    Quit,
}

impl QuizCommand {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim().to_ascii_lowercase();
        let cmd = match line.as_str() {
            "a" | "1" => Self::Answer(0),
            "b" | "2" => Self::Answer(1),
            "c" | "3" => Self::Answer(2),
            "d" | "4" => Self::Answer(3),
            "n" | "next" => Self::Next,
            "p" | "prev" => Self::Prev,
            "s" | "submit" => Self::Submit,
            "" | "show" => Self::Show,
            "q" | "quit" => Self::Quit,
            _ => return None,
        };
        Some(cmd)
    }
}

pub struct Terminal<R, W> {
    input: Lines<R>,
    out: W,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            input: input.lines(),
            out,
        }
    }

    /// Configure, play, and restart sessions over `bank` until the user quits
    /// or input ends.
    pub async fn run(
        &mut self,
        bank: &QuestionBank,
        controller: &SessionController,
        defaults: SessionConfig,
    ) -> Result<()> {
        loop {
            let Some(config) = self.configure(bank, defaults).await? else {
                return Ok(());
            };

            controller.start(bank, config)?;
            let flow = self.play(controller).await;
            controller.restart();
            if flow? == Flow::Quit {
                return Ok(());
            }
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(self.input.next_line().await?)
    }

    async fn configure(
        &mut self,
        bank: &QuestionBank,
        mut config: SessionConfig,
    ) -> Result<Option<SessionConfig>> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "Quiz".bold())?;
        writeln!(self.out, "Question bank: {} questions", bank.preview_total())?;

        loop {
            writeln!(
                self.out,
                "Questions: {}  Order: {}",
                config.count, config.mode
            )?;
            writeln!(
                self.out,
                "Enter to start, `count <n|all>`, `mode <sequential|random>`, `q` to quit"
            )?;

            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            match ConfigCommand::parse(&line) {
                Ok(ConfigCommand::Start) => return Ok(Some(config)),
                Ok(ConfigCommand::Quit) => return Ok(None),
                Ok(ConfigCommand::Count(count)) => config.count = count,
                Ok(ConfigCommand::Mode(mode)) => config.mode = mode,
                Err(msg) => writeln!(self.out, "{}", msg.yellow())?,
            }
        }
    }

    async fn play(&mut self, controller: &SessionController) -> Result<Flow> {
        let mut changes = controller.subscribe();
        let mut shown = self.render_current(controller)?;

        loop {
            tokio::select! {
                line = self.input.next_line() => {
                    let Some(line) = line? else {
                        return Ok(Flow::Quit);
                    };
                    let Some(cmd) = QuizCommand::parse(&line) else {
                        writeln!(self.out, "{}", UNKNOWN_QUIZ_COMMAND.yellow())?;
                        continue;
                    };
                    match cmd {
                        QuizCommand::Answer(idx) => self.answer(controller, idx)?,
                        QuizCommand::Next => {
                            if controller.go_next()? {
                                shown = self.render_current(controller)?;
                            } else {
                                writeln!(self.out, "{AT_LAST_QUESTION}")?;
                            }
                        }
                        QuizCommand::Prev => {
                            if controller.go_prev()? {
                                shown = self.render_current(controller)?;
                            } else {
                                writeln!(self.out, "This is the first question.")?;
                            }
                        }
                        QuizCommand::Show => shown = self.render_current(controller)?,
                        QuizCommand::Submit => {
                            let result = controller.submit()?;
                            return self.results(controller, &result).await;
                        }
                        QuizCommand::Quit => return Ok(Flow::Quit),
                    }
                }
                changed = changes.changed() => {
                    if changed.is_err() {
                        return Ok(Flow::Quit);
                    }
                    // Ticks only bump the timer; redraw when the question changed.
                    let current = controller.snapshot().map(|s| s.current_index);
                    if current != shown {
                        shown = self.render_current(controller)?;
                    }
                }
            }
        }
    }

    fn answer(&mut self, controller: &SessionController, idx: usize) -> Result<()> {
        let Some(snapshot) = controller.snapshot() else {
            return Ok(());
        };

        match controller.select_option(snapshot.question.id, idx)? {
            SelectOutcome::Recorded(feedback) => {
                if feedback.is_correct {
                    writeln!(self.out, "{}", "Correct!".green().bold())?;
                } else {
                    writeln!(
                        self.out,
                        "{} The answer is {}.",
                        "Wrong.".red().bold(),
                        option_letter(feedback.correct).unwrap_or('?')
                    )?;
                }
                match feedback.next {
                    NextStep::AutoAdvance { .. } => {
                        writeln!(self.out, "Next question coming up...")?;
                    }
                    NextStep::ReadyToSubmit => {
                        writeln!(self.out, "That was the last question. Type `s` to submit.")?;
                    }
                }
            }
            SelectOutcome::Locked { recorded } => writeln!(
                self.out,
                "Already answered with {}; answers are final.",
                option_letter(recorded).unwrap_or('?')
            )?,
            SelectOutcome::Ignored => writeln!(self.out, "No such option.")?,
        }
        Ok(())
    }

    fn render_current(&mut self, controller: &SessionController) -> Result<Option<usize>> {
        let Some(snapshot) = controller.snapshot() else {
            return Ok(None);
        };
        render_question(&mut self.out, &snapshot)?;
        Ok(Some(snapshot.current_index))
    }

    async fn results(
        &mut self,
        controller: &SessionController,
        result: &SessionResult,
    ) -> Result<Flow> {
        render_result(&mut self.out, result)?;

        loop {
            writeln!(self.out, "`r` review, `n` new quiz, `q` quit")?;
            let Some(line) = self.read_line().await? else {
                return Ok(Flow::Quit);
            };
            match line.trim().to_ascii_lowercase().as_str() {
                "r" | "review" => render_review(&mut self.out, &controller.review()?)?,
                "n" | "new" => return Ok(Flow::Restart),
                "q" | "quit" => return Ok(Flow::Quit),
                other => writeln!(self.out, "{}", format!("unknown command: {other}").yellow())?,
            }
        }
    }
}

fn option_line(option: &OptionView) -> ColoredString {
    let line = format!("  {}. {}", option.letter, option.text);
    match (option.is_selected, option.is_correct_choice) {
        (_, true) => line.green(),
        (true, false) => line.red(),
        (false, false) => line.normal(),
    }
}

fn render_question(out: &mut impl Write, snapshot: &SessionSnapshot) -> Result<()> {
    let progress = &snapshot.progress;
    writeln!(out)?;
    writeln!(
        out,
        "Question {}/{}  [{}]  answered {}/{}",
        progress.position,
        progress.total,
        format_elapsed(snapshot.elapsed_seconds),
        progress.answered,
        progress.total
    )?;
    writeln!(out, "{}", snapshot.question.text.bold())?;
    for option in &snapshot.question.options {
        writeln!(out, "{}", option_line(option))?;
    }

    let mut hints = Vec::new();
    if !snapshot.question.locked {
        hints.push("a-d answer");
    }
    if !snapshot.is_first {
        hints.push("p previous");
    }
    if !snapshot.is_last {
        hints.push("n next");
    }
    hints.push("s submit");
    hints.push("q quit");
    writeln!(out, "{}", hints.join(" | ").dimmed())?;
    Ok(())
}

fn render_result(out: &mut impl Write, result: &SessionResult) -> Result<()> {
    let headline = match result.tier {
        Tier::Excellent => result.tier.headline().green().bold(),
        Tier::Good => result.tier.headline().cyan().bold(),
        Tier::NeedsImprovement => result.tier.headline().yellow().bold(),
        Tier::NeedsReview => result.tier.headline().red().bold(),
    };
    writeln!(out)?;
    writeln!(out, "{headline}")?;
    writeln!(out, "{}", result_line(result))?;
    writeln!(
        out,
        "Correct: {}  Wrong: {}  Unanswered: {}",
        result.correct_count, result.wrong_count, result.unanswered_count
    )?;
    Ok(())
}

fn render_review(out: &mut impl Write, review: &[ReviewEntry]) -> Result<()> {
    for entry in review {
        let view = ReviewView::from_entry(entry);
        let mark = if view.is_correct {
            "correct".green()
        } else if view.answered {
            "wrong".red()
        } else {
            "unanswered".yellow()
        };
        writeln!(out)?;
        writeln!(out, "{}. {} ({mark})", view.number, view.text)?;
        for option in &view.options {
            let suffix = if option.is_selected { "  <- your answer" } else { "" };
            writeln!(out, "{}{suffix}", option_line(option))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionId};
    use quiz_core::time::fixed_clock;

    fn build_bank(n: u64) -> QuestionBank {
        let questions = (1..=n)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Question {id}"),
                    vec![
                        "A. red".into(),
                        "B. green".into(),
                        "C) blue".into(),
                        "D. black".into(),
                    ],
                    1,
                )
                .unwrap()
            })
            .collect();
        QuestionBank::new(u32::try_from(n).unwrap(), questions).unwrap()
    }

    async fn drive(script: &str, bank: &QuestionBank) -> String {
        colored::control::set_override(false);
        let controller = SessionController::new(fixed_clock());
        let mut out = Vec::new();
        Terminal::new(script.as_bytes(), &mut out)
            .run(bank, &controller, SessionConfig::default())
            .await
            .unwrap();
        assert!(!controller.is_active());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn quiz_commands_parse() {
        assert_eq!(QuizCommand::parse("a"), Some(QuizCommand::Answer(0)));
        assert_eq!(QuizCommand::parse(" D "), Some(QuizCommand::Answer(3)));
        assert_eq!(QuizCommand::parse("3"), Some(QuizCommand::Answer(2)));
        assert_eq!(QuizCommand::parse("n"), Some(QuizCommand::Next));
        assert_eq!(QuizCommand::parse("p"), Some(QuizCommand::Prev));
        assert_eq!(QuizCommand::parse("s"), Some(QuizCommand::Submit));
        assert_eq!(QuizCommand::parse(""), Some(QuizCommand::Show));
        assert_eq!(QuizCommand::parse("e"), None);
        assert_eq!(QuizCommand::parse("5"), None);
    }

    #[test]
    fn config_commands_parse() {
        assert_eq!(ConfigCommand::parse(""), Ok(ConfigCommand::Start));
        assert_eq!(
            ConfigCommand::parse("count 2"),
            Ok(ConfigCommand::Count("2".parse().unwrap()))
        );
        assert_eq!(
            ConfigCommand::parse("mode random"),
            Ok(ConfigCommand::Mode(OrderMode::Random))
        );
        assert!(ConfigCommand::parse("count 0").is_err());
        assert!(ConfigCommand::parse("mode upside-down").is_err());
        assert!(ConfigCommand::parse("jump").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_run_scores_and_reviews() {
        let bank = build_bank(2);
        let out = drive("\nb\nn\nb\na\ns\nr\nq\n", &bank).await;

        assert!(out.contains("Question bank: 2 questions"));
        assert!(out.contains("Question 1/2"));
        assert!(out.contains("Question 2/2"));
        assert!(out.contains("  C. blue"));
        assert!(out.contains("Correct!"));
        assert!(out.contains("Already answered with B"));
        assert!(out.contains("Excellent!"));
        assert!(out.contains("2/2 correct (100%)"));
        assert!(out.contains("1. Question 1 (correct)"));
        assert!(out.contains("B. green  <- your answer"));
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_answer_reveals_correct_letter() {
        let bank = build_bank(1);
        let out = drive("count 1\n\nc\ns\nq\n", &bank).await;

        assert!(out.contains("Questions: 1  Order: sequential"));
        assert!(out.contains("Wrong. The answer is B."));
        assert!(out.contains("Type `s` to submit"));
        assert!(out.contains("Time to review!"));
        assert!(out.contains("0/1 correct (0%)"));
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_stops_at_both_ends() {
        let bank = build_bank(2);
        let out = drive("\np\nn\nn\nx\nq\n", &bank).await;

        assert!(out.contains("This is the first question."));
        assert!(out.contains("This is the last question. Type `s` to submit."));
        assert!(out.contains("Unknown command. a-d or 1-4 answer"));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_returns_to_configuration() {
        let bank = build_bank(1);
        let out = drive("\ns\nn\nq\n", &bank).await;

        assert_eq!(out.matches("Question bank: 1 questions").count(), 2);
        assert!(out.contains("Correct: 0  Wrong: 1  Unanswered: 1"));
    }

    #[tokio::test]
    async fn end_of_input_quits_cleanly() {
        let bank = build_bank(3);
        let out = drive("\na\n", &bank).await;
        assert!(out.contains("Question 1/3"));
    }
}
