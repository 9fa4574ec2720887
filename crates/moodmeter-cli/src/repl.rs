//! The interactive mood board session.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use moodmeter_application::{BoardStatus, InteractionController, InteractionState, MoodBoard};
use moodmeter_core::mood::{GRID_SIZE, Mood};
use moodmeter_core::sync::{TracingFailureSink, WriteFailure, WriteFailureSink};

use crate::commands::{self, COMMAND_NAMES, Command};
use crate::render;

pub type Prompt = Editor<CliHelper, DefaultHistory>;

/// Completion, highlighting and hints for slash commands.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Logs write failures and tells the user.
pub struct TerminalFailureSink;

impl WriteFailureSink for TerminalFailureSink {
    fn report(&self, failure: &WriteFailure) {
        TracingFailureSink.report(failure);
        eprintln!(
            "{}",
            format!("Could not save your {}: {}", failure.operation, failure.error).red()
        );
    }
}

/// Reads one trimmed line. `None` on Ctrl-C or Ctrl-D.
pub fn read_line(rl: &mut Prompt, prompt: &str) -> Result<Option<String>> {
    match rl.readline(prompt) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_magenta().bold());
    println!("  {}  pick a mood by name or grid position", "/pick <mood> | /pick <row> <col>".cyan());
    println!("  {}                        show the mood board", "/board".cyan());
    println!("  {}                          list who is here", "/who".cyan());
    println!("  {}                        list every mood", "/moods".cyan());
    println!("  {}                        forget your name and mood", "/reset".cyan());
    println!("  {}                       board and identity status", "/status".cyan());
    println!("  {}                         leave", "/quit".cyan());
    println!("{}", "A bare mood name works too, e.g. 'calm'.".bright_black());
}

fn print_moods() {
    for row in 0..GRID_SIZE {
        let line: Vec<String> = (0..GRID_SIZE)
            .filter_map(|col| Mood::at(row, col))
            .map(|mood| mood.label().to_string())
            .collect();
        println!("  {:>2}: {}", row + 1, line.join(", "));
    }
}

async fn pick(
    rl: &mut Prompt,
    board: &MoodBoard,
    controller: &mut InteractionController,
    mood: Mood,
) -> Result<()> {
    if controller.click(mood).await.is_some() {
        println!("{}", format!("Now feeling {}.", mood.label().to_lowercase()).green());
    }

    if let InteractionState::CapturingName { mood } = controller.state() {
        println!(
            "{}",
            format!("You picked {}. What's your name? (empty to cancel)", mood).bright_yellow()
        );
        let name = read_line(rl, "name> ")?.unwrap_or_default();
        if name.is_empty() {
            controller.cancel();
            println!("{}", "Cancelled.".bright_black());
            return Ok(());
        }

        match controller.submit_name(&name).await {
            Ok(_) => {
                if let Some(identity) = controller.identity() {
                    println!("{}", format!("Welcome, {}!", identity.user_name).green());
                }
            }
            Err(e) => {
                println!("{}", e.to_string().red());
                controller.cancel();
                return Ok(());
            }
        }
    }

    render::print_board(&board.synchronizer().current_view().await);
    Ok(())
}

async fn status(board: &MoodBoard, controller: &InteractionController) -> Result<()> {
    match board.status().await {
        BoardStatus::Ready => println!("{}", "Board: live".green()),
        BoardStatus::Loading => println!("{}", "Board: loading".yellow()),
        BoardStatus::Unavailable(message) => {
            println!("{}", format!("Board unavailable: {}. Retrying...", message).red());
            if board.start().await.is_ok() {
                println!("{}", "Board: live".green());
            }
        }
    }

    match controller.identity() {
        Some(identity) => println!("You are {} ({})", identity.user_name.bold(), identity.session_id),
        None => println!("{}", "You haven't shared a mood yet.".bright_black()),
    }
    Ok(())
}

/// Runs the command loop until `/quit` or end of input.
pub async fn run(
    rl: &mut Prompt,
    board: &MoodBoard,
    controller: &mut InteractionController,
) -> Result<()> {
    println!("{}", "=== MoodMeter ===".bright_magenta().bold());
    println!("{}", "How are you feeling? Type a mood, or /help.".bright_black());
    if let Some(identity) = controller.identity() {
        println!("{}", format!("Welcome back, {}.", identity.user_name).green());
    }
    println!();
    render::print_board(&board.synchronizer().current_view().await);

    loop {
        let Some(line) = read_line(rl, ">> ")? else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        match commands::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Pick(mood)) => pick(rl, board, controller, mood).await?,
            Ok(Command::Board) => render::print_board(&board.synchronizer().current_view().await),
            Ok(Command::Who) => render::print_roster(&board.synchronizer().current_view().await),
            Ok(Command::Moods) => print_moods(),
            Ok(Command::Reset) => match controller.reset() {
                Some(_) => println!("{}", "Your mood was removed.".green()),
                None => println!("{}", "You haven't shared a mood yet.".bright_black()),
            },
            Ok(Command::Status) => status(board, controller).await?,
            Ok(Command::Help) => print_help(),
            Err(e) => println!("{}", e.to_string().yellow()),
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
