//! Interactive chat REPL.

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

use kindred_application::{ResetOutcome, SendOutcome, SessionSnapshot};
use kindred_core::chat::{ChatError, Turn, TurnRole};

use crate::app::AppState;

const SLASH_COMMANDS: [&str; 4] = ["/reset", "/retry", "/dismiss", "/quit"];

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Reset,
    Retry,
    Dismiss,
    Quit,
    Unknown(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed {
        "/reset" => Input::Reset,
        "/retry" => Input::Retry,
        "/dismiss" => Input::Dismiss,
        "/quit" | "/exit" | "quit" | "exit" => Input::Quit,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        message => Input::Message(message),
    }
}

/// Slash commands that start with a partially typed `prefix`.
fn matching_commands(prefix: &str) -> impl Iterator<Item = &'static str> + '_ {
    SLASH_COMMANDS
        .iter()
        .copied()
        .filter(move |cmd| cmd.starts_with(prefix))
}

/// Completes the rest of a slash command, or flags one that cannot match.
fn command_hint(line: &str) -> Option<String> {
    if !line.starts_with('/') || line.contains(char::is_whitespace) {
        return None;
    }
    if let Some(cmd) = matching_commands(line).find(|cmd| cmd.len() > line.len()) {
        return Some(cmd[line.len()..].to_string());
    }
    match parse_input(line) {
        Input::Unknown(_) => Some(format!("  unknown, try {}", SLASH_COMMANDS.join(" "))),
        _ => None,
    }
}

/// Completion, highlighting and hints for the chat commands.
struct ChatHelper;

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = matching_commands(line)
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match parse_input(line) {
            Input::Message(_) => Borrowed(line),
            Input::Unknown(_) if matching_commands(line.trim()).next().is_some() => {
                Borrowed(line)
            }
            Input::Unknown(_) => Owned(line.red().to_string()),
            _ => Owned(line.bright_cyan().to_string()),
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        command_hint(&line[..pos])
    }
}

impl Validator for ChatHelper {}

fn speaker(snapshot: &SessionSnapshot, role: TurnRole) -> String {
    match role {
        TurnRole::Assistant => snapshot
            .character
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Character".to_string()),
        TurnRole::User => snapshot
            .persona
            .as_ref()
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| "You".to_string()),
    }
}

fn print_turn(snapshot: &SessionSnapshot, turn: &Turn) {
    let name = format!("[{}]", speaker(snapshot, turn.role));
    match turn.role {
        TurnRole::Assistant => {
            println!("{}", name.bright_magenta());
            for line in turn.content.lines() {
                println!("{}", line.bright_blue());
            }
        }
        TurnRole::User => {
            println!("{}", name.green());
            for line in turn.content.lines() {
                println!("{}", line.green());
            }
        }
    }
    println!();
}

fn print_error(error: &ChatError) {
    println!("{}", format!("! {}", error).red());
}

fn print_transcript(snapshot: &SessionSnapshot) {
    for turn in &snapshot.transcript {
        print_turn(snapshot, turn);
    }
}

pub async fn run(state: &AppState, character_id: &str, persona_id: &str) -> Result<()> {
    let orchestrator = &state.orchestrator;

    println!("{}", "=== Kindred chat ===".bright_magenta().bold());
    println!("{}", "Starting services and loading the session...".bright_black());

    if let Err(e) = orchestrator.start_session(character_id, persona_id).await {
        print_error(&e);
        println!("{}", "Use /retry to try again or /quit to leave.".bright_black());
    } else {
        print_transcript(&orchestrator.snapshot().await);
    }

    let mut rl: Editor<ChatHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ChatHelper));
    println!(
        "{}",
        format!("Commands: {}", SLASH_COMMANDS.join(", ")).bright_black()
    );

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Message("") => continue,
            Input::Unknown(cmd) => {
                println!("{}", format!("Unknown command {}", cmd).bright_black());
            }
            Input::Dismiss => orchestrator.dismiss_error().await,
            Input::Retry => match orchestrator.retry().await {
                Ok(()) => print_transcript(&orchestrator.snapshot().await),
                Err(e) => print_error(&e),
            },
            Input::Reset => match orchestrator.reset().await {
                Ok(ResetOutcome::Reset) => {
                    println!("{}", "Conversation reset.".bright_black());
                    print_transcript(&orchestrator.snapshot().await);
                }
                Ok(ResetOutcome::Ignored) => {
                    println!("{}", "Nothing to reset right now.".bright_black());
                }
                Err(e) => print_error(&e),
            },
            Input::Message(message) => {
                let _ = rl.add_history_entry(message);
                match orchestrator.send(message).await {
                    Ok(SendOutcome::Answered(turn)) => {
                        print_turn(&orchestrator.snapshot().await, &turn);
                    }
                    Ok(SendOutcome::Absorbed { turn, error }) => {
                        print_turn(&orchestrator.snapshot().await, &turn);
                        print_error(&error);
                    }
                    Ok(SendOutcome::Ignored) => {
                        println!("{}", "Not ready yet.".bright_black());
                    }
                    Err(e) => print_error(&e),
                }
            }
        }
    }

    orchestrator.end_session().await;
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
