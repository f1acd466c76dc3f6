use std::fmt::Write as _;

use services::{QuizService, QuizSnapshot};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// One line of user input at the quiz prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    Next,
    Previous,
    Reveal,
    History,
    /// 1-based history position as typed by the user.
    Jump(usize),
    Reset,
    Quit,
    Help,
}

impl ViewCommand {
    /// Parse a prompt line. Returns `None` for anything unrecognised.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let head = parts.next()?;
        let cmd = match head {
            "n" | "next" => Self::Next,
            "p" | "prev" | "previous" => Self::Previous,
            "r" | "reveal" => Self::Reveal,
            "h" | "history" => Self::History,
            "j" | "jump" => Self::Jump(parts.next()?.parse().ok()?),
            "reset" => Self::Reset,
            "q" | "quit" | "exit" => Self::Quit,
            "?" | "help" => Self::Help,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(cmd)
    }
}

const HELP: &str = "commands: n next, p previous, r reveal answer, h history, j <n> jump, reset, q quit";

/// Render the current question block.
#[must_use]
pub fn render_question(snapshot: &QuizSnapshot, revealed: bool) -> String {
    let progress = &snapshot.progress;
    let mut out = String::new();

    let _ = write!(out, "[{}/{} seen]", progress.seen, progress.total);
    if progress.is_complete {
        out.push_str(" Complete");
    }
    out.push('\n');

    let Some(question) = snapshot.current.as_ref() else {
        out.push_str("No questions available.\n");
        return out;
    };

    if let Some(position) = snapshot.position() {
        let _ = writeln!(out, "#{position} of {}", progress.history_len);
    }
    let _ = writeln!(out, "{} ({})", question.title, question.difficulty);
    let tags = question.tag_list();
    if !tags.is_empty() {
        let _ = writeln!(out, "tags: {}", tags.join(", "));
    }
    let companies = question.company_names();
    if !companies.is_empty() {
        let _ = writeln!(out, "asked by: {}", companies.join(", "));
    }

    if revealed {
        match snapshot.answer.as_deref() {
            Some(answer) => {
                out.push('\n');
                out.push_str(answer);
                out.push('\n');
            }
            None => out.push_str("\nNo answer available yet.\n"),
        }
    }
    out
}

/// Render the history list with a marker on the current entry.
#[must_use]
pub fn render_history(snapshot: &QuizSnapshot) -> String {
    let mut out = String::new();
    for entry in &snapshot.history {
        let marker = if entry.is_current { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:>3}. {} ({})",
            entry.index + 1,
            entry.title,
            entry.difficulty
        );
    }
    out
}

/// Interactive loop over stdin/stdout. Returns when the user quits or input ends.
///
/// # Errors
///
/// Returns an IO error if the terminal cannot be read or written.
pub async fn run(quiz: &mut QuizService) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut revealed = false;

    stdout.write_all(format!("{HELP}\n\n").as_bytes()).await?;
    stdout
        .write_all(render_question(&quiz.snapshot(), revealed).as_bytes())
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = ViewCommand::parse(&line) else {
            stdout.write_all(format!("{HELP}\n").as_bytes()).await?;
            continue;
        };

        let progress = quiz.progress();
        let output = match command {
            ViewCommand::Quit => break,
            ViewCommand::Help => format!("{HELP}\n"),
            ViewCommand::History => render_history(&quiz.snapshot()),
            ViewCommand::Reveal => {
                revealed = true;
                render_question(&quiz.snapshot(), revealed)
            }
            ViewCommand::Next if !progress.can_go_next => {
                "All questions seen. Type `reset` to start over.\n".to_string()
            }
            ViewCommand::Previous if !progress.can_go_previous => {
                "Already at the first question.\n".to_string()
            }
            ViewCommand::Jump(position)
                if position == 0 || position > progress.history_len =>
            {
                format!("No history entry {position}.\n")
            }
            ViewCommand::Next => {
                quiz.next().await;
                revealed = false;
                render_question(&quiz.snapshot(), revealed)
            }
            ViewCommand::Previous => {
                quiz.previous().await;
                revealed = false;
                render_question(&quiz.snapshot(), revealed)
            }
            ViewCommand::Jump(position) => {
                quiz.jump_to(position - 1).await;
                revealed = false;
                render_question(&quiz.snapshot(), revealed)
            }
            ViewCommand::Reset => {
                quiz.reset().await;
                revealed = false;
                render_question(&quiz.snapshot(), revealed)
            }
        };
        stdout.write_all(output.as_bytes()).await?;
    }

    stdout.flush().await
}
