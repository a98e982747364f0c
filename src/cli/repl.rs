use crate::cli::commands::{Command, HELP_TEXT, is_command_line, parse_command};
use crate::cli::render::{self, Line};
use crate::cli::theme::{LineKind, Theme};
use crate::conversation::{ConversationController, EXAMPLE_PROMPTS};
use crate::llm::provider::CompletionProvider;
use crate::report::ReportService;
use crate::trace::SessionTrace;
use anyhow::{Result, bail};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

const INPUT_PROMPT: &str = "you> ";

pub struct AppState<P> {
    pub conversation: ConversationController,
    pub service: ReportService<P>,
    pub trace: SessionTrace,
    pub theme: Theme,
}

impl<P: CompletionProvider> AppState<P> {
    pub fn new(service: ReportService<P>, trace: SessionTrace, theme: Theme) -> Self {
        Self {
            conversation: ConversationController::new(),
            service,
            trace,
            theme,
        }
    }
}

pub async fn run_repl<P: CompletionProvider>(state: &mut AppState<P>) -> Result<()> {
    let mut out = io::stdout();
    show_welcome(state, &mut out)?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(
            out,
            "{}",
            state.theme.paint(LineKind::UserPrompt, INPUT_PROMPT)
        )?;
        out.flush()?;

        let Some(line) = input.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        handle_line(state, line, &mut out).await?;
    }

    state.trace.log_note("session ended");
    Ok(())
}

/// Answers a single question and exits; a degraded report is an error.
pub async fn run_once<P: CompletionProvider>(state: &mut AppState<P>, prompt: &str) -> Result<()> {
    let mut out = io::stdout();
    let theme = state.theme;
    let entry = state.conversation.ask(&state.service, prompt).await?;
    let degraded = entry.degraded;
    emit(&mut out, &theme, &render::render_entry(entry))?;

    if degraded {
        bail!(
            "report generation failed; details in {}",
            state.trace.file_path().display()
        );
    }
    Ok(())
}

fn show_welcome<P, W: Write>(state: &AppState<P>, out: &mut W) -> Result<()> {
    let mut lines = state
        .conversation
        .entries()
        .iter()
        .flat_map(render::render_entry)
        .collect::<Vec<_>>();
    if state.conversation.shows_examples() {
        lines.push(Line::blank());
        lines.extend(render::render_examples());
    }
    lines.extend(render::info("Type /help for commands, exit to quit."));
    emit(out, &state.theme, &lines)?;
    Ok(())
}

async fn handle_line<P: CompletionProvider, W: Write>(
    state: &mut AppState<P>,
    line: &str,
    out: &mut W,
) -> Result<()> {
    if !is_command_line(line) {
        return ask(state, line, false, out).await;
    }

    match parse_command(line) {
        Ok(command) => run_command(state, command, out).await,
        Err(err) => {
            emit(out, &state.theme, &render::error(err.message()))?;
            Ok(())
        }
    }
}

async fn run_command<P: CompletionProvider, W: Write>(
    state: &mut AppState<P>,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Help => emit(out, &state.theme, &render::info(HELP_TEXT))?,
        Command::Examples => emit(out, &state.theme, &render::render_examples())?,
        Command::Example(index) => {
            let Some(prompt) = index.checked_sub(1).and_then(|i| EXAMPLE_PROMPTS.get(i)) else {
                emit(out, &state.theme, &render::error("no such example"))?;
                return Ok(());
            };
            return ask(state, prompt, true, out).await;
        }
        Command::Clear => match state.conversation.clear() {
            Ok(()) => {
                state.trace.log_note("conversation cleared");
                emit(out, &state.theme, &render::info("Conversation cleared."))?;
                show_welcome(state, out)?;
            }
            Err(err) => emit(out, &state.theme, &render::error(&err.to_string()))?,
        },
        Command::Trace => emit(
            out,
            &state.theme,
            &render::info(&format!(
                "Trace file: {}",
                state.trace.file_path().display()
            )),
        )?,
    }
    Ok(())
}

async fn ask<P: CompletionProvider, W: Write>(
    state: &mut AppState<P>,
    prompt: &str,
    echo_prompt: bool,
    out: &mut W,
) -> Result<()> {
    let theme = state.theme;
    let turn = match state.conversation.submit(prompt) {
        Ok(turn) => turn,
        Err(err) => {
            emit(out, &theme, &render::error(&err.to_string()))?;
            return Ok(());
        }
    };

    // The last two entries are the user prompt and its pending placeholder.
    let entries = state.conversation.entries();
    let first_shown = entries.len() - if echo_prompt { 2 } else { 1 };
    let lines = entries[first_shown..]
        .iter()
        .flat_map(render::render_entry)
        .collect::<Vec<_>>();
    emit(out, &theme, &lines)?;

    let result = state.service.generate_report(turn.prompt()).await;
    let entry = state.conversation.resolve(turn, result)?;
    emit(out, &theme, &render::render_entry(entry))?;
    Ok(())
}

fn emit<W: Write>(out: &mut W, theme: &Theme, lines: &[Line]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line.painted(theme))?;
    }
    out.flush()
}
