use crate::conversation::EXAMPLE_PROMPTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    Examples,
    /// 1-based index into the example prompts.
    Example(usize),
    Clear,
    Trace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError {
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

pub(crate) const HELP_TEXT: &str = "Type a question about long-term US government debt and press Enter.\n\nAvailable commands:\n  /help          Show this command list\n  /examples      List example questions\n  /example <n>   Ask example question n\n  /clear         Start a new conversation\n  /trace         Show path to the current trace file\n  exit | quit    Leave ltgd";

pub(crate) fn parse_command(line: &str) -> Result<Command, ParseError> {
    if !is_command_line(line) {
        return Err(ParseError::new("not a command"));
    }

    let command_text = line.trim()[1..].trim_start_matches('/');
    let mut parts = command_text.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").to_ascii_lowercase();
    if name.is_empty() {
        return Err(ParseError::new("empty command. Try /help"));
    }
    let rest = parts.next().map(str::trim).unwrap_or("");

    match name.as_str() {
        "help" => expect_no_args(rest, Command::Help, "usage: /help"),
        "examples" => expect_no_args(rest, Command::Examples, "usage: /examples"),
        "example" => parse_example(rest),
        "clear" => expect_no_args(rest, Command::Clear, "usage: /clear"),
        "trace" => expect_no_args(rest, Command::Trace, "usage: /trace"),
        _ => Err(ParseError::new(format!(
            "unknown command '/{name}'. Try /help"
        ))),
    }
}

pub(crate) fn is_command_line(line: &str) -> bool {
    line.starts_with('/')
}

fn expect_no_args(rest: &str, command: Command, usage: &str) -> Result<Command, ParseError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::new(usage))
    }
}

fn parse_example(rest: &str) -> Result<Command, ParseError> {
    let usage = || {
        ParseError::new(format!(
            "usage: /example <n> (n between 1 and {})",
            EXAMPLE_PROMPTS.len()
        ))
    };

    let index = rest.parse::<usize>().map_err(|_| usage())?;
    if !(1..=EXAMPLE_PROMPTS.len()).contains(&index) {
        return Err(usage());
    }
    Ok(Command::Example(index))
}
