use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "ltgd")]
#[command(
    about = "Grounded research assistant for long-term US government debt",
    long_about = "Grounded research assistant for long-term US government debt\n\nConfig file loading:\n  - --config <path> (explicit file, overrides default path discovery)\n  - Default probe path when --config is not provided:\n    1. $XDG_CONFIG_HOME/ltgd/config.toml\n    2. ~/.config/ltgd/config.toml\n\nThe Gemini key is read from GEMINI_API_KEY (or API_KEY), a .env file, or the config file."
)]
pub struct CliArgs {
    /// Load config from this file path instead of the default discovery path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print redacted HTTP request/response logs to stderr.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Ask a single question, print the report and exit.
    #[arg(long, short = 'p', value_name = "QUESTION")]
    pub prompt: Option<String>,
}
