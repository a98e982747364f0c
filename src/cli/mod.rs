mod args;
mod commands;
mod render;
mod repl;
pub(crate) mod theme;

pub use args::CliArgs;
pub use repl::{AppState, run_once, run_repl};
pub use theme::Theme;
