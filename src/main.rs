use anyhow::Result;
use clap::Parser;
use ltgd::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    ltgd::run(args).await
}
