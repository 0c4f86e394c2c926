//! Entry-point for the `chatrelay` binary.
use chatrelay_cli::Cli;
use chatrelay_cli::run_main;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_main(cli).await
}
