//! Horizon CLI - infer reservoir release policies from daily records.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "horizon-cli",
    version,
    about = "Weekly availability and release policy toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: horizon_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    horizon_cmd::run(cli.command).await
}
