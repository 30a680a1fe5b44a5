//! WSA CLI - Command line tool for exploring watershed metric datasets.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "wsa-cli",
    version,
    about = "Watershed metric atlas toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: wsa_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("wsa-cli {}", env!("CARGO_PKG_VERSION"));
    wsa_cmd::run(cli.command).await
}
