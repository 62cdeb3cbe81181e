use clap::Parser;

use pushrelay_rs::cli::{self, Cli, Commands};
use pushrelay_rs::logger::init_logger;
use pushrelay_rs::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let settings = cli::load_settings(&args)?;
    init_logger(&settings.logger)?;

    let dry_run = matches!(
        args.command,
        Some(Commands::Serve { dry_run: true, .. })
    );
    if dry_run {
        tracing::info!("Configuration is valid");
        println!("Configuration is valid");
        return Ok(());
    }

    // The server re-reads settings through the same loader on reload.
    let loader = cli::parser::build_loader(&args)?;
    Server::new(settings, loader).run().await
}
