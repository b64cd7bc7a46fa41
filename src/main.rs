// file: src/main.rs
// version: 2.0.0
// guid: h8i9j0k1-l2m3-4567-8901-234567hijklm

//! saltutil - Main entry point

use anyhow::Context;
use clap::Parser;
use saltutil::{
    cli::{args::Cli, args::Commands, commands::*},
    config::Config,
    logging::{Log, Logger},
    store::DeviceConfigStore,
};
use std::io;
use std::process::ExitCode;
use tokio::signal;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Logger::default().error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let logger = Logger::new(level);
    if let Err(e) = logger.install_global() {
        logger.warn(&e.to_string());
    }

    let store = config.store();

    // Dropping the command future on Ctrl+C kills a running salt-call
    let result = tokio::select! {
        result = run(cli.command, &store, &logger) => result,
        _ = signal::ctrl_c() => {
            logger.warn("Interrupted, aborting");
            return ExitCode::from(130);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, store: &DeviceConfigStore, logger: &Logger) -> anyhow::Result<()> {
    let mut stdout = io::stdout();

    match command {
        Commands::Grains { structured } => {
            grains_command(store, structured, logger, &mut stdout).context("reading grains")
        }
        Commands::SetGrains { grains } => set_grains_command(store, grains, logger)
            .await
            .context("setting grains"),
        Commands::Nodegroup => nodegroup_command(store, &mut stdout).context("reading nodegroup"),
        Commands::MinionId => {
            minion_id_command(store, logger, &mut stdout).context("reading minion ID")
        }
    }
}
