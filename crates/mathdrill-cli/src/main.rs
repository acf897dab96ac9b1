//! mathdrill CLI entry point.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use mathdrill_cli::cli::{Cli, Command, ConfigAction};
use mathdrill_cli::commands;
use mathdrill_cli::config::ClientConfig;
use mathdrill_cli::console::ConsolePrompter;
use mathdrill_cli::error::{ClientError, ClientResult};
use mathdrill_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first so the log format can come from it
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config.with_format(config.log_format())) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            let mut cause = e.source();
            while let Some(err) = cause {
                eprintln!("  caused by: {}", err);
                cause = err.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
    .map_err(ClientError::Config)?;

    config.apply_cli(cli);
    Ok(config)
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    let mut prompter = ConsolePrompter::new();

    match cli.command {
        None => {
            let result = commands::drill::run(&config, &mut prompter).await?;
            println!();
            println!(
                "Done: {} of {} correct. Results published.",
                result.ok_count(),
                result.tasks.len()
            );
            Ok(())
        }
        Some(Command::Auth { force }) => commands::auth::login(&config, force, &mut prompter).await,
        Some(Command::Logout) => commands::auth::logout(&config),
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, cli.config.as_deref()),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(cli.config.as_deref()),
        },
    }
}
