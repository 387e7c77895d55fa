mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(&cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    // Logs go to stderr so stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        // Config commands never contact the appliance
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Poll => {
            let resolved = config::resolve_profile(&cli.global)?;
            let monitor_config = config::monitor_config(&resolved, None)?;
            commands::poll::handle(&monitor_config, &cli.global)
                .await
                .map_err(|e| e.for_profile(&resolved.name))
        }

        Command::Watch(args) => {
            let resolved = config::resolve_profile(&cli.global)?;
            let monitor_config = config::monitor_config(&resolved, args.interval)?;
            commands::watch::handle(monitor_config, args, &cli.global)
                .await
                .map_err(|e| e.for_profile(&resolved.name))
        }
    }
}
