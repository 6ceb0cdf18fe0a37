use anyhow::Result;
use clap::{CommandFactory, Parser};

use diskface::cli::{Cli, Command, ScanArgs};
use diskface::commands;
use diskface::config::{Config, Toggle};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    // Dispatch to subcommand; a bare `diskface` scans the current directory
    let command = cli
        .command
        .unwrap_or_else(|| Command::Scan(ScanArgs::default()));

    match command {
        Command::Scan(args) => {
            let config = Config::load(cli.config.as_deref())?;
            tracing::debug!(?config, "Loaded configuration");
            tracing::info!(?args, "Starting scan");
            commands::scan::run(args, &config, cli.quiet)?;
        }
        Command::Clean(args) => {
            let config = Config::load(cli.config.as_deref())?;
            tracing::debug!(?config, "Loaded configuration");
            tracing::info!(?args, "Starting clean");
            commands::clean::run(args, &config)?;
        }
        Command::Exclude(command) => {
            commands::exclude::run(command, cli.config.as_deref())?;
        }
        Command::Settings => {
            commands::settings::show(cli.config.as_deref())?;
        }
        Command::Files => {
            commands::settings::toggle(Toggle::Files, cli.config.as_deref())?;
        }
        Command::Directories => {
            commands::settings::toggle(Toggle::Directories, cli.config.as_deref())?;
        }
        Command::Dotfolders => {
            commands::settings::toggle(Toggle::DotEntries, cli.config.as_deref())?;
        }
        Command::Interactive => {
            commands::settings::toggle(Toggle::Interactive, cli.config.as_deref())?;
        }
        Command::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "diskface",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

fn init_logging(verbosity: u8, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if quiet {
        "warn"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("diskface={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
