use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ts_cli::commands::{self, anomalies, detail, export, names, overview, timeline};
use ts_cli::{Cli, Commands, Config};
use ts_core::TimesheetStore;

/// Loads config and applies command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(hours) = cli.timezone {
        config.timezone_offset_hours = hours;
    }
    if let Some(policy) = cli.on_duplicate {
        config.duplicate_check_in = policy;
    }
    if let Some(sheet) = &cli.sheet {
        config.sheet_name.clone_from(sheet);
    }
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = resolve_config(&cli)?;
    let options = config
        .load_options()
        .context("invalid shift configuration")?;

    let store = TimesheetStore::new();
    let sheet = commands::load(&store, command.file(), &config.table_options(), &options)?;

    match command {
        Commands::Overview { json, .. } => overview::run(&sheet, *json)?,
        Commands::Names { .. } => names::run(&sheet)?,
        Commands::Detail { selection, .. } => detail::run(&sheet, selection)?,
        Commands::Anomalies { json, .. } => anomalies::run(&sheet, *json)?,
        Commands::Export { file, output } => {
            let output = output
                .clone()
                .unwrap_or_else(|| export::default_output(file));
            export::run(&sheet, &output)?;
        }
        Commands::Timeline { output, .. } => timeline::run(&sheet, output.as_deref())?,
    }

    Ok(())
}
