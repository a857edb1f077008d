//! Evoke CLI
//!
//! Command-line interface for Evoke - a car catalogue kept in a local and a
//! remote store, routed by a configurable strategy.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use evoke_core::Config;

mod commands;
mod models;
mod output;
mod stores;

use output::{Output, OutputFormat};
use stores::Stores;

#[derive(Parser)]
#[command(name = "evoke")]
#[command(about = "Evoke - local/remote car catalogue")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Treat the remote store as unreachable
    #[arg(long, global = true)]
    offline: bool,

    /// Config file to use instead of the default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage cars
    Car {
        #[command(subcommand)]
        command: CarCommands,
    },
    /// Show the routing strategy for cars
    Strategy,
    /// Show store locations and counts
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum CarCommands {
    /// List cars
    #[command(alias = "ls")]
    List {
        /// Filter by model
        #[arg(short, long)]
        model: Option<String>,
        /// Filter by year
        #[arg(short, long)]
        year: Option<u16>,
    },
    /// Show a car
    Show {
        /// Car ID
        id: String,
    },
    /// Add a car
    #[command(alias = "create")]
    Add {
        /// Model name
        model: String,
        /// Model year
        year: u16,
    },
    /// Add every car in a JSON array file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Change a car
    Edit {
        /// Car ID
        id: String,
        /// New model name
        #[arg(short, long)]
        model: Option<String>,
        /// New model year
        #[arg(short, long)]
        year: Option<u16>,
    },
    /// Remove a car
    #[command(alias = "rm")]
    Remove {
        /// Car ID
        id: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, offline, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_deref();

    // Config commands work without opening the stores
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config = Config::load_with_cli_override(config_path)?;
    init_logging(&config, cli.verbose);

    let offline = cli.offline || config.offline;
    let stores = Stores::open(&config, offline);

    match cli.command {
        Commands::Car { command } => handle_car_command(command, &stores, &output).await,
        Commands::Strategy => commands::strategy::show(&stores, &output),
        Commands::Status => commands::status::show(&stores, &config, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

async fn handle_car_command(command: CarCommands, stores: &Stores, output: &Output) -> Result<()> {
    match command {
        CarCommands::List { model, year } => commands::car::list(stores, model, year, output).await,
        CarCommands::Show { id } => commands::car::show(stores, id, output).await,
        CarCommands::Add { model, year } => commands::car::add(stores, model, year, output).await,
        CarCommands::Import { file } => commands::car::import(stores, &file, output).await,
        CarCommands::Edit { id, model, year } => {
            commands::car::edit(stores, id, model, year, output).await
        }
        CarCommands::Remove { id } => commands::car::remove(stores, id, output).await,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&std::path::Path>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// The level comes from EVOKE_LOG when set, otherwise from the -v count.
/// Logs go to config.log_file when set, otherwise to stderr.
fn init_logging(config: &Config, verbose: u8) {
    let log_level = std::env::var("EVOKE_LOG").unwrap_or_else(|_| {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_string()
    });
    let env_filter = EnvFilter::new(format!("evoke_core={},evoke_cli={}", log_level, log_level));

    let Some(ref log_path) = config.log_file else {
        // Ignore error if already initialized
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("Logging to {:?}", log_path);
}
