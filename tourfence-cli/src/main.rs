//! Tourfence CLI - replay location traces against a tour's geofences.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::check::CheckArgs;
use commands::config::ConfigCommands;
use commands::replay::ReplayArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "tourfence", version, about = "Location-triggered AR tour engine")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Feed a recorded trace through a tracking session and print events
    Replay {
        /// Point-of-interest catalog (JSON)
        #[arg(long)]
        points: PathBuf,

        /// Sample trace (CSV: timestamp_ms,longitude,latitude,accuracy_m)
        #[arg(long)]
        samples: PathBuf,

        /// Radius override in meters for every point
        #[arg(long)]
        radius: Option<u32>,

        /// Print geofence events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Evaluate every point for a single position
    Check {
        /// Point-of-interest catalog (JSON)
        #[arg(long)]
        points: PathBuf,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Radius override in meters for every point
        #[arg(long)]
        radius: Option<u32>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Replay {
            points,
            samples,
            radius,
            json,
        } => commands::replay::run(ReplayArgs {
            points,
            samples,
            radius,
            json,
            verbose: cli.verbose,
        }),
        Commands::Check {
            points,
            lon,
            lat,
            radius,
            json,
        } => commands::check::run(CheckArgs {
            points,
            lon,
            lat,
            radius,
            json,
            verbose: cli.verbose,
        }),
        Commands::Config(command) => commands::config::run(command),
    }
}
