//! Globetiles CLI - inspect multi-resolution tile grids
//!
//! Loads a dataset configuration and answers the questions a renderer asks
//! the tile grid: which level to draw at a resolution, which tiles cover a
//! view, and where each tile lives in the cache.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use globetiles::logging::{init_logging, LoggingConfig};

use commands::{common::GridArgs, levels, locate, select, tiles};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "globetiles", version, about)]
struct Cli {
    /// Dataset configuration file (INI). Defaults to a 5-level global dataset.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the levels of the dataset
    Levels,

    /// Select the level for a resolution
    Select(select::SelectArgs),

    /// List the tiles of a level covering a sector
    Tiles(tiles::TilesArgs),

    /// Find the tile holding a location
    Locate(locate::LocateArgs),

    /// Print the effective dataset configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default();
    if cli.verbose {
        logging = logging.with_directive("globetiles=debug");
    }
    if let Some(path) = &cli.log_file {
        logging = logging.with_log_file(path);
    }
    let _guard = match init_logging(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let grid = GridArgs::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Levels => levels::run(&grid),
        Commands::Select(args) => select::run(&grid, &args),
        Commands::Tiles(args) => tiles::run(&grid, &args),
        Commands::Locate(args) => locate::run(&grid, &args),
        Commands::Config => {
            print!("{}", grid.config.to_ini_string());
            Ok(())
        }
    }
}
