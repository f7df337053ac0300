//! WCSLayer CLI - fetch WCS coverages into a local texture cache.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::fetch::FetchArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "wcslayer", version, about = "Fetch and cache WCS raster coverages")]
struct Cli {
    /// Cache directory (defaults to the platform cache dir)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a coverage and print a summary of the decoded texture
    Fetch(FetchArgs),
    /// Inspect or clear the on-disk cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    let cache_dir = cli.cache_dir.unwrap_or_else(commands::default_cache_dir);
    match cli.command {
        Commands::Fetch(args) => {
            let _guard = wcslayer::logging::init_logging(
                wcslayer::logging::default_log_dir(),
                wcslayer::logging::default_log_file(),
            )?;
            commands::fetch::run(args, cache_dir)
        }
        Commands::Cache { action } => commands::cache::run(action, &cache_dir),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
