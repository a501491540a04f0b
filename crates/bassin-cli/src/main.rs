//! # bassin CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bassin_cli::load::{run_load, LoadArgs};
use bassin_cli::query::{run_query, QueryArgs};
use bassin_cli::verify::{run_verify, VerifyArgs};

/// Production-basin atlas toolchain.
///
/// Verifies data directories, bulk-loads them into PostGIS and runs the
/// atlas queries offline.
#[derive(Parser, Debug)]
#[command(name = "bassin", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that a data directory is complete and consistent.
    Verify(VerifyArgs),

    /// Replace the PostGIS tables with the contents of a data directory.
    Load(LoadArgs),

    /// Run a query against a data directory and print JSON.
    Query(QueryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Verify(args) => run_verify(&args),
        Commands::Load(args) => run_load(&args),
        Commands::Query(args) => run_query(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
