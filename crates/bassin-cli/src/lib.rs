//! # bassin-cli — Command-Line Tool for the Production-Basin Atlas
//!
//! Provides the `bassin` command:
//!
//! - `bassin verify` — check a data directory: files present, layers
//!   parseable, hierarchy and ledger references intact.
//! - `bassin load` — replace the PostGIS tables with a data directory in
//!   one transaction.
//! - `bassin query` — run the service's queries offline against flat files
//!   and print the JSON the HTTP routes would answer.
//!
//! ```bash
//! bassin verify --data-dir data
//! DATABASE_URL=postgres://... bassin load --data-dir data
//! bassin query --data-dir data heatmap --bassin Maïs --region-pcode CM004
//! ```

pub mod load;
pub mod query;
pub mod verify;

use anyhow::{Context, Result};
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Single-threaded runtime for the async parts of a subcommand.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
