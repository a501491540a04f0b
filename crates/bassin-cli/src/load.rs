//! # Load Subcommand
//!
//! One-time bulk load: reads the data directory, then drops and recreates
//! the PostGIS tables in a single transaction. Nothing is replaced unless
//! every file parses and the PostGIS extension answers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bassin_store::{loader, DataLayout, PgConfig};

/// Arguments for the `bassin load` subcommand.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Directory holding the boundary layers and the production ledger.
    #[arg(long, env = "BASSIN_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}

/// Execute the load subcommand.
pub fn run_load(args: &LoadArgs) -> Result<u8> {
    let layout = DataLayout::default();
    let catalog = loader::prepare(&args.data_dir, &layout)
        .with_context(|| format!("failed to read {}", args.data_dir.display()))?;

    let report = catalog.integrity_report();
    if !report.is_clean() {
        tracing::warn!(
            dangling = report.dangling.len(),
            orphan_regions = report.orphan_record_regions.len(),
            "loading data with unresolved references"
        );
    }

    let config = PgConfig::new(args.database_url.clone());
    crate::runtime()?.block_on(async {
        let pool = config.connect().await.context("failed to connect to PostgreSQL")?;
        let summary = loader::replace_all(&pool, &catalog)
            .await
            .context("bulk load rolled back")?;
        crate::print_json(&summary)?;
        Ok::<u8, anyhow::Error>(0)
    })
}
