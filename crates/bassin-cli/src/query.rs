//! # Query Subcommand
//!
//! Runs the service queries against a data directory and prints the same
//! JSON the HTTP routes answer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use bassin_core::{feature, AdminLevel, Atlas, FilterPredicate, FilterValue, HeatmapQuery, UnitQuery};
use bassin_store::DataLayout;

/// Arguments for the `bassin query` subcommand.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Directory holding the boundary layers and the production ledger.
    #[arg(long, env = "BASSIN_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: QueryCommand,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Boundaries of one level as a GeoJSON FeatureCollection.
    Units {
        #[arg(long, value_enum, default_value = "region")]
        level: Level,
        /// Restrict to children of this unit (ignored for regions).
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        filiere: Option<String>,
        #[arg(long)]
        bassin: Option<String>,
    },
    /// Weighted centroids for one commodity.
    Heatmap {
        #[arg(long)]
        bassin: Option<String>,
        #[arg(long)]
        filiere: Option<String>,
        #[arg(long)]
        region_pcode: Option<String>,
        #[arg(long)]
        department_pcode: Option<String>,
    },
    /// Distinct commodities, optionally of one value-chain.
    Commodities {
        #[arg(long)]
        filiere: Option<String>,
    },
    /// Distinct value-chains.
    ValueChains,
    /// The whole production ledger.
    Productions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Level {
    Region,
    Department,
    Commune,
}

impl From<Level> for AdminLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Region => AdminLevel::Region,
            Level::Department => AdminLevel::Department,
            Level::Commune => AdminLevel::Commune,
        }
    }
}

/// Execute the query subcommand.
pub fn run_query(args: &QueryArgs) -> Result<u8> {
    let source = bassin_store::load_memory_source(&args.data_dir, &DataLayout::default())
        .with_context(|| format!("failed to read {}", args.data_dir.display()))?;
    let atlas = Atlas::from_source(source);

    crate::runtime()?.block_on(async {
        match &args.command {
            QueryCommand::Units {
                level,
                parent,
                filiere,
                bassin,
            } => {
                let query = UnitQuery::new(
                    (*level).into(),
                    parent.as_deref(),
                    FilterPredicate::resolve(filiere.as_deref(), bassin.as_deref()),
                );
                let units = atlas.try_annotated_units(&query).await?;
                crate::print_json(&feature::to_feature_collection(&units))?;
            }
            QueryCommand::Heatmap {
                bassin,
                filiere,
                region_pcode,
                department_pcode,
            } => {
                let query = HeatmapQuery::resolve(
                    bassin.as_deref(),
                    filiere.as_deref(),
                    region_pcode.as_deref(),
                    department_pcode.as_deref(),
                );
                crate::print_json(&atlas.try_heatmap(&query).await?)?;
            }
            QueryCommand::Commodities { filiere } => {
                let value_chain = FilterValue::resolve(filiere.as_deref());
                crate::print_json(&atlas.try_commodities(&value_chain).await?)?;
            }
            QueryCommand::ValueChains => {
                crate::print_json(&atlas.try_value_chains().await?)?;
            }
            QueryCommand::Productions => {
                crate::print_json(&atlas.try_productions().await?)?;
            }
        }
        Ok::<u8, anyhow::Error>(0)
    })
}
