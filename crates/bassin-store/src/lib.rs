//! # bassin-store — Storage Backends
//!
//! Everything that touches disk or a database:
//!
//! | Module | Purpose |
//! |---|---|
//! | [`flatfile`] | GeoJSON boundary layers and the CSV ledger |
//! | [`config`] | PostgreSQL pool settings |
//! | [`postgres`] | PostGIS [`UnitSource`](bassin_core::UnitSource) / [`RecordSource`](bassin_core::RecordSource) |
//! | [`loader`] | transactional replacement of the PostGIS tables |
//!
//! Both backends hand identical unit and record values to the engine, so the
//! join and heatmap pipeline in `bassin-core` is shared.

pub mod config;
pub mod error;
pub mod flatfile;
pub mod loader;
pub mod postgres;

use std::path::Path;

use bassin_core::MemorySource;

pub use config::{ConfigError, PgConfig};
pub use error::LoadError;
pub use flatfile::{DataLayout, LayerSchema, LedgerSchema};
pub use loader::LoadSummary;
pub use postgres::PgSource;

/// Read `data_dir` into a ready in-memory backend. A missing ledger only
/// disables production figures.
pub fn load_memory_source(data_dir: &Path, layout: &DataLayout) -> Result<MemorySource, LoadError> {
    let catalog = flatfile::load_catalog(data_dir, layout, flatfile::Ledger::Optional)?;
    Ok(MemorySource::with_catalog(catalog))
}
