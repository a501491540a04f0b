//! # Bulk Loader
//!
//! Replaces the PostGIS tables with the contents of a validated
//! [`Catalog`]. The sequence is:
//!
//! 1. Read and validate every flat file (nothing touches the database yet).
//! 2. Check the connection and the PostGIS extension.
//! 3. In one transaction: drop, recreate and fill all four tables.
//!
//! Readers never observe a partial load: any failure inside step 3 rolls
//! the transaction back and the previous tables stay in place.

use std::path::Path;

use bassin_core::{AdminLevel, Catalog};
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::LoadError;
use crate::flatfile::{self, DataLayout, Ledger};
use crate::postgres::unit_table;

/// Row counts written by a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub regions: usize,
    pub departments: usize,
    pub communes: usize,
    pub records: usize,
}

const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS productions CASCADE",
    "DROP TABLE IF EXISTS communes CASCADE",
    "DROP TABLE IF EXISTS departements CASCADE",
    "DROP TABLE IF EXISTS regions CASCADE",
];

const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE regions (
        adm1_pcode TEXT PRIMARY KEY,
        adm1_name1 TEXT NOT NULL,
        geom geometry(MultiPolygon, 4326)
    )",
    "CREATE TABLE departements (
        adm2_pcode TEXT PRIMARY KEY,
        adm2_name1 TEXT NOT NULL,
        adm1_pcode TEXT,
        geom geometry(MultiPolygon, 4326)
    )",
    "CREATE TABLE communes (
        adm3_pcode TEXT PRIMARY KEY,
        adm3_name1 TEXT NOT NULL,
        adm2_pcode TEXT,
        geom geometry(MultiPolygon, 4326)
    )",
    "CREATE TABLE productions (
        id BIGSERIAL PRIMARY KEY,
        region_pcode TEXT NOT NULL,
        produit TEXT NOT NULL,
        filiere TEXT NOT NULL,
        production_tonnes_estimee DOUBLE PRECISION
    )",
];

/// Read the data directory for a bulk load. A missing ledger is fatal.
pub fn prepare(data_dir: &Path, layout: &DataLayout) -> Result<Catalog, LoadError> {
    for (path, exists) in flatfile::verify_files(data_dir, layout) {
        if !exists {
            return Err(LoadError::MissingFile { path });
        }
    }
    flatfile::load_catalog(data_dir, layout, Ledger::Required)
}

/// Fail unless the database answers and has PostGIS. Returns its version.
pub async fn check_postgis(pool: &PgPool) -> Result<String, LoadError> {
    let server = sqlx::query_scalar::<_, String>("SELECT version()").fetch_one(pool).await?;
    tracing::info!(server = %server, "connected to PostgreSQL");
    let postgis = sqlx::query_scalar::<_, String>("SELECT PostGIS_Version()")
        .fetch_one(pool)
        .await
        .map_err(|e| LoadError::PostgisMissing(e.to_string()))?;
    tracing::info!(postgis = %postgis, "PostGIS detected");
    Ok(postgis)
}

/// Replace all tables with `catalog`, atomically.
pub async fn replace_all(pool: &PgPool, catalog: &Catalog) -> Result<LoadSummary, LoadError> {
    check_postgis(pool).await?;

    let mut tx = pool.begin().await?;
    for statement in DROP_TABLES.iter().chain(CREATE_TABLES) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    let mut summary = LoadSummary::default();
    for level in AdminLevel::ALL {
        let written = insert_units(&mut tx, catalog, level).await?;
        match level {
            AdminLevel::Region => summary.regions = written,
            AdminLevel::Department => summary.departments = written,
            AdminLevel::Commune => summary.communes = written,
        }
        tracing::info!(level = %level, rows = written, "layer written");
    }

    for record in catalog.records() {
        sqlx::query(
            "INSERT INTO productions (region_pcode, produit, filiere, production_tonnes_estimee)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(record.region_code.as_str())
        .bind(&record.commodity)
        .bind(&record.value_chain)
        .bind(record.quantity)
        .execute(&mut *tx)
        .await?;
    }
    summary.records = catalog.records().len();
    tracing::info!(rows = summary.records, "production ledger written");

    tx.commit().await?;
    Ok(summary)
}

async fn insert_units(
    tx: &mut Transaction<'_, Postgres>,
    catalog: &Catalog,
    level: AdminLevel,
) -> Result<usize, LoadError> {
    let table = unit_table(level);
    let sql = match table.parent {
        Some(parent) => format!(
            "INSERT INTO {t} ({code}, {name}, {parent}, geom)
             VALUES ($1, $2, $3, ST_SetSRID(ST_GeomFromGeoJSON($4), 4326))",
            t = table.table,
            code = table.code,
            name = table.name,
        ),
        None => format!(
            "INSERT INTO {t} ({code}, {name}, geom)
             VALUES ($1, $2, ST_SetSRID(ST_GeomFromGeoJSON($3), 4326))",
            t = table.table,
            code = table.code,
            name = table.name,
        ),
    };

    let units = catalog.units(level);
    for unit in units {
        let mut query = sqlx::query(&sql)
            .bind(unit.code.as_str())
            .bind(&unit.name);
        if table.parent.is_some() {
            query = query.bind(unit.parent_code.as_ref().map(|p| p.as_str()));
        }
        query
            .bind(unit.geometry.as_ref().map(|g| g.as_str()))
            .execute(&mut **tx)
            .await?;
    }
    Ok(units.len())
}
