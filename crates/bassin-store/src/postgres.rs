//! # PostGIS Backend
//!
//! [`UnitSource`] and [`RecordSource`] over the tables written by
//! [`crate::loader`]. Geometry leaves the database as GeoJSON text
//! (`ST_AsGeoJSON`), rows are ordered by code or id, and every filter
//! is a bound parameter.

use async_trait::async_trait;
use bassin_core::geometry::RawGeometry;
use bassin_core::source::distinct;
use bassin_core::{
    AdminLevel, AdministrativeUnit, FilterPredicate, FilterValue, ProductionRecord, RecordSource,
    SourceError, UnitCode, UnitLink, UnitSource,
};
use sqlx::PgPool;

/// Table and column names of one boundary layer.
pub(crate) struct UnitTable {
    pub table: &'static str,
    pub code: &'static str,
    pub name: &'static str,
    pub parent: Option<&'static str>,
}

pub(crate) fn unit_table(level: AdminLevel) -> UnitTable {
    match level {
        AdminLevel::Region => UnitTable {
            table: "regions",
            code: "adm1_pcode",
            name: "adm1_name1",
            parent: None,
        },
        AdminLevel::Department => UnitTable {
            table: "departements",
            code: "adm2_pcode",
            name: "adm2_name1",
            parent: Some("adm1_pcode"),
        },
        AdminLevel::Commune => UnitTable {
            table: "communes",
            code: "adm3_pcode",
            name: "adm3_name1",
            parent: Some("adm2_pcode"),
        },
    }
}

impl UnitTable {
    fn parent_column(&self) -> &'static str {
        self.parent.unwrap_or("NULL::text")
    }

    fn select_units(&self) -> String {
        let parent = self.parent_column();
        let filter = match self.parent {
            Some(column) => format!("WHERE ($1::text IS NULL OR {column} = $1) "),
            None => String::new(),
        };
        format!(
            "SELECT {code} AS code, {name} AS name, {parent} AS parent_code,
             ST_AsGeoJSON(geom) AS geometry
             FROM {table} {filter}ORDER BY {code}",
            code = self.code,
            name = self.name,
            table = self.table,
        )
    }

    fn select_links(&self) -> String {
        format!(
            "SELECT {code} AS code, {parent} AS parent_code FROM {table} ORDER BY {code}",
            code = self.code,
            parent = self.parent_column(),
            table = self.table,
        )
    }
}

/// PostGIS-backed unit and record source.
#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Classify a driver error: connectivity problems are `Unavailable`,
/// everything else is a failed query.
pub fn source_error(err: sqlx::Error) -> SourceError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => SourceError::Unavailable(err.to_string()),
        other => SourceError::Query(other.to_string()),
    }
}

#[async_trait]
impl UnitSource for PgSource {
    async fn units(
        &self,
        level: AdminLevel,
        parent: Option<&UnitCode>,
    ) -> Result<Vec<AdministrativeUnit>, SourceError> {
        let table = unit_table(level);
        let sql = table.select_units();
        let mut query = sqlx::query_as::<_, UnitRow>(&sql);
        if table.parent.is_some() {
            query = query.bind(parent.map(UnitCode::as_str));
        }
        let rows = query.fetch_all(&self.pool).await.map_err(source_error)?;
        Ok(rows.into_iter().map(|row| row.into_unit(level)).collect())
    }

    async fn links(&self, level: AdminLevel) -> Result<Vec<UnitLink>, SourceError> {
        let sql = unit_table(level).select_links();
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(source_error)?;
        Ok(rows
            .into_iter()
            .map(|row| UnitLink {
                code: UnitCode::from(row.code),
                parent_code: row.parent_code.map(UnitCode::from),
            })
            .collect())
    }

    async fn health(&self) -> Result<(), SourceError> {
        ping(&self.pool).await
    }
}

#[async_trait]
impl RecordSource for PgSource {
    async fn records(&self) -> Result<Vec<ProductionRecord>, SourceError> {
        self.matching_records(&FilterPredicate::all()).await
    }

    async fn matching_records(
        &self,
        predicate: &FilterPredicate,
    ) -> Result<Vec<ProductionRecord>, SourceError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT region_pcode, produit, filiere, production_tonnes_estimee
             FROM productions
             WHERE ($1::text IS NULL OR filiere = $1)
               AND ($2::text IS NULL OR produit = $2)
             ORDER BY id",
        )
        .bind(predicate.value_chain.as_only())
        .bind(predicate.commodity.as_only())
        .fetch_all(&self.pool)
        .await
        .map_err(source_error)?;
        Ok(rows.into_iter().map(RecordRow::into_record).collect())
    }

    async fn commodities(&self, value_chain: &FilterValue) -> Result<Vec<String>, SourceError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT produit FROM productions WHERE ($1::text IS NULL OR filiere = $1)",
        )
        .bind(value_chain.as_only())
        .fetch_all(&self.pool)
        .await
        .map_err(source_error)?;
        Ok(distinct(rows.iter().map(String::as_str)))
    }

    async fn value_chains(&self) -> Result<Vec<String>, SourceError> {
        let rows = sqlx::query_scalar::<_, String>("SELECT DISTINCT filiere FROM productions")
            .fetch_all(&self.pool)
            .await
            .map_err(source_error)?;
        Ok(distinct(rows.iter().map(String::as_str)))
    }

    async fn health(&self) -> Result<(), SourceError> {
        ping(&self.pool).await
    }
}

async fn ping(pool: &PgPool) -> Result<(), SourceError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(source_error)
}

/// Internal row types for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UnitRow {
    code: String,
    name: String,
    parent_code: Option<String>,
    geometry: Option<String>,
}

impl UnitRow {
    fn into_unit(self, level: AdminLevel) -> AdministrativeUnit {
        AdministrativeUnit {
            level,
            code: UnitCode::from(self.code),
            name: self.name,
            parent_code: self.parent_code.map(UnitCode::from),
            geometry: self.geometry.map(RawGeometry::from_text),
        }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    code: String,
    parent_code: Option<String>,
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    region_pcode: String,
    produit: String,
    filiere: String,
    production_tonnes_estimee: Option<f64>,
}

impl RecordRow {
    fn into_record(self) -> ProductionRecord {
        ProductionRecord::new(
            self.region_pcode,
            self.produit,
            self.filiere,
            self.production_tonnes_estimee,
        )
    }
}
