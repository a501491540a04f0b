//! # Load Errors
//!
//! Everything that can abort reading the flat files or replacing the
//! PostGIS tables. A load either completes or fails with one of these
//! before any replacement is committed.

use std::path::PathBuf;

use bassin_core::{CatalogError, GeometryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// A required data file does not exist.
    #[error("data file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a GeoJSON FeatureCollection.
    #[error("invalid GeoJSON in {}: {reason}", .path.display())]
    Json { path: PathBuf, reason: String },

    #[error("invalid CSV in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },

    /// The layer declares a CRS other than EPSG:4326 / CRS84.
    #[error("{}: unsupported CRS {crs:?}, only EPSG:4326 is accepted", .path.display())]
    UnsupportedCrs { path: PathBuf, crs: String },

    /// A feature or the CSV header lacks a required attribute.
    #[error("{}: record {record} has no usable `{property}`", .path.display())]
    MissingProperty {
        path: PathBuf,
        /// Feature index (GeoJSON) or line number (CSV).
        record: u64,
        property: String,
    },

    /// A quantity cell is neither a number, empty, nor `NA`.
    #[error("{}: line {line}: invalid quantity {value:?}", .path.display())]
    InvalidQuantity {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error("{}: geometry of {code}: {source}", .path.display())]
    Geometry {
        path: PathBuf,
        code: String,
        source: GeometryError,
    },

    #[error("inconsistent data set: {0}")]
    Catalog(#[from] CatalogError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The database answers but has no PostGIS extension.
    #[error("PostGIS is not available: {0} (run CREATE EXTENSION postgis)")]
    PostgisMissing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_file() {
        let err = LoadError::MissingFile {
            path: PathBuf::from("data/cmr_admin1.geojson"),
        };
        assert_eq!(err.to_string(), "data file not found: data/cmr_admin1.geojson");

        let err = LoadError::InvalidQuantity {
            path: PathBuf::from("data/productions.csv"),
            line: 7,
            value: "lots".into(),
        };
        assert_eq!(
            err.to_string(),
            "data/productions.csv: line 7: invalid quantity \"lots\""
        );
    }

    #[test]
    fn catalog_errors_convert() {
        let err: LoadError = CatalogError::DuplicateCode {
            level: bassin_core::AdminLevel::Commune,
            code: "C1".into(),
        }
        .into();
        assert!(err.to_string().contains("duplicate commune code: C1"));
    }
}
