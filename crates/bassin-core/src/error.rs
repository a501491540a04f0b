//! # Error Types
//!
//! Every fault the engine can observe is contained at the row or request
//! level:
//!
//! | Fault | Type | Effect |
//! |---|---|---|
//! | backend unreachable / not loaded | [`SourceError`] | empty, well-formed answer |
//! | ancestor chain broken | [`HierarchyError`] | row dropped |
//! | geometry unusable | [`GeometryError`] | row dropped |
//! | duplicate code in a snapshot | [`CatalogError`] | load aborted |
//!
//! Filters never fail: unknown values simply match nothing.

use thiserror::Error;

use crate::unit::{AdminLevel, UnitCode};

/// A unit or record source could not answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The bulk load has not completed; no snapshot is installed yet.
    #[error("data source not ready: bulk load has not completed")]
    NotReady,

    /// The backing store cannot be reached.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// The backing store answered with an error.
    #[error("data source query failed: {0}")]
    Query(String),
}

/// A unit's ancestor chain cannot be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// The declared parent (or grandparent) does not exist.
    #[error("dangling parent for {level} {code}: parent {parent:?} does not resolve to a region")]
    DanglingParent {
        /// Level of the unit whose chain is broken.
        level: AdminLevel,
        /// Code of the unit whose chain is broken.
        code: UnitCode,
        /// The parent reference that failed to resolve, if any was declared.
        parent: Option<UnitCode>,
    },
}

/// A unit geometry cannot be turned into a feature or a centroid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The unit carries no geometry.
    #[error("geometry is missing")]
    Missing,

    /// The stored text is not a GeoJSON geometry.
    #[error("malformed geometry: {0}")]
    Malformed(String),

    /// The geometry parses but is not a polygon or multi-polygon.
    #[error("unsupported geometry type: {0}")]
    UnsupportedType(String),

    /// The geometry has no computable centroid (empty or zero-area).
    #[error("geometry has no centroid")]
    Degenerate,
}

/// A catalog snapshot violates a load-time invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two units of the same level share a code.
    #[error("duplicate {level} code: {code}")]
    DuplicateCode {
        /// Level where the duplicate was found.
        level: AdminLevel,
        /// The duplicated code.
        code: UnitCode,
    },

    /// A unit was supplied in the wrong level's collection.
    #[error("unit {code} is a {found}, expected a {expected}")]
    LevelMismatch {
        /// Level of the collection being built.
        expected: AdminLevel,
        /// Level carried by the unit.
        found: AdminLevel,
        /// Offending unit code.
        code: UnitCode,
    },
}
