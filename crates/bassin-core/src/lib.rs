//! # bassin-core — Hierarchical Geospatial Aggregation Engine
//!
//! Serves the three-tier administrative hierarchy (region → department →
//! commune) annotated with agricultural production figures, and reduces
//! polygons to weighted centroids for commodity heatmaps.
//!
//! ## Pipeline
//!
//! ```text
//! raw query ─► filter::FilterPredicate ─► aggregate::RegionAggregate
//!                                               │
//!   UnitSource ─► hierarchy::join ◄─────────────┘
//!                       │
//!                       └─► feature::to_feature_collection ─► GeoJSON
//!
//!   UnitSource + RecordSource ─► heatmap::reduce ─► [lat, lon, tonnes]
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Production lives at region granularity.** Departments and communes
//!    inherit their owning region's aggregate; nothing is disaggregated.
//!
//! 2. **One predicate, every backend.** [`FilterPredicate`] is evaluated the
//!    same way whether records come from PostGIS or from flat files.
//!
//! 3. **Backends are capabilities.** [`UnitSource`] and [`RecordSource`] are
//!    the only seams to storage; [`MemorySource`] is the in-process
//!    implementation, `bassin-store` provides PostGIS.
//!
//! 4. **Row faults never fail a request.** Dangling parents and malformed
//!    geometries drop a single row; an unreachable backend yields an empty,
//!    well-formed answer.
//!
//! ## Crate Policy
//!
//! - No network or file I/O; storage is reached only through the source traits.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod aggregate;
pub mod atlas;
pub mod catalog;
pub mod error;
pub mod feature;
pub mod filter;
pub mod geometry;
pub mod heatmap;
pub mod hierarchy;
pub mod production;
pub mod source;
pub mod unit;

// Re-export primary types for ergonomic imports.
pub use aggregate::RegionAggregate;
pub use atlas::{Atlas, UnitQuery};
pub use catalog::{Catalog, IntegrityReport, MemorySource};
pub use error::{CatalogError, GeometryError, HierarchyError, SourceError};
pub use filter::{FilterPredicate, FilterValue, ALL_SENTINEL};
pub use geometry::RawGeometry;
pub use heatmap::{HeatPoint, HeatmapQuery, HeatmapScope};
pub use hierarchy::{AnnotatedUnit, HierarchyIndex};
pub use production::{ProductionEntry, ProductionRecord};
pub use source::{RecordSource, UnitSource};
pub use unit::{AdminLevel, AdministrativeUnit, UnitCode, UnitLink};
