//! # API Route Modules
//!
//! - `units` — GeoJSON boundaries per level, annotated with production.
//! - `catalog` — distinct commodities and value-chains, raw ledger.
//! - `heatmap` — weighted centroids for one commodity.
//! - `query` — first-value-wins query-string extraction shared by all routes.

pub mod catalog;
pub mod heatmap;
pub mod query;
pub mod units;
