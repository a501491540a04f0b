//! # Data Source Capabilities
//!
//! The engine reaches storage only through these two traits. Both the
//! in-memory [`MemorySource`](crate::catalog::MemorySource) and the PostGIS
//! backend in `bassin-store` implement them, so every query runs through the
//! same join and reduction code regardless of backend.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::filter::{FilterPredicate, FilterValue};
use crate::production::ProductionRecord;
use crate::unit::{AdminLevel, AdministrativeUnit, UnitCode, UnitLink};

/// Boundary provider.
#[async_trait]
pub trait UnitSource: Send + Sync {
    /// Units of `level`, optionally restricted to children of `parent`,
    /// in ascending code order. `parent` is ignored for regions.
    async fn units(
        &self,
        level: AdminLevel,
        parent: Option<&UnitCode>,
    ) -> Result<Vec<AdministrativeUnit>, SourceError>;

    /// Code and parent of every unit of `level`, without geometry.
    async fn links(&self, level: AdminLevel) -> Result<Vec<UnitLink>, SourceError>;

    /// Whether the source can currently answer.
    async fn health(&self) -> Result<(), SourceError> {
        self.links(AdminLevel::Region).await.map(|_| ())
    }
}

/// Production ledger provider.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every record, in ledger order.
    async fn records(&self) -> Result<Vec<ProductionRecord>, SourceError>;

    /// Records matching `predicate`. Backends may push the predicate down;
    /// callers still evaluate it.
    async fn matching_records(
        &self,
        predicate: &FilterPredicate,
    ) -> Result<Vec<ProductionRecord>, SourceError> {
        let mut records = self.records().await?;
        records.retain(|r| predicate.matches(r));
        Ok(records)
    }

    /// Distinct commodities, optionally within one value-chain. Sorted.
    async fn commodities(&self, value_chain: &FilterValue) -> Result<Vec<String>, SourceError> {
        let records = self.records().await?;
        Ok(distinct(
            records
                .iter()
                .filter(|r| value_chain.matches(&r.value_chain))
                .map(|r| r.commodity.as_str()),
        ))
    }

    /// Distinct value-chains. Sorted.
    async fn value_chains(&self) -> Result<Vec<String>, SourceError> {
        let records = self.records().await?;
        Ok(distinct(records.iter().map(|r| r.value_chain.as_str())))
    }

    async fn health(&self) -> Result<(), SourceError> {
        self.records().await.map(|_| ())
    }
}

/// Sorted, deduplicated copy of `values`.
pub fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
