//! # Atlas Façade
//!
//! The query surface exposed to the HTTP and CLI layers. Each operation
//! fetches from the sources, runs the pure pipeline and contains faults:
//! an unavailable backend turns into an empty, well-formed answer (logged),
//! a broken row is dropped (logged). The `try_*` variants surface the
//! backend error for callers that need to tell "empty" from "unavailable".

use std::sync::Arc;

use geojson::FeatureCollection;

use crate::aggregate::RegionAggregate;
use crate::error::SourceError;
use crate::feature;
use crate::filter::{FilterPredicate, FilterValue};
use crate::heatmap::{self, HeatPoint, HeatmapQuery};
use crate::hierarchy::{self, AnnotatedUnit, HierarchyIndex};
use crate::production::ProductionRecord;
use crate::source::{RecordSource, UnitSource};
use crate::unit::{AdminLevel, UnitCode, UnitLink};

/// A unit listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitQuery {
    pub level: AdminLevel,
    /// Restrict to children of this unit. Ignored for regions.
    pub parent: Option<UnitCode>,
    pub filter: FilterPredicate,
}

impl UnitQuery {
    pub fn new(level: AdminLevel, parent: Option<&str>, filter: FilterPredicate) -> Self {
        Self {
            level,
            parent: parent.filter(|p| !p.is_empty()).map(UnitCode::from),
            filter,
        }
    }

    pub fn regions(filter: FilterPredicate) -> Self {
        Self::new(AdminLevel::Region, None, filter)
    }
}

/// Engine entry point over a unit source and a record source.
#[derive(Clone)]
pub struct Atlas {
    units: Arc<dyn UnitSource>,
    records: Arc<dyn RecordSource>,
}

impl std::fmt::Debug for Atlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atlas").finish_non_exhaustive()
    }
}

impl Atlas {
    pub fn new(units: Arc<dyn UnitSource>, records: Arc<dyn RecordSource>) -> Self {
        Self { units, records }
    }

    /// Serve both capabilities from one backend.
    pub fn from_source<S>(source: S) -> Self
    where
        S: UnitSource + RecordSource + 'static,
    {
        let source = Arc::new(source);
        Self {
            units: source.clone(),
            records: source,
        }
    }

    /// Links needed to resolve owning regions for units of `level`.
    async fn index_for(&self, level: AdminLevel) -> Result<HierarchyIndex, SourceError> {
        Ok(match level {
            AdminLevel::Region => HierarchyIndex::default(),
            AdminLevel::Department => {
                HierarchyIndex::new(self.units.links(AdminLevel::Region).await?, Vec::<UnitLink>::new())
            }
            AdminLevel::Commune => HierarchyIndex::new(
                self.units.links(AdminLevel::Region).await?,
                self.units.links(AdminLevel::Department).await?,
            ),
        })
    }

    /// Units annotated with their owning region's production, dangling
    /// rows dropped.
    pub async fn try_annotated_units(
        &self,
        query: &UnitQuery,
    ) -> Result<Vec<AnnotatedUnit>, SourceError> {
        let units = self.units.units(query.level, query.parent.as_ref()).await?;
        let units = hierarchy::restrict_to_parent(units, query.parent.as_ref());
        let index = self.index_for(query.level).await?;
        let records = self.records.matching_records(&query.filter).await?;
        let aggregate = RegionAggregate::build(&records, &query.filter);
        tracing::debug!(level = %query.level, entries = aggregate.entry_count(), "production aggregated");

        Ok(hierarchy::join(units, &index, &aggregate)
            .into_iter()
            .filter_map(|joined| match joined {
                Ok(unit) => Some(unit),
                Err(e) => {
                    tracing::warn!(level = %query.level, error = %e, "dropping unit with dangling parent");
                    None
                }
            })
            .collect())
    }

    /// GeoJSON listing; empty collection when the backend cannot answer.
    pub async fn features(&self, query: &UnitQuery) -> FeatureCollection {
        match self.try_annotated_units(query).await {
            Ok(units) => feature::to_feature_collection(&units),
            Err(e) => {
                tracing::error!(level = %query.level, error = %e, "unit listing failed");
                feature::empty_collection()
            }
        }
    }

    pub async fn try_commodities(&self, value_chain: &FilterValue) -> Result<Vec<String>, SourceError> {
        self.records.commodities(value_chain).await
    }

    /// Distinct commodities, optionally within one value-chain.
    pub async fn commodities(&self, value_chain: &FilterValue) -> Vec<String> {
        self.try_commodities(value_chain).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "commodity listing failed");
            Vec::new()
        })
    }

    pub async fn try_value_chains(&self) -> Result<Vec<String>, SourceError> {
        self.records.value_chains().await
    }

    /// Distinct value-chains.
    pub async fn value_chains(&self) -> Vec<String> {
        self.try_value_chains().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "value-chain listing failed");
            Vec::new()
        })
    }

    pub async fn try_heatmap(&self, query: &HeatmapQuery) -> Result<Vec<HeatPoint>, SourceError> {
        if query.commodity.is_all() {
            return Ok(Vec::new());
        }
        let level = query.scope.level();
        let units = self.units.units(level, query.scope.parent()).await?;
        let units = hierarchy::restrict_to_parent(units, query.scope.parent());
        let index = self.index_for(level).await?;
        let records = self.records.matching_records(&query.predicate()).await?;
        Ok(heatmap::reduce(&units, &index, &records, query))
    }

    /// Weighted centroids for one commodity.
    pub async fn heatmap(&self, query: &HeatmapQuery) -> Vec<HeatPoint> {
        self.try_heatmap(query).await.unwrap_or_else(|e| {
            tracing::error!(commodity = %query.commodity, error = %e, "heatmap failed");
            Vec::new()
        })
    }

    pub async fn try_productions(&self) -> Result<Vec<ProductionRecord>, SourceError> {
        self.records.records().await
    }

    /// The whole ledger.
    pub async fn productions(&self) -> Vec<ProductionRecord> {
        self.try_productions().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "production listing failed");
            Vec::new()
        })
    }

    /// Whether both sources can answer.
    pub async fn ready(&self) -> Result<(), SourceError> {
        self.units.health().await?;
        self.records.health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemorySource;

    #[test]
    fn empty_parent_is_no_restriction() {
        let q = UnitQuery::new(AdminLevel::Department, Some(""), FilterPredicate::all());
        assert_eq!(q.parent, None);
        let q = UnitQuery::new(AdminLevel::Department, Some("R1"), FilterPredicate::all());
        assert_eq!(q.parent, Some(UnitCode::from("R1")));
    }

    #[tokio::test]
    async fn unloaded_backend_yields_empty_answers() {
        let atlas = Atlas::from_source(MemorySource::empty());
        assert!(atlas.ready().await.is_err());
        assert!(atlas.features(&UnitQuery::regions(FilterPredicate::all())).await.features.is_empty());
        assert!(atlas.commodities(&FilterValue::All).await.is_empty());
        assert!(atlas.value_chains().await.is_empty());
        assert!(atlas.productions().await.is_empty());
        let q = HeatmapQuery::resolve(Some("maize"), None, None, None);
        assert!(atlas.heatmap(&q).await.is_empty());
        assert_eq!(atlas.try_heatmap(&q).await.unwrap_err(), SourceError::NotReady);
    }
}
