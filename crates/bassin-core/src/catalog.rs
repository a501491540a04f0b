//! # In-Memory Catalog
//!
//! A [`Catalog`] is one immutable snapshot of the three boundary layers and
//! the production ledger, validated at construction. [`MemorySource`] serves
//! a catalog to concurrent readers and can swap in a fresh one atomically.
//!
//! Readers clone the `Arc<Catalog>` under a `parking_lot` read lock and drop
//! the guard before doing any work; the lock is never held across `.await`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{CatalogError, HierarchyError, SourceError};
use crate::hierarchy::HierarchyIndex;
use crate::production::ProductionRecord;
use crate::source::{RecordSource, UnitSource};
use crate::unit::{AdminLevel, AdministrativeUnit, UnitCode, UnitLink};

/// Validated snapshot of units and records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    regions: Vec<AdministrativeUnit>,
    departments: Vec<AdministrativeUnit>,
    communes: Vec<AdministrativeUnit>,
    records: Vec<ProductionRecord>,
}

impl Catalog {
    /// Build a catalog. Units are sorted by code within each level.
    ///
    /// Fails on a duplicate code within a level or on a unit handed in the
    /// wrong level's collection. Dangling parents are accepted here and
    /// reported by [`Catalog::integrity_report`]; the join drops them.
    pub fn new(
        regions: Vec<AdministrativeUnit>,
        departments: Vec<AdministrativeUnit>,
        communes: Vec<AdministrativeUnit>,
        records: Vec<ProductionRecord>,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            regions: validate_layer(AdminLevel::Region, regions)?,
            departments: validate_layer(AdminLevel::Department, departments)?,
            communes: validate_layer(AdminLevel::Commune, communes)?,
            records,
        })
    }

    pub fn units(&self, level: AdminLevel) -> &[AdministrativeUnit] {
        match level {
            AdminLevel::Region => &self.regions,
            AdminLevel::Department => &self.departments,
            AdminLevel::Commune => &self.communes,
        }
    }

    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    /// Check every ancestor chain and every record's region reference.
    pub fn integrity_report(&self) -> IntegrityReport {
        let index = HierarchyIndex::new(
            self.regions.iter().map(AdministrativeUnit::link),
            self.departments.iter().map(AdministrativeUnit::link),
        );
        let dangling = self
            .departments
            .iter()
            .chain(&self.communes)
            .filter_map(|u| index.owning_region(u).err())
            .collect();

        let regions: HashSet<&str> = self.regions.iter().map(|r| r.code.as_str()).collect();
        let mut orphan_record_regions: Vec<UnitCode> = self
            .records
            .iter()
            .filter(|r| !regions.contains(r.region_code.as_str()))
            .map(|r| r.region_code.clone())
            .collect();
        orphan_record_regions.sort();
        orphan_record_regions.dedup();

        IntegrityReport {
            regions: self.regions.len(),
            departments: self.departments.len(),
            communes: self.communes.len(),
            records: self.records.len(),
            dangling,
            orphan_record_regions,
        }
    }
}

fn validate_layer(
    expected: AdminLevel,
    mut units: Vec<AdministrativeUnit>,
) -> Result<Vec<AdministrativeUnit>, CatalogError> {
    if let Some(unit) = units.iter().find(|u| u.level != expected) {
        return Err(CatalogError::LevelMismatch {
            expected,
            found: unit.level,
            code: unit.code.clone(),
        });
    }
    units.sort_by(|a, b| a.code.cmp(&b.code));
    if let Some(pair) = units.windows(2).find(|w| w[0].code == w[1].code) {
        return Err(CatalogError::DuplicateCode {
            level: expected,
            code: pair[0].code.clone(),
        });
    }
    Ok(units)
}

/// Summary of a catalog's referential health.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    pub regions: usize,
    pub departments: usize,
    pub communes: usize,
    pub records: usize,
    /// Departments and communes whose chain does not reach a region.
    pub dangling: Vec<HierarchyError>,
    /// Region codes referenced by records but absent from the region layer.
    pub orphan_record_regions: Vec<UnitCode>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.orphan_record_regions.is_empty()
    }
}

/// In-process backend serving a swappable [`Catalog`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    snapshot: Arc<RwLock<Option<Arc<Catalog>>>>,
}

impl MemorySource {
    /// A source with nothing loaded; every query reports not-ready.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        let source = Self::empty();
        source.install(catalog);
        source
    }

    /// Replace the served snapshot. In-flight readers keep the old one.
    pub fn install(&self, catalog: Catalog) {
        *self.snapshot.write() = Some(Arc::new(catalog));
        tracing::info!("catalog snapshot installed");
    }

    /// The current snapshot, if one has been installed.
    pub fn snapshot(&self) -> Result<Arc<Catalog>, SourceError> {
        self.snapshot.read().clone().ok_or(SourceError::NotReady)
    }
}

#[async_trait]
impl UnitSource for MemorySource {
    async fn units(
        &self,
        level: AdminLevel,
        parent: Option<&UnitCode>,
    ) -> Result<Vec<AdministrativeUnit>, SourceError> {
        let catalog = self.snapshot()?;
        let units = catalog.units(level);
        Ok(match parent {
            Some(parent) if level != AdminLevel::Region => units
                .iter()
                .filter(|u| u.parent_code.as_ref() == Some(parent))
                .cloned()
                .collect(),
            _ => units.to_vec(),
        })
    }

    async fn links(&self, level: AdminLevel) -> Result<Vec<UnitLink>, SourceError> {
        let catalog = self.snapshot()?;
        Ok(catalog.units(level).iter().map(AdministrativeUnit::link).collect())
    }

    async fn health(&self) -> Result<(), SourceError> {
        self.snapshot().map(|_| ())
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn records(&self) -> Result<Vec<ProductionRecord>, SourceError> {
        Ok(self.snapshot()?.records().to_vec())
    }

    async fn health(&self) -> Result<(), SourceError> {
        self.snapshot().map(|_| ())
    }
}
