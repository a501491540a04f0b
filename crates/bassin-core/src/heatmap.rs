//! # Heatmap Reducer
//!
//! Reduces the boundaries of one granularity to `[latitude, longitude,
//! tonnes]` points for a single commodity. Overlaying several commodities on
//! one heat surface is meaningless, so an unrestricted commodity yields no
//! points at all.
//!
//! Granularity follows the restricting scope:
//!
//! | Scope | Units reduced |
//! |---|---|
//! | none | every region |
//! | region `R` | departments of `R` |
//! | department `D` | communes of `D` |
//!
//! Each unit's weight is the summed quantity of its owning region's
//! matching records, so sibling points under one region share a weight.

use std::collections::HashMap;

use serde::ser::{Serialize, Serializer};

use crate::filter::{FilterPredicate, FilterValue};
use crate::hierarchy::HierarchyIndex;
use crate::production::ProductionRecord;
use crate::unit::{AdminLevel, AdministrativeUnit, UnitCode};

/// Where the heatmap is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeatmapScope {
    /// Whole country, region geometry.
    #[default]
    Country,
    /// Departments of one region.
    Region(UnitCode),
    /// Communes of one department.
    Department(UnitCode),
}

impl HeatmapScope {
    /// Resolve raw `region_pcode` / `department_pcode` values. The finer
    /// department code wins when both are present; empty values are ignored.
    pub fn resolve(region: Option<&str>, department: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(UnitCode::from);
        match (present(region), present(department)) {
            (_, Some(department)) => Self::Department(department),
            (Some(region), None) => Self::Region(region),
            (None, None) => Self::Country,
        }
    }

    /// Level whose geometry is reduced.
    pub fn level(&self) -> AdminLevel {
        match self {
            Self::Country => AdminLevel::Region,
            Self::Region(_) => AdminLevel::Department,
            Self::Department(_) => AdminLevel::Commune,
        }
    }

    /// Parent restriction for the reduced units.
    pub fn parent(&self) -> Option<&UnitCode> {
        match self {
            Self::Country => None,
            Self::Region(code) | Self::Department(code) => Some(code),
        }
    }
}

/// A heatmap request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeatmapQuery {
    pub commodity: FilterValue,
    pub value_chain: FilterValue,
    pub scope: HeatmapScope,
}

impl HeatmapQuery {
    /// Resolve a request from raw query values.
    pub fn resolve(
        commodity: Option<&str>,
        value_chain: Option<&str>,
        region: Option<&str>,
        department: Option<&str>,
    ) -> Self {
        Self {
            commodity: FilterValue::resolve(commodity),
            value_chain: FilterValue::resolve(value_chain),
            scope: HeatmapScope::resolve(region, department),
        }
    }

    /// The record predicate; only meaningful when the commodity is restricted.
    pub fn predicate(&self) -> FilterPredicate {
        FilterPredicate {
            value_chain: self.value_chain.clone(),
            commodity: self.commodity.clone(),
        }
    }
}

/// One weighted centroid. Serializes as `[latitude, longitude, quantity]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub quantity: f64,
}

impl Serialize for HeatPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.latitude, self.longitude, self.quantity).serialize(serializer)
    }
}

/// Reduce `units` to weighted centroids.
///
/// `units` must already be the scope's granularity and restriction; records
/// are filtered here with the query predicate.
pub fn reduce(
    units: &[AdministrativeUnit],
    index: &HierarchyIndex,
    records: &[ProductionRecord],
    query: &HeatmapQuery,
) -> Vec<HeatPoint> {
    if query.commodity.is_all() {
        return Vec::new();
    }

    let predicate = query.predicate();
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records.iter().filter(|r| predicate.matches(r)) {
        if let Some(quantity) = record.quantity {
            *totals.entry(record.region_code.as_str()).or_default() += quantity;
        }
    }

    units
        .iter()
        .filter_map(|unit| {
            let region = match index.owning_region(unit) {
                Ok(region) => region,
                Err(e) => {
                    tracing::warn!(level = %unit.level, code = %unit.code, error = %e, "skipping heatmap unit");
                    return None;
                }
            };
            let quantity = totals.get(region.as_str()).copied().filter(|q| *q != 0.0)?;
            let centroid = match unit.geometry.as_ref().map(|g| g.centroid()) {
                Some(Ok(point)) => point,
                Some(Err(e)) => {
                    tracing::debug!(code = %unit.code, error = %e, "no centroid for heatmap unit");
                    return None;
                }
                None => return None,
            };
            Some(HeatPoint {
                latitude: centroid.y(),
                longitude: centroid.x(),
                quantity,
            })
        })
        .collect()
}
