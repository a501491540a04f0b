//! # Hierarchy-Aware Join Engine
//!
//! Attaches a [`RegionAggregate`] to units of any level. Production exists
//! only per region, so a department reads its parent region's entries and a
//! commune reads its grandparent region's entries through its department.
//! Siblings under one region therefore carry identical lists.
//!
//! A unit whose chain cannot be followed to an existing region yields
//! [`HierarchyError::DanglingParent`] for that row; the rest of the join is
//! unaffected.

use std::collections::{HashMap, HashSet};

use crate::aggregate::RegionAggregate;
use crate::error::HierarchyError;
use crate::production::ProductionEntry;
use crate::unit::{AdminLevel, AdministrativeUnit, UnitCode, UnitLink};

/// Known regions and department → region links.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    regions: HashSet<UnitCode>,
    departments: HashMap<UnitCode, Option<UnitCode>>,
}

impl HierarchyIndex {
    /// Build from region links and department links.
    ///
    /// Region-level joins need neither; department-level joins need the
    /// regions; commune-level joins need both.
    pub fn new(
        regions: impl IntoIterator<Item = UnitLink>,
        departments: impl IntoIterator<Item = UnitLink>,
    ) -> Self {
        Self {
            regions: regions.into_iter().map(|l| l.code).collect(),
            departments: departments
                .into_iter()
                .map(|l| (l.code, l.parent_code))
                .collect(),
        }
    }

    /// Follow `unit` to the region that owns its production figures.
    pub fn owning_region<'a>(
        &'a self,
        unit: &'a AdministrativeUnit,
    ) -> Result<&'a UnitCode, HierarchyError> {
        let dangling = || HierarchyError::DanglingParent {
            level: unit.level,
            code: unit.code.clone(),
            parent: unit.parent_code.clone(),
        };
        match unit.level {
            AdminLevel::Region => Ok(&unit.code),
            AdminLevel::Department => unit
                .parent_code
                .as_ref()
                .filter(|region| self.regions.contains(*region))
                .ok_or_else(dangling),
            AdminLevel::Commune => {
                let department = unit.parent_code.as_ref().ok_or_else(dangling)?;
                self.departments
                    .get(department)
                    .and_then(Option::as_ref)
                    .filter(|region| self.regions.contains(*region))
                    .ok_or_else(dangling)
            }
        }
    }
}

/// A unit with the production list of its owning region.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedUnit {
    pub unit: AdministrativeUnit,
    pub productions: Vec<ProductionEntry>,
}

/// Keep only units whose parent is `parent`; regions are never restricted.
pub fn restrict_to_parent(
    units: Vec<AdministrativeUnit>,
    parent: Option<&UnitCode>,
) -> Vec<AdministrativeUnit> {
    match parent {
        Some(parent) => units
            .into_iter()
            .filter(|u| u.level == AdminLevel::Region || u.parent_code.as_ref() == Some(parent))
            .collect(),
        None => units,
    }
}

/// Attach `aggregate` to each unit, preserving order.
pub fn join(
    units: Vec<AdministrativeUnit>,
    index: &HierarchyIndex,
    aggregate: &RegionAggregate,
) -> Vec<Result<AnnotatedUnit, HierarchyError>> {
    units
        .into_iter()
        .map(|unit| -> Result<AnnotatedUnit, HierarchyError> {
            let productions = aggregate.get(index.owning_region(&unit)?.as_str()).to_vec();
            Ok(AnnotatedUnit { unit, productions })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPredicate;
    use crate::production::ProductionRecord;

    fn region(code: &str) -> AdministrativeUnit {
        AdministrativeUnit::region(code, code, None)
    }

    fn dept(code: &str, parent: &str) -> AdministrativeUnit {
        AdministrativeUnit::child(AdminLevel::Department, code, code, parent, None)
    }

    fn commune(code: &str, parent: &str) -> AdministrativeUnit {
        AdministrativeUnit::child(AdminLevel::Commune, code, code, parent, None)
    }

    fn index() -> HierarchyIndex {
        HierarchyIndex::new(
            vec![region("R1").link(), region("R2").link()],
            vec![
                dept("D1", "R1").link(),
                dept("D2", "R1").link(),
                dept("D3", "R2").link(),
                dept("DX", "R9").link(),
            ],
        )
    }

    fn aggregate() -> RegionAggregate {
        RegionAggregate::build(
            &[
                ProductionRecord::new("R1", "maize", "cereals", Some(100.0)),
                ProductionRecord::new("R1", "cocoa", "cash-crops", Some(50.0)),
                ProductionRecord::new("R2", "maize", "cereals", Some(30.0)),
            ],
            &FilterPredicate::resolve(Some("cereals"), None),
        )
    }

    #[test]
    fn owning_region_follows_each_level() {
        let idx = index();
        assert_eq!(idx.owning_region(&region("R1")).unwrap().as_str(), "R1");
        assert_eq!(idx.owning_region(&dept("D3", "R2")).unwrap().as_str(), "R2");
        assert_eq!(idx.owning_region(&commune("C1", "D2")).unwrap().as_str(), "R1");
    }

    #[test]
    fn department_with_unknown_region_is_dangling() {
        let err = index().owning_region(&dept("DX", "R9")).unwrap_err();
        assert!(matches!(err, HierarchyError::DanglingParent { level: AdminLevel::Department, .. }));
    }

    #[test]
    fn commune_with_unknown_department_is_dangling() {
        assert!(index().owning_region(&commune("C9", "D9")).is_err());
    }

    #[test]
    fn commune_whose_department_has_no_region_is_dangling() {
        assert!(index().owning_region(&commune("C8", "DX")).is_err());
    }

    #[test]
    fn department_without_parent_is_dangling() {
        let mut orphan = dept("D0", "R1");
        orphan.parent_code = None;
        assert!(index().owning_region(&orphan).is_err());
    }

    #[test]
    fn department_inherits_region_aggregate() {
        let joined = join(vec![dept("D1", "R1")], &index(), &aggregate());
        let d1 = joined[0].as_ref().unwrap();
        assert_eq!(d1.productions.len(), 1);
        assert_eq!(d1.productions[0].commodity, "maize");
        assert_eq!(d1.productions[0].quantity, Some(100.0));
    }

    #[test]
    fn siblings_share_identical_productions() {
        let joined = join(
            vec![commune("C1", "D1"), commune("C2", "D2"), dept("D1", "R1"), dept("D2", "R1")],
            &index(),
            &aggregate(),
        );
        let lists: Vec<_> = joined.into_iter().map(|r| r.unwrap().productions).collect();
        assert!(lists.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn unit_without_production_gets_empty_list() {
        let idx = HierarchyIndex::new(vec![region("R3").link()], Vec::<UnitLink>::new());
        let joined = join(vec![region("R3")], &idx, &aggregate());
        assert!(joined[0].as_ref().unwrap().productions.is_empty());
    }

    #[test]
    fn dangling_row_does_not_affect_siblings() {
        let joined = join(
            vec![dept("D1", "R1"), dept("DX", "R9"), dept("D3", "R2")],
            &index(),
            &aggregate(),
        );
        assert_eq!(joined.len(), 3);
        assert!(joined[0].is_ok());
        assert!(joined[1].is_err());
        assert!(joined[2].is_ok());
    }

    #[test]
    fn restrict_keeps_children_of_parent_in_order() {
        let units = vec![dept("D1", "R1"), dept("D3", "R2"), dept("D2", "R1")];
        let kept = restrict_to_parent(units, Some(&UnitCode::from("R1")));
        let codes: Vec<_> = kept.iter().map(|u| u.code.as_str()).collect();
        assert_eq!(codes, vec!["D1", "D2"]);
    }

    #[test]
    fn restrict_never_filters_regions() {
        let kept = restrict_to_parent(vec![region("R1")], Some(&UnitCode::from("R2")));
        assert_eq!(kept.len(), 1);
    }
}
