//! # Production Aggregator
//!
//! Groups matching ledger rows by region. Quantities are not summed: a region
//! with three matching rows carries three entries, in source order.

use std::collections::BTreeMap;

use crate::filter::FilterPredicate;
use crate::production::{ProductionEntry, ProductionRecord};
use crate::unit::UnitCode;

/// Region code → matching production entries.
///
/// Regions without a match are absent; [`RegionAggregate::get`] answers
/// them with an empty slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionAggregate {
    by_region: BTreeMap<UnitCode, Vec<ProductionEntry>>,
}

impl RegionAggregate {
    /// Aggregate `records` under `predicate`.
    pub fn build<'a>(
        records: impl IntoIterator<Item = &'a ProductionRecord>,
        predicate: &FilterPredicate,
    ) -> Self {
        let mut by_region: BTreeMap<UnitCode, Vec<ProductionEntry>> = BTreeMap::new();
        for record in records.into_iter().filter(|r| predicate.matches(r)) {
            by_region
                .entry(record.region_code.clone())
                .or_default()
                .push(record.entry());
        }
        Self { by_region }
    }

    /// Entries for a region; empty when nothing matched.
    pub fn get(&self, region: &str) -> &[ProductionEntry] {
        self.by_region.get(region).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of entries across all regions.
    pub fn entry_count(&self) -> usize {
        self.by_region.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Vec<ProductionRecord> {
        vec![
            ProductionRecord::new("R1", "maize", "cereals", Some(100.0)),
            ProductionRecord::new("R1", "cocoa", "cash-crops", Some(50.0)),
            ProductionRecord::new("R2", "maize", "cereals", Some(30.0)),
        ]
    }

    #[test]
    fn all_filter_groups_every_record() {
        let agg = RegionAggregate::build(&ledger(), &FilterPredicate::all());
        assert_eq!(agg.get("R1").len(), 2);
        assert_eq!(agg.get("R2").len(), 1);
        assert!(agg.get("R3").is_empty());
        assert_eq!(agg.entry_count(), 3);
    }

    #[test]
    fn value_chain_filter_keeps_only_matching_entries() {
        let agg = RegionAggregate::build(&ledger(), &FilterPredicate::resolve(Some("cereals"), None));
        assert_eq!(
            agg.get("R1"),
            &[ProductionEntry {
                commodity: "maize".into(),
                quantity: Some(100.0),
                value_chain: "cereals".into(),
            }]
        );
        assert_eq!(agg.get("R2")[0].quantity, Some(30.0));
        assert!(agg.get("R3").is_empty());
    }

    #[test]
    fn entries_are_not_summed_and_keep_source_order() {
        let records = vec![
            ProductionRecord::new("R1", "maize", "cereals", Some(1.0)),
            ProductionRecord::new("R1", "rice", "cereals", Some(2.0)),
            ProductionRecord::new("R1", "maize", "cereals", Some(3.0)),
        ];
        let agg = RegionAggregate::build(&records, &FilterPredicate::all());
        let quantities: Vec<_> = agg.get("R1").iter().map(|e| e.quantity).collect();
        assert_eq!(quantities, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn empty_ledger_yields_empty_mapping() {
        let agg = RegionAggregate::build(&Vec::<ProductionRecord>::new(), &FilterPredicate::all());
        assert_eq!(agg.entry_count(), 0);
    }

    #[test]
    fn unmatched_filter_yields_empty_mapping() {
        let agg = RegionAggregate::build(&ledger(), &FilterPredicate::resolve(None, Some("yam")));
        assert_eq!(agg.entry_count(), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn record() -> impl Strategy<Value = ProductionRecord> {
        (
            "R[1-5]",
            prop_oneof![Just("maize"), Just("cocoa"), Just("cassava")],
            prop_oneof![Just("cereals"), Just("cash-crops"), Just("tubers")],
            proptest::option::of(0.0f64..10_000.0),
        )
            .prop_map(|(region, commodity, chain, q)| {
                ProductionRecord::new(region, commodity, chain, q)
            })
    }

    proptest! {
        /// With both axes unrestricted no record is dropped.
        #[test]
        fn all_filter_preserves_record_count(records in prop::collection::vec(record(), 0..64)) {
            let agg = RegionAggregate::build(&records, &FilterPredicate::all());
            prop_assert_eq!(agg.entry_count(), records.len());
        }

        /// A filtered aggregate holds exactly the matching records.
        #[test]
        fn filtered_count_equals_match_count(
            records in prop::collection::vec(record(), 0..64),
            chain in prop_oneof![Just("cereals"), Just("tubers"), Just("Tous")],
        ) {
            let predicate = FilterPredicate::resolve(Some(chain), None);
            let expected = records.iter().filter(|r| predicate.matches(r)).count();
            let agg = RegionAggregate::build(&records, &predicate);
            prop_assert_eq!(agg.entry_count(), expected);
        }
    }
}
