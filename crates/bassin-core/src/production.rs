//! # Production Ledger Rows
//!
//! A [`ProductionRecord`] is one row of the tabular production source. It is
//! keyed by region only: there are no department- or commune-level figures.

use serde::{Deserialize, Serialize};

use crate::unit::UnitCode;

/// One production estimate for a commodity in a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    /// Owning region ("region_pcode").
    pub region_code: UnitCode,
    /// Specific product ("produit").
    pub commodity: String,
    /// Broader category ("filiere").
    pub value_chain: String,
    /// Estimated tonnes. `None` when the source cell was empty.
    pub quantity: Option<f64>,
}

impl ProductionRecord {
    pub fn new(
        region_code: impl Into<UnitCode>,
        commodity: impl Into<String>,
        value_chain: impl Into<String>,
        quantity: Option<f64>,
    ) -> Self {
        Self {
            region_code: region_code.into(),
            commodity: commodity.into(),
            value_chain: value_chain.into(),
            quantity,
        }
    }

    /// The per-unit tuple carried in a feature's `productions` list.
    pub fn entry(&self) -> ProductionEntry {
        ProductionEntry {
            commodity: self.commodity.clone(),
            quantity: self.quantity,
            value_chain: self.value_chain.clone(),
        }
    }
}

/// `{commodity, quantity, valueChain}` attached to a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEntry {
    pub commodity: String,
    pub quantity: Option<f64>,
    pub value_chain: String,
}
