//! # Filter Resolver
//!
//! Turns the raw, optional `filiere` / `bassin` query values into a
//! [`FilterPredicate`]. Absence, the empty string and the literal
//! [`ALL_SENTINEL`] all mean "no restriction on this axis". Every other
//! string is kept verbatim; unknown values are valid and match nothing.

use std::fmt;

use crate::production::ProductionRecord;

/// Wire literal the map client sends for "all values".
pub const ALL_SENTINEL: &str = "Tous";

/// One resolved axis of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FilterValue {
    /// Matches every value.
    #[default]
    All,
    /// Matches exactly this value.
    Only(String),
}

impl FilterValue {
    /// Resolve a raw query value.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            None => Self::All,
            Some(value) if value.is_empty() || value == ALL_SENTINEL => Self::All,
            Some(value) => Self::Only(value.to_string()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The restricting value, or `None` for [`FilterValue::All`].
    pub fn as_only(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SENTINEL),
            Self::Only(value) => f.write_str(value),
        }
    }
}

/// Resolved `{valueChain, commodity}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterPredicate {
    pub value_chain: FilterValue,
    pub commodity: FilterValue,
}

impl FilterPredicate {
    /// The least restrictive predicate.
    pub fn all() -> Self {
        Self::default()
    }

    /// Resolve both axes from raw query values.
    pub fn resolve(value_chain: Option<&str>, commodity: Option<&str>) -> Self {
        Self {
            value_chain: FilterValue::resolve(value_chain),
            commodity: FilterValue::resolve(commodity),
        }
    }

    pub fn matches(&self, record: &ProductionRecord) -> bool {
        self.value_chain.matches(&record.value_chain) && self.commodity.matches(&record.commodity)
    }
}
