//! # Administrative Units
//!
//! The three boundary levels and the unit record shared by every backend.
//! Codes are wrapped in [`UnitCode`] so a bare string is never mistaken for
//! a unit reference.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::RawGeometry;

/// Level of the administrative hierarchy, coarsest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    /// First-level division; the only level production is recorded at.
    Region,
    /// Second-level division, child of a region.
    Department,
    /// Third-level division, child of a department.
    Commune,
}

impl AdminLevel {
    /// All levels, root first.
    pub const ALL: [AdminLevel; 3] = [Self::Region, Self::Department, Self::Commune];

    /// Lower-case name used in payloads and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Department => "department",
            Self::Commune => "commune",
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a unit at its level (a "pcode", e.g. `CM004`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitCode(String);

impl UnitCode {
    /// Wrap a code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Borrow the code text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for UnitCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl Borrow<str> for UnitCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One administrative boundary.
///
/// Immutable once loaded; a reload replaces the whole set.
#[derive(Debug, Clone, PartialEq)]
pub struct AdministrativeUnit {
    pub level: AdminLevel,
    pub code: UnitCode,
    pub name: String,
    /// Owning unit one level up. `None` for regions.
    pub parent_code: Option<UnitCode>,
    /// Boundary in EPSG:4326. `None` when the source row had no geometry.
    pub geometry: Option<RawGeometry>,
}

impl AdministrativeUnit {
    /// Build a region (no parent).
    pub fn region(
        code: impl Into<UnitCode>,
        name: impl Into<String>,
        geometry: Option<RawGeometry>,
    ) -> Self {
        Self {
            level: AdminLevel::Region,
            code: code.into(),
            name: name.into(),
            parent_code: None,
            geometry,
        }
    }

    /// Build a department or commune under `parent`.
    pub fn child(
        level: AdminLevel,
        code: impl Into<UnitCode>,
        name: impl Into<String>,
        parent: impl Into<UnitCode>,
        geometry: Option<RawGeometry>,
    ) -> Self {
        Self {
            level,
            code: code.into(),
            name: name.into(),
            parent_code: Some(parent.into()),
            geometry,
        }
    }

    /// The geometry-free part used for ancestry resolution.
    pub fn link(&self) -> UnitLink {
        UnitLink {
            code: self.code.clone(),
            parent_code: self.parent_code.clone(),
        }
    }
}

/// Code and parent reference of a unit, without its geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitLink {
    pub code: UnitCode,
    pub parent_code: Option<UnitCode>,
}
