//! # Feature Serializer
//!
//! Turns joined units into a GeoJSON `FeatureCollection`. Properties carry
//! `code`, `name`, `level`, `parentCode` (departments and communes) and the
//! `productions` list. A unit whose geometry is absent or unusable is
//! skipped; no feature is ever emitted with a null geometry.

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use serde_json::json;

use crate::error::GeometryError;
use crate::hierarchy::AnnotatedUnit;

/// Serialize one joined unit.
pub fn to_feature(annotated: &AnnotatedUnit) -> Result<Feature, GeometryError> {
    let unit = &annotated.unit;
    let geometry = unit
        .geometry
        .as_ref()
        .ok_or(GeometryError::Missing)?
        .to_geojson()?;

    let mut properties = JsonObject::new();
    properties.insert("code".into(), JsonValue::from(unit.code.as_str()));
    properties.insert("name".into(), JsonValue::from(unit.name.as_str()));
    properties.insert("level".into(), JsonValue::from(unit.level.as_str()));
    if let Some(parent) = &unit.parent_code {
        properties.insert("parentCode".into(), JsonValue::from(parent.as_str()));
    }
    let productions = annotated
        .productions
        .iter()
        .map(|p| {
            json!({
                "commodity": p.commodity,
                "quantity": p.quantity,
                "valueChain": p.value_chain,
            })
        })
        .collect();
    properties.insert("productions".into(), JsonValue::Array(productions));

    Ok(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Serialize all joined units, dropping those with unusable geometry.
pub fn to_feature_collection(units: &[AnnotatedUnit]) -> FeatureCollection {
    let features = units
        .iter()
        .filter_map(|annotated| match to_feature(annotated) {
            Ok(feature) => Some(feature),
            Err(e) => {
                tracing::warn!(
                    level = %annotated.unit.level,
                    code = %annotated.unit.code,
                    error = %e,
                    "dropping unit with unusable geometry"
                );
                None
            }
        })
        .collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// An empty, well-formed collection.
pub fn empty_collection() -> FeatureCollection {
    to_feature_collection(&[])
}
