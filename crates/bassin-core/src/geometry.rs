//! # Unit Geometry
//!
//! Boundaries are kept as GeoJSON text exactly as the backend produced it
//! (`ST_AsGeoJSON` output, or the normalized flat-file geometry). Parsing is
//! deferred to the two consumers that need structure: the feature serializer
//! and the heatmap centroid. A geometry that fails there is
//! `MALFORMED_GEOMETRY` for that row only.
//!
//! All coordinates are EPSG:4326, longitude first.

use std::sync::Arc;

use geo::Centroid;
use geojson::Value;

use crate::error::GeometryError;

/// GeoJSON geometry text for one unit. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGeometry(Arc<str>);

impl RawGeometry {
    /// Wrap stored GeoJSON text without validating it.
    pub fn from_text(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// Normalize a parsed geometry to a multi-polygon and store it.
    pub fn from_geojson(geometry: geojson::Geometry) -> Result<Self, GeometryError> {
        let normalized = normalize(geometry)?;
        let text = serde_json::to_string(&normalized)
            .map_err(|e| GeometryError::Malformed(e.to_string()))?;
        Ok(Self(text.into()))
    }

    /// The stored GeoJSON text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a GeoJSON geometry, accepting polygons and multi-polygons only.
    pub fn to_geojson(&self) -> Result<geojson::Geometry, GeometryError> {
        let geometry: geojson::Geometry = serde_json::from_str(&self.0)
            .map_err(|e| GeometryError::Malformed(e.to_string()))?;
        if matches!(geometry.value, Value::Polygon(_) | Value::MultiPolygon(_)) {
            Ok(geometry)
        } else {
            Err(GeometryError::UnsupportedType(
                type_name(&geometry.value).to_string(),
            ))
        }
    }

    /// Planar centroid in (longitude, latitude), as `ST_Centroid` computes it
    /// on a 4326 geometry.
    pub fn centroid(&self) -> Result<geo::Point<f64>, GeometryError> {
        let geometry = self.to_geojson()?;
        let shape = geo::Geometry::<f64>::try_from(geometry)
            .map_err(|e| GeometryError::Malformed(e.to_string()))?;
        match shape.centroid() {
            Some(point) if point.x().is_finite() && point.y().is_finite() => Ok(point),
            _ => Err(GeometryError::Degenerate),
        }
    }
}

/// Coerce a boundary geometry into a `MultiPolygon`.
///
/// Polygons are wrapped; geometry collections made only of polygonal
/// members are flattened into one multi-polygon. Anything else is rejected.
pub fn normalize(geometry: geojson::Geometry) -> Result<geojson::Geometry, GeometryError> {
    let mut polygons = Vec::new();
    collect_polygons(geometry.value, &mut polygons)?;
    if polygons.is_empty() {
        return Err(GeometryError::Degenerate);
    }
    Ok(geojson::Geometry::new(Value::MultiPolygon(polygons)))
}

fn collect_polygons(
    value: Value,
    out: &mut Vec<geojson::PolygonType>,
) -> Result<(), GeometryError> {
    match value {
        Value::Polygon(rings) => out.push(rings),
        Value::MultiPolygon(parts) => out.extend(parts),
        Value::GeometryCollection(members) => {
            for member in members {
                collect_polygons(member.value, out)?;
            }
        }
        other => return Err(GeometryError::UnsupportedType(type_name(&other).to_string())),
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, side: f64) -> geojson::PolygonType {
        vec![vec![
            vec![x0, y0],
            vec![x0 + side, y0],
            vec![x0 + side, y0 + side],
            vec![x0, y0 + side],
            vec![x0, y0],
        ]]
    }

    #[test]
    fn polygon_is_normalized_to_multipolygon() {
        let raw = RawGeometry::from_geojson(geojson::Geometry::new(Value::Polygon(square(
            0.0, 0.0, 2.0,
        ))))
        .unwrap();
        assert!(raw.as_str().contains("\"MultiPolygon\""));
        assert!(matches!(raw.to_geojson().unwrap().value, Value::MultiPolygon(ref p) if p.len() == 1));
    }

    #[test]
    fn collection_of_polygons_is_flattened() {
        let collection = Value::GeometryCollection(vec![
            geojson::Geometry::new(Value::Polygon(square(0.0, 0.0, 1.0))),
            geojson::Geometry::new(Value::MultiPolygon(vec![square(5.0, 5.0, 1.0)])),
        ]);
        let normalized = normalize(geojson::Geometry::new(collection)).unwrap();
        match normalized.value {
            Value::MultiPolygon(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected MultiPolygon, got {}", type_name(&other)),
        }
    }

    #[test]
    fn point_geometry_is_rejected_at_normalization() {
        let err = normalize(geojson::Geometry::new(Value::Point(vec![11.5, 3.8]))).unwrap_err();
        assert_eq!(err, GeometryError::UnsupportedType("Point".into()));
    }

    #[test]
    fn centroid_of_square_is_its_center() {
        let raw = RawGeometry::from_geojson(geojson::Geometry::new(Value::Polygon(square(
            10.0, 2.0, 2.0,
        ))))
        .unwrap();
        let c = raw.centroid().unwrap();
        assert!((c.x() - 11.0).abs() < 1e-9);
        assert!((c.y() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn garbage_text_is_malformed() {
        let raw = RawGeometry::from_text("{\"type\": \"Polygon\", \"coordinates\": 12}");
        assert!(matches!(raw.to_geojson(), Err(GeometryError::Malformed(_))));
        assert!(matches!(raw.centroid(), Err(GeometryError::Malformed(_))));
    }

    #[test]
    fn stored_point_text_is_unsupported() {
        let raw = RawGeometry::from_text(r#"{"type":"Point","coordinates":[11.5,3.8]}"#);
        assert_eq!(
            raw.to_geojson().unwrap_err(),
            GeometryError::UnsupportedType("Point".into())
        );
    }

    #[test]
    fn empty_multipolygon_has_no_centroid() {
        let raw = RawGeometry::from_text(r#"{"type":"MultiPolygon","coordinates":[]}"#);
        assert_eq!(raw.centroid().unwrap_err(), GeometryError::Degenerate);
    }
}
