//! # Flat-File Data Set
//!
//! Reads the three boundary layers (GeoJSON FeatureCollections) and the
//! production ledger (CSV) from a data directory. The same reader feeds the
//! in-memory backend and the PostGIS bulk loader.
//!
//! ## Normalization
//!
//! - Only EPSG:4326 / OGC CRS84 layers (or layers without a `crs` member)
//!   are accepted; reprojection is not performed.
//! - Polygons are stored as MultiPolygons.
//! - Ledger quantity cells that are empty or `NA` are absent.

use std::fs;
use std::path::{Path, PathBuf};

use bassin_core::geometry::RawGeometry;
use bassin_core::{AdminLevel, AdministrativeUnit, Catalog, ProductionRecord, UnitCode};
use geojson::{FeatureCollection, GeoJson, JsonValue};

use crate::error::LoadError;

/// File name and attribute names of one boundary layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSchema {
    pub file: String,
    pub code: String,
    pub name: String,
    /// Parent code attribute; `None` for the region layer.
    pub parent: Option<String>,
}

impl LayerSchema {
    fn new(file: &str, code: &str, name: &str, parent: Option<&str>) -> Self {
        Self {
            file: file.into(),
            code: code.into(),
            name: name.into(),
            parent: parent.map(Into::into),
        }
    }
}

/// File name and column names of the production ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSchema {
    pub file: String,
    pub region: String,
    pub commodity: String,
    pub value_chain: String,
    pub quantity: String,
}

/// Where each layer lives inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub regions: LayerSchema,
    pub departments: LayerSchema,
    pub communes: LayerSchema,
    pub ledger: LedgerSchema,
}

impl Default for DataLayout {
    /// The Cameroon administrative boundary export.
    fn default() -> Self {
        Self {
            regions: LayerSchema::new("cmr_admin1.geojson", "adm1_pcode", "adm1_name1", None),
            departments: LayerSchema::new(
                "cmr_admin2.geojson",
                "adm2_pcode",
                "adm2_name1",
                Some("adm1_pcode"),
            ),
            communes: LayerSchema::new(
                "cmr_admin3.geojson",
                "adm3_pcode",
                "adm3_name1",
                Some("adm2_pcode"),
            ),
            ledger: LedgerSchema {
                file: "productions.csv".into(),
                region: "region_pcode".into(),
                commodity: "produit".into(),
                value_chain: "filiere".into(),
                quantity: "production_tonnes_estimee".into(),
            },
        }
    }
}

impl DataLayout {
    pub fn layer(&self, level: AdminLevel) -> &LayerSchema {
        match level {
            AdminLevel::Region => &self.regions,
            AdminLevel::Department => &self.departments,
            AdminLevel::Commune => &self.communes,
        }
    }

    /// Every file of the layout, boundary layers first.
    pub fn files(&self, data_dir: &Path) -> Vec<PathBuf> {
        AdminLevel::ALL
            .iter()
            .map(|level| data_dir.join(&self.layer(*level).file))
            .chain(std::iter::once(data_dir.join(&self.ledger.file)))
            .collect()
    }
}

/// Whether the ledger file may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ledger {
    /// Missing ledger aborts the load.
    Required,
    /// Missing ledger loads as empty.
    Optional,
}

/// Presence of each data file.
pub fn verify_files(data_dir: &Path, layout: &DataLayout) -> Vec<(PathBuf, bool)> {
    layout
        .files(data_dir)
        .into_iter()
        .map(|path| {
            let exists = path.is_file();
            (path, exists)
        })
        .collect()
}

/// Read and validate the whole data set.
pub fn load_catalog(data_dir: &Path, layout: &DataLayout, ledger: Ledger) -> Result<Catalog, LoadError> {
    let regions = read_layer(&data_dir.join(&layout.regions.file), AdminLevel::Region, &layout.regions)?;
    let departments = read_layer(
        &data_dir.join(&layout.departments.file),
        AdminLevel::Department,
        &layout.departments,
    )?;
    let communes = read_layer(
        &data_dir.join(&layout.communes.file),
        AdminLevel::Commune,
        &layout.communes,
    )?;

    let ledger_path = data_dir.join(&layout.ledger.file);
    let records = match (ledger_path.is_file(), ledger) {
        (true, _) => read_ledger(&ledger_path, &layout.ledger)?,
        (false, Ledger::Optional) => {
            tracing::warn!(path = %ledger_path.display(), "production ledger missing, serving without production figures");
            Vec::new()
        }
        (false, Ledger::Required) => return Err(LoadError::MissingFile { path: ledger_path }),
    };

    let catalog = Catalog::new(regions, departments, communes, records)?;
    let report = catalog.integrity_report();
    for fault in &report.dangling {
        tracing::warn!(error = %fault, "unit will be dropped from listings");
    }
    if !report.orphan_record_regions.is_empty() {
        tracing::warn!(regions = ?report.orphan_record_regions, "production records reference unknown regions");
    }
    tracing::info!(
        regions = report.regions,
        departments = report.departments,
        communes = report.communes,
        records = report.records,
        "data set loaded"
    );
    Ok(catalog)
}

/// Read one boundary layer.
pub fn read_layer(
    path: &Path,
    level: AdminLevel,
    schema: &LayerSchema,
) -> Result<Vec<AdministrativeUnit>, LoadError> {
    let collection = read_feature_collection(path)?;
    check_crs(path, &collection)?;

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let missing = |property: &str| LoadError::MissingProperty {
                path: path.to_path_buf(),
                record: index as u64,
                property: property.to_string(),
            };
            let code = feature
                .property(&schema.code)
                .and_then(attribute_text)
                .ok_or_else(|| missing(&schema.code))?;
            let name = feature
                .property(&schema.name)
                .and_then(attribute_text)
                .ok_or_else(|| missing(&schema.name))?;
            let parent = schema
                .parent
                .as_ref()
                .and_then(|p| feature.property(p))
                .and_then(attribute_text)
                .map(UnitCode::from);
            let geometry = feature
                .geometry
                .map(RawGeometry::from_geojson)
                .transpose()
                .map_err(|source| LoadError::Geometry {
                    path: path.to_path_buf(),
                    code: code.clone(),
                    source,
                })?;

            Ok(AdministrativeUnit {
                level,
                code: UnitCode::from(code),
                name,
                parent_code: parent,
                geometry,
            })
        })
        .collect()
}

fn read_feature_collection(path: &Path) -> Result<FeatureCollection, LoadError> {
    if !path.is_file() {
        return Err(LoadError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| LoadError::Json {
        path: path.to_path_buf(),
        reason,
    };
    match text.parse::<GeoJson>().map_err(|e| invalid(e.to_string()))? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(invalid("expected a FeatureCollection".into())),
    }
}

/// Accept a missing `crs` member or one naming WGS84 lon/lat.
fn check_crs(path: &Path, collection: &FeatureCollection) -> Result<(), LoadError> {
    let Some(crs) = collection.foreign_members.as_ref().and_then(|m| m.get("crs")) else {
        return Ok(());
    };
    let name = crs
        .pointer("/properties/name")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    if is_wgs84(name) {
        Ok(())
    } else {
        // No reprojection here: layers must be exported in WGS84 upstream.
        Err(LoadError::UnsupportedCrs {
            path: path.to_path_buf(),
            crs: if name.is_empty() { crs.to_string() } else { name.to_string() },
        })
    }
}

/// `EPSG:4326` in any of its spellings (`EPSG::4326`, versioned URNs such as
/// `urn:ogc:def:crs:EPSG:6.6:4326`) or OGC `CRS84`.
fn is_wgs84(name: &str) -> bool {
    let upper = name.trim().to_ascii_uppercase();
    let mut segments = upper.rsplit(':');
    match segments.next().unwrap_or_default() {
        "CRS84" => true,
        "4326" => segments.any(|s| s == "EPSG"),
        _ => false,
    }
}

/// Text of a code or name attribute. Numeric codes are accepted as text.
fn attribute_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read the production ledger.
pub fn read_ledger(path: &Path, schema: &LedgerSchema) -> Result<Vec<ProductionRecord>, LoadError> {
    if !path.is_file() {
        return Err(LoadError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| LoadError::MissingProperty {
                path: path.to_path_buf(),
                record: 1,
                property: name.to_string(),
            })
    };
    let region = column(&schema.region)?;
    let commodity = column(&schema.commodity)?;
    let value_chain = column(&schema.value_chain)?;
    let quantity = column(&schema.quantity)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let cell = |index: usize| row.get(index).unwrap_or_default();

        let raw_quantity = cell(quantity);
        let parsed = parse_quantity(raw_quantity).ok_or_else(|| LoadError::InvalidQuantity {
            path: path.to_path_buf(),
            line,
            value: raw_quantity.to_string(),
        })?;
        records.push(ProductionRecord::new(
            cell(region),
            cell(commodity),
            cell(value_chain),
            parsed,
        ));
    }
    Ok(records)
}

/// `Some(None)` for an absent cell, `Some(Some(q))` for a number, `None`
/// when the cell is garbage.
fn parse_quantity(raw: &str) -> Option<Option<f64>> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("NA") {
        return Some(None);
    }
    raw.parse::<f64>().ok().filter(|q| q.is_finite()).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CM: &str = r#"{"type":"Polygon","coordinates":[[[10,4],[12,4],[12,6],[10,6],[10,4]]]}"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn collection(crs: Option<&str>, features: &[String]) -> String {
        let crs = crs
            .map(|name| format!(r#""crs":{{"type":"name","properties":{{"name":"{name}"}}}},"#))
            .unwrap_or_default();
        format!(r#"{{"type":"FeatureCollection",{crs}"features":[{}]}}"#, features.join(","))
    }

    fn feature(props: &str, geometry: &str) -> String {
        format!(r#"{{"type":"Feature","properties":{{{props}}},"geometry":{geometry}}}"#)
    }

    #[test]
    fn region_layer_is_read_and_polygons_become_multipolygons() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "r.geojson",
            &collection(None, &[feature(r#""adm1_pcode":"CM001","adm1_name1":"Adamaoua""#, CM)]),
        );
        let units = read_layer(&path, AdminLevel::Region, &DataLayout::default().regions).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].code.as_str(), "CM001");
        assert_eq!(units[0].parent_code, None);
        let geometry = units[0].geometry.as_ref().unwrap();
        assert!(geometry.as_str().contains("MultiPolygon"));
    }

    #[test]
    fn department_layer_reads_parent_code() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "d.geojson",
            &collection(
                Some("urn:ogc:def:crs:OGC:1.3:CRS84"),
                &[feature(
                    r#""adm2_pcode":"CM001001","adm2_name1":"Djérem","adm1_pcode":"CM001""#,
                    CM,
                )],
            ),
        );
        let units = read_layer(&path, AdminLevel::Department, &DataLayout::default().departments).unwrap();
        assert_eq!(units[0].parent_code, Some(UnitCode::from("CM001")));
    }

    #[test]
    fn null_geometry_is_kept_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "r.geojson",
            &collection(None, &[feature(r#""adm1_pcode":"CM001","adm1_name1":"A""#, "null")]),
        );
        let units = read_layer(&path, AdminLevel::Region, &DataLayout::default().regions).unwrap();
        assert!(units[0].geometry.is_none());
    }

    #[test]
    fn projected_crs_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "r.geojson",
            &collection(
                Some("urn:ogc:def:crs:EPSG::32633"),
                &[feature(r#""adm1_pcode":"CM001","adm1_name1":"A""#, CM)],
            ),
        );
        let err = read_layer(&path, AdminLevel::Region, &DataLayout::default().regions).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedCrs { .. }));
    }

    #[test]
    fn wgs84_spellings_are_accepted() {
        for name in [
            "EPSG:4326",
            "urn:ogc:def:crs:EPSG::4326",
            "urn:ogc:def:crs:EPSG:6.6:4326",
            "urn:ogc:def:crs:OGC:1.3:CRS84",
        ] {
            assert!(is_wgs84(name), "{name}");
        }
        for name in ["urn:ogc:def:crs:EPSG::32633", "ESRI:4326", "4326", ""] {
            assert!(!is_wgs84(name), "{name}");
        }
    }

    #[test]
    fn versioned_urn_layer_loads() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "r.geojson",
            &collection(
                Some("urn:ogc:def:crs:EPSG:6.6:4326"),
                &[feature(r#""adm1_pcode":"CM001","adm1_name1":"A""#, CM)],
            ),
        );
        let units = read_layer(&path, AdminLevel::Region, &DataLayout::default().regions).unwrap();
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn missing_code_property_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "r.geojson",
            &collection(None, &[feature(r#""adm1_name1":"A""#, CM)]),
        );
        let err = read_layer(&path, AdminLevel::Region, &DataLayout::default().regions).unwrap_err();
        assert!(matches!(err, LoadError::MissingProperty { ref property, .. } if property == "adm1_pcode"));
    }

    #[test]
    fn point_geometry_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "r.geojson",
            &collection(
                None,
                &[feature(r#""adm1_pcode":"CM001","adm1_name1":"A""#, r#"{"type":"Point","coordinates":[1,2]}"#)],
            ),
        );
        let err = read_layer(&path, AdminLevel::Region, &DataLayout::default().regions).unwrap_err();
        assert!(matches!(err, LoadError::Geometry { .. }));
    }

    #[test]
    fn ledger_quantities_are_parsed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "p.csv",
            "region_pcode,produit,filiere,production_tonnes_estimee,source\n\
             CM001,maize,cereals,100,survey\n\
             CM001,cocoa,cash-crops,,survey\n\
             CM002,maize,cereals,NA,survey\n\
             CM002,rice,cereals, 12.5 ,survey\n",
        );
        let records = read_ledger(&path, &DataLayout::default().ledger).unwrap();
        let quantities: Vec<_> = records.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![Some(100.0), None, None, Some(12.5)]);
        assert_eq!(records[0].region_code.as_str(), "CM001");
        assert_eq!(records[3].commodity, "rice");
    }

    #[test]
    fn garbage_quantity_names_the_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "p.csv",
            "region_pcode,produit,filiere,production_tonnes_estimee\nCM001,maize,cereals,lots\n",
        );
        let err = read_ledger(&path, &DataLayout::default().ledger).unwrap_err();
        assert!(matches!(err, LoadError::InvalidQuantity { line: 2, .. }));
    }

    #[test]
    fn missing_ledger_column_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "p.csv", "region_pcode,produit\nCM001,maize\n");
        let err = read_ledger(&path, &DataLayout::default().ledger).unwrap_err();
        assert!(matches!(err, LoadError::MissingProperty { .. }));
    }

    #[test]
    fn quantity_cells() {
        assert_eq!(parse_quantity(""), Some(None));
        assert_eq!(parse_quantity("na"), Some(None));
        assert_eq!(parse_quantity("3"), Some(Some(3.0)));
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("inf"), None);
    }

    #[test]
    fn verify_lists_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "productions.csv", "x\n");
        let status = verify_files(tmp.path(), &DataLayout::default());
        assert_eq!(status.len(), 4);
        assert_eq!(status.iter().filter(|(_, ok)| *ok).count(), 1);
    }
}
