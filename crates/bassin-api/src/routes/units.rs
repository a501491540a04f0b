//! # Boundary Routes
//!
//! `/api/regions`, `/api/departments` and `/api/communes` return GeoJSON
//! FeatureCollections of units annotated with their owning region's
//! production entries under the `filiere` / `bassin` filter.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use bassin_core::{AdminLevel, FilterPredicate, UnitQuery};
use geojson::FeatureCollection;
use serde::Serialize;
use utoipa::{IntoParams, ToSchema};

use super::query::QueryPairs;
use crate::state::AppState;

/// Filter shared by every listing: value-chain and commodity.
#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegionParams {
    /// Value-chain filter; absent, empty or `Tous` means all.
    pub filiere: Option<String>,
    /// Commodity filter; absent, empty or `Tous` means all.
    pub bassin: Option<String>,
}

impl From<&QueryPairs> for RegionParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            filiere: pairs.first_owned("filiere"),
            bassin: pairs.first_owned("bassin"),
        }
    }
}

#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepartmentParams {
    /// Only departments of this region.
    pub region_pcode: Option<String>,
    pub filiere: Option<String>,
    pub bassin: Option<String>,
}

impl From<&QueryPairs> for DepartmentParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            region_pcode: pairs.first_owned("region_pcode"),
            filiere: pairs.first_owned("filiere"),
            bassin: pairs.first_owned("bassin"),
        }
    }
}

#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommuneParams {
    /// Only communes of this department.
    pub department_pcode: Option<String>,
    pub filiere: Option<String>,
    pub bassin: Option<String>,
}

impl From<&QueryPairs> for CommuneParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            department_pcode: pairs.first_owned("department_pcode"),
            filiere: pairs.first_owned("filiere"),
            bassin: pairs.first_owned("bassin"),
        }
    }
}

/// GeoJSON FeatureCollection of administrative units.
///
/// Each feature carries `code`, `name`, `level`, `parentCode` (departments
/// and communes) and `productions: [{commodity, quantity, valueChain}]`.
#[derive(Serialize, ToSchema)]
pub struct UnitCollection {
    #[schema(example = "FeatureCollection")]
    pub r#type: String,
    #[schema(value_type = Vec<Object>)]
    pub features: Vec<serde_json::Value>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/regions", get(list_regions))
        .route("/api/departments", get(list_departments))
        .route("/api/communes", get(list_communes))
}

/// GET /api/regions — All regions.
#[utoipa::path(
    get,
    path = "/api/regions",
    params(RegionParams),
    responses(
        (status = 200, description = "Regions with production entries", body = UnitCollection),
    ),
    tag = "units"
)]
pub async fn list_regions(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Json<FeatureCollection> {
    let params = RegionParams::from(&pairs);
    let query = UnitQuery::regions(FilterPredicate::resolve(
        params.filiere.as_deref(),
        params.bassin.as_deref(),
    ));
    Json(state.atlas.features(&query).await)
}

/// GET /api/departments — Departments, optionally of one region.
#[utoipa::path(
    get,
    path = "/api/departments",
    params(DepartmentParams),
    responses(
        (status = 200, description = "Departments carrying their region's production entries", body = UnitCollection),
    ),
    tag = "units"
)]
pub async fn list_departments(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Json<FeatureCollection> {
    let params = DepartmentParams::from(&pairs);
    let query = UnitQuery::new(
        AdminLevel::Department,
        params.region_pcode.as_deref(),
        FilterPredicate::resolve(params.filiere.as_deref(), params.bassin.as_deref()),
    );
    Json(state.atlas.features(&query).await)
}

/// GET /api/communes — Communes, optionally of one department.
#[utoipa::path(
    get,
    path = "/api/communes",
    params(CommuneParams),
    responses(
        (status = 200, description = "Communes carrying their region's production entries", body = UnitCollection),
    ),
    tag = "units"
)]
pub async fn list_communes(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Json<FeatureCollection> {
    let params = CommuneParams::from(&pairs);
    let query = UnitQuery::new(
        AdminLevel::Commune,
        params.department_pcode.as_deref(),
        FilterPredicate::resolve(params.filiere.as_deref(), params.bassin.as_deref()),
    );
    Json(state.atlas.features(&query).await)
}
