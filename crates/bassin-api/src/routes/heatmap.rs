//! # Heatmap Route
//!
//! `/api/heatmap` reduces the units one level below the requested scope to
//! `[latitude, longitude, tonnes]` triples weighted by their region's total
//! for the selected commodity.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use bassin_core::{HeatPoint, HeatmapQuery};
use utoipa::IntoParams;

use super::query::QueryPairs;
use crate::state::AppState;

#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HeatmapParams {
    /// Commodity; absent, empty or `Tous` yields an empty heatmap.
    pub bassin: Option<String>,
    /// Value-chain filter; absent, empty or `Tous` means all.
    pub filiere: Option<String>,
    /// Restrict to the departments of this region.
    pub region_pcode: Option<String>,
    /// Restrict to the communes of this department. Wins over `region_pcode`.
    pub department_pcode: Option<String>,
}

impl From<&QueryPairs> for HeatmapParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            bassin: pairs.first_owned("bassin"),
            filiere: pairs.first_owned("filiere"),
            region_pcode: pairs.first_owned("region_pcode"),
            department_pcode: pairs.first_owned("department_pcode"),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/heatmap", get(heatmap))
}

/// GET /api/heatmap — Weighted centroids for one commodity.
#[utoipa::path(
    get,
    path = "/api/heatmap",
    params(HeatmapParams),
    responses(
        (status = 200, description = "List of [latitude, longitude, quantity] triples", body = Vec<Vec<f64>>),
    ),
    tag = "heatmap"
)]
pub async fn heatmap(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Json<Vec<HeatPoint>> {
    let params = HeatmapParams::from(&pairs);
    let query = HeatmapQuery::resolve(
        params.bassin.as_deref(),
        params.filiere.as_deref(),
        params.region_pcode.as_deref(),
        params.department_pcode.as_deref(),
    );
    Json(state.atlas.heatmap(&query).await)
}
