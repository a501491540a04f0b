//! # Listing Routes
//!
//! Distinct commodities (`/api/bassins`), distinct value-chains
//! (`/api/filieres`) and the raw ledger (`/api/productions`).

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use bassin_core::{FilterValue, ProductionRecord};
use serde::Serialize;
use utoipa::{IntoParams, ToSchema};

use super::query::QueryPairs;
use crate::state::AppState;

#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommodityParams {
    /// Only commodities of this value-chain; absent, empty or `Tous` means all.
    pub filiere: Option<String>,
}

impl From<&QueryPairs> for CommodityParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            filiere: pairs.first_owned("filiere"),
        }
    }
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRow {
    pub region_code: String,
    pub commodity: String,
    pub value_chain: String,
    /// Estimated tonnes; `null` when not reported.
    pub quantity: Option<f64>,
}

impl From<ProductionRecord> for ProductionRow {
    fn from(record: ProductionRecord) -> Self {
        Self {
            region_code: record.region_code.as_str().to_string(),
            commodity: record.commodity,
            value_chain: record.value_chain,
            quantity: record.quantity,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bassins", get(list_commodities))
        .route("/api/filieres", get(list_value_chains))
        .route("/api/productions", get(list_productions))
}

/// GET /api/bassins — Distinct commodities, sorted.
#[utoipa::path(
    get,
    path = "/api/bassins",
    params(CommodityParams),
    responses(
        (status = 200, description = "Distinct commodities", body = Vec<String>),
    ),
    tag = "catalog"
)]
pub async fn list_commodities(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Json<Vec<String>> {
    let params = CommodityParams::from(&pairs);
    let value_chain = FilterValue::resolve(params.filiere.as_deref());
    Json(state.atlas.commodities(&value_chain).await)
}

/// GET /api/filieres — Distinct value-chains, sorted.
#[utoipa::path(
    get,
    path = "/api/filieres",
    responses(
        (status = 200, description = "Distinct value-chains", body = Vec<String>),
    ),
    tag = "catalog"
)]
pub async fn list_value_chains(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.atlas.value_chains().await)
}

/// GET /api/productions — The whole production ledger.
#[utoipa::path(
    get,
    path = "/api/productions",
    responses(
        (status = 200, description = "Production ledger rows", body = Vec<ProductionRow>),
    ),
    tag = "catalog"
)]
pub async fn list_productions(State(state): State<AppState>) -> Json<Vec<ProductionRow>> {
    let rows = state
        .atlas
        .productions()
        .await
        .into_iter()
        .map(ProductionRow::from)
        .collect();
    Json(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_row_is_camel_case() {
        let row = ProductionRow::from(ProductionRecord::new("CM004", "Maïs", "Céréales", None));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["regionCode"], "CM004");
        assert_eq!(json["valueChain"], "Céréales");
        assert!(json["quantity"].is_null());
    }
}
