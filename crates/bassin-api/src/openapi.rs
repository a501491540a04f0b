//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bassins de production — Atlas API",
        version = "0.1.0",
        description = "Administrative boundaries of Cameroon annotated with agricultural production estimates, commodity listings and production heatmaps."
    ),
    paths(
        crate::routes::units::list_regions,
        crate::routes::units::list_departments,
        crate::routes::units::list_communes,
        crate::routes::catalog::list_commodities,
        crate::routes::catalog::list_value_chains,
        crate::routes::catalog::list_productions,
        crate::routes::heatmap::heatmap,
    ),
    components(schemas(
        crate::routes::units::UnitCollection,
        crate::routes::catalog::ProductionRow,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "units", description = "Administrative boundaries"),
        (name = "catalog", description = "Commodity and value-chain listings"),
        (name = "heatmap", description = "Production heatmap"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/regions",
            "/api/departments",
            "/api/communes",
            "/api/bassins",
            "/api/filieres",
            "/api/productions",
            "/api/heatmap",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
