//! # bassin-api — Axum HTTP Service for the Production-Basin Atlas
//!
//! Serves Cameroon's administrative boundaries annotated with regional
//! agricultural production estimates, the commodity and value-chain
//! catalogs, and commodity heatmaps.
//!
//! ## API Surface
//!
//! | Path                | Module                | Answer                         |
//! |---------------------|-----------------------|--------------------------------|
//! | `/api/regions`      | [`routes::units`]     | GeoJSON FeatureCollection      |
//! | `/api/departments`  | [`routes::units`]     | GeoJSON FeatureCollection      |
//! | `/api/communes`     | [`routes::units`]     | GeoJSON FeatureCollection      |
//! | `/api/bassins`      | [`routes::catalog`]   | sorted commodity names         |
//! | `/api/filieres`     | [`routes::catalog`]   | sorted value-chain names       |
//! | `/api/productions`  | [`routes::catalog`]   | ledger rows                    |
//! | `/api/heatmap`      | [`routes::heatmap`]   | `[[lat, lon, tonnes], ...]`    |
//! | `/openapi.json`     | [`openapi`]           | OpenAPI document               |
//!
//! Data faults never surface as errors: an unreachable backend answers with
//! an empty collection and status 200. `/health/readiness` is where backend
//! availability is reported.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::units::router())
        .merge(routes::catalog::router())
        .merge(routes::heatmap::router())
        .merge(openapi::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 once both sources answer, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> Response {
    match state.atlas.ready().await {
        Ok(()) => "ready".into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
        }
    }
}
