//! # bassin-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment,
//! see [`AppConfig::from_env`].

use std::sync::Arc;

use bassin_api::config::{AppConfig, BackendConfig, LogFormat};
use bassin_api::state::AppState;
use bassin_core::Atlas;
use bassin_store::{DataLayout, PgSource};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Initialize structured tracing.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let atlas = match config.backend {
        BackendConfig::Postgres(pg) => {
            tracing::info!(?pg, "using PostGIS backend");
            let pool = pg.connect_lazy().map_err(|e| {
                tracing::error!("Database pool configuration failed: {e}");
                e
            })?;
            let source = Arc::new(PgSource::new(pool));
            Atlas::new(source.clone(), source)
        }
        BackendConfig::FlatFiles { data_dir } => {
            tracing::info!(dir = %data_dir.display(), "loading flat files");
            let source = tokio::task::spawn_blocking(move || {
                bassin_store::load_memory_source(&data_dir, &DataLayout::default())
            })
            .await?
            .map_err(|e| {
                tracing::error!("Flat-file load failed: {e}");
                e
            })?;
            Atlas::from_source(source)
        }
    };

    let app = bassin_api::app(AppState::new(atlas));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("bassin API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
