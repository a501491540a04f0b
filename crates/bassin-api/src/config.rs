//! # Service Configuration
//!
//! Built from the environment in the binary only; everything else receives
//! an explicit [`AppConfig`].

use std::path::PathBuf;

use bassin_store::PgConfig;

/// Which backend serves units and records.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// PostGIS tables written by the bulk loader.
    Postgres(PgConfig),
    /// GeoJSON layers and the CSV ledger, held in memory.
    FlatFiles { data_dir: PathBuf },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub backend: BackendConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 5000)
    /// - `BASSIN_BACKEND`: `postgres` or `files` (default: `postgres` when
    ///   `DATABASE_URL` is set, `files` otherwise)
    /// - `BASSIN_DATA_DIR` (default: `data`)
    /// - `BASSIN_LOG_FORMAT`: `json` for structured output
    /// - `DATABASE_URL`, `BASSIN_DB_MAX_CONNECTIONS`, `BASSIN_DB_ACQUIRE_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`AppConfig::from_env`] over an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(5000);
        let log_format = match lookup("BASSIN_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let postgres = match lookup("BASSIN_BACKEND").as_deref() {
            Some("files") => false,
            Some("postgres") => true,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
            None => lookup("DATABASE_URL").is_some(),
        };
        let backend = if postgres {
            BackendConfig::Postgres(PgConfig::from_lookup(&lookup)?)
        } else {
            BackendConfig::FlatFiles {
                data_dir: lookup("BASSIN_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data")),
            }
        };

        Ok(Self {
            port,
            backend,
            log_format,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Database(#[from] bassin_store::ConfigError),
    #[error("unknown BASSIN_BACKEND {0:?}, expected `postgres` or `files`")]
    UnknownBackend(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_to_flat_files_on_port_5000() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert!(matches!(cfg.backend, BackendConfig::FlatFiles { ref data_dir } if data_dir == &PathBuf::from("data")));
    }

    #[test]
    fn database_url_selects_postgres() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/cameroun_production_db"),
            ("BASSIN_DB_MAX_CONNECTIONS", "3"),
        ])
        .unwrap();
        match cfg.backend {
            BackendConfig::Postgres(pg) => {
                assert_eq!(pg.database_url.as_str(), "postgres://localhost/cameroun_production_db");
                assert_eq!(pg.max_connections, 3);
            }
            other => panic!("unexpected backend: {other:?}"),
        }
    }

    #[test]
    fn files_backend_can_be_forced() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("BASSIN_BACKEND", "files"),
            ("BASSIN_DATA_DIR", "/srv/atlas"),
        ])
        .unwrap();
        assert!(matches!(cfg.backend, BackendConfig::FlatFiles { .. }));
    }

    #[test]
    fn postgres_without_url_is_an_error() {
        assert!(matches!(
            config(&[("BASSIN_BACKEND", "postgres")]),
            Err(ConfigError::Database(bassin_store::ConfigError::MissingDatabaseUrl))
        ));
        assert!(matches!(
            config(&[("BASSIN_BACKEND", "sqlite")]),
            Err(ConfigError::UnknownBackend(_))
        ));
    }

    #[test]
    fn port_and_log_format() {
        let cfg = config(&[("PORT", "8081"), ("BASSIN_LOG_FORMAT", "json")]).unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }
}
