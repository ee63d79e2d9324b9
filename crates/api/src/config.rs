//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use labelforge_infra::artifacts::DEFAULT_RETENTION;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_SECRET: &str = "dev-secret";
const DEFAULT_OUTPUT_DIR: &str = "./stickers";
const DEFAULT_SELECTION_TTL_SECS: i64 = 1800;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")]
    MissingDatabaseUrl,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `Some` selects the Postgres-backed stores.
    pub database_url: Option<String>,
    pub output_dir: PathBuf,
    /// Generated PDFs kept on disk before the oldest is evicted.
    pub artifact_retention: usize,
    /// JSON product list loaded into the in-memory catalog.
    pub catalog_seed: Option<PathBuf>,
    pub selection_ttl: chrono::Duration,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let persistent = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(v) => v.trim().parse::<bool>().map_err(|_| ConfigError::Invalid {
                var: "USE_PERSISTENT_STORES",
                value: v.clone(),
            })?,
        };
        let database_url = if persistent {
            Some(lookup("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?)
        } else {
            None
        };

        let output_dir = lookup("STICKER_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let artifact_retention = match lookup("STICKER_RETENTION") {
            None => DEFAULT_RETENTION,
            Some(v) => v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    var: "STICKER_RETENTION",
                    value: v.clone(),
                })?,
        };

        let catalog_seed = lookup("CATALOG_SEED_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let ttl_secs = match lookup("SELECTION_TTL_SECS") {
            None => DEFAULT_SELECTION_TTL_SECS,
            Some(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    var: "SELECTION_TTL_SECS",
                    value: v.clone(),
                })?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url,
            output_dir,
            artifact_retention,
            catalog_seed,
            selection_ttl: chrono::Duration::seconds(ttl_secs),
        })
    }

    /// In-memory configuration writing PDFs to `output_dir`.
    pub fn in_memory(jwt_secret: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            database_url: None,
            output_dir: output_dir.into(),
            artifact_retention: DEFAULT_RETENTION,
            catalog_seed: None,
            selection_ttl: chrono::Duration::seconds(DEFAULT_SELECTION_TTL_SECS),
        }
    }
}
