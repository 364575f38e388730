use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "MedLab";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DB_FILE_NAME: &str = "medlab.db";

pub const ENV_DB_PATH: &str = "MEDLAB_DB_PATH";
pub const ENV_BIND: &str = "MEDLAB_BIND";
pub const ENV_API_URL: &str = "MEDLAB_API_URL";
pub const ENV_SEED: &str = "MEDLAB_SEED";
pub const ENV_SQL_ROW_CAP: &str = "MEDLAB_SQL_ROW_CAP";

/// Get the application data directory
/// ~/MedLab/ when a home directory is known, ./MedLab otherwise
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database file inside the data directory
pub fn default_db_path() -> PathBuf {
    app_data_dir().join(DB_FILE_NAME)
}

/// Log filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> String {
    "medlab=info".to_string()
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBind { var: &'static str, value: String },

    #[error("{var} must be a positive integer: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Runtime configuration resolved from `MEDLAB_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    pub api_url: String,
    pub seed_demo_data: bool,
    pub sql_row_cap: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = get(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let bind_text = get(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_text.parse().map_err(|_| ConfigError::InvalidBind {
            var: ENV_BIND,
            value: bind_text.clone(),
        })?;

        let api_url = get(ENV_API_URL)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let seed_demo_data = get(ENV_SEED)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let sql_row_cap = match get(ENV_SQL_ROW_CAP) {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    var: ENV_SQL_ROW_CAP,
                    value: v,
                })?,
            None => crate::db::DEFAULT_SQL_ROW_CAP,
        };

        Ok(Config {
            db_path,
            bind,
            api_url,
            seed_demo_data,
            sql_row_cap,
        })
    }
}
