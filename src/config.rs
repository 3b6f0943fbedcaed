use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "MedRecon";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

const ENV_BIND_ADDR: &str = "MEDRECON_BIND_ADDR";
const ENV_DB_PATH: &str = "MEDRECON_DB_PATH";
const ENV_UPSTREAM_URL: &str = "MEDRECON_UPSTREAM_URL";
const ENV_UPSTREAM_TIMEOUT: &str = "MEDRECON_UPSTREAM_TIMEOUT_SECS";
const ENV_SEED: &str = "MEDRECON_SEED";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,
}

/// Get the application data directory
/// ~/MedRecon/ on all platforms
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(APP_NAME))
}

/// Default location of the local record store
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    Ok(app_data_dir()?.join("records.db"))
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,medrecon_lib=debug"
    } else {
        "info"
    }
}

/// Runtime settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// External record service. `None` serves records from the local store.
    pub upstream_url: Option<String>,
    pub upstream_timeout_secs: u64,
    pub seed_on_start: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                var: ENV_BIND_ADDR,
                value: bind_raw.clone(),
            })?;

        let database_path = match lookup(ENV_DB_PATH) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        let upstream_url = lookup(ENV_UPSTREAM_URL)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let upstream_timeout_secs = match lookup(ENV_UPSTREAM_TIMEOUT) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: ENV_UPSTREAM_TIMEOUT,
                value: raw.clone(),
            })?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        let seed_on_start = lookup(ENV_SEED)
            .map(|raw| matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            bind_addr,
            database_path,
            upstream_url,
            upstream_timeout_secs,
            seed_on_start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir().unwrap();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("MedRecon"));
    }

    #[test]
    fn defaults_when_env_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.upstream_url.is_none());
        assert_eq!(config.upstream_timeout_secs, DEFAULT_UPSTREAM_TIMEOUT_SECS);
        assert!(!config.seed_on_start);
        assert!(config.database_path.ends_with("records.db"));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MEDRECON_BIND_ADDR", "0.0.0.0:9000"),
            ("MEDRECON_DB_PATH", "/tmp/meds.db"),
            ("MEDRECON_UPSTREAM_URL", "http://records.local:8000/"),
            ("MEDRECON_UPSTREAM_TIMEOUT_SECS", "3"),
            ("MEDRECON_SEED", "true"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.database_path, PathBuf::from("/tmp/meds.db"));
        assert_eq!(config.upstream_url.as_deref(), Some("http://records.local:8000"));
        assert_eq!(config.upstream_timeout_secs, 3);
        assert!(config.seed_on_start);
    }

    #[test]
    fn blank_upstream_is_ignored() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("MEDRECON_UPSTREAM_URL", "  ")])).unwrap();
        assert!(config.upstream_url.is_none());
    }

    #[test]
    fn invalid_bind_addr_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("MEDRECON_BIND_ADDR", "not-an-addr")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "MEDRECON_BIND_ADDR", .. }));
    }

    #[test]
    fn invalid_timeout_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "MEDRECON_UPSTREAM_TIMEOUT_SECS",
            "soon",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
