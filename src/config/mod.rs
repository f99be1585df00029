//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `DEALMATCH_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::pipeline::ArtifactSources;

/// Wildcard accepted in `DEALMATCH_CORS_ORIGINS`.
pub const ANY_ORIGIN: &str = "*";

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `DEALMATCH_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding the deal catalog CSV. Default: `./data`.
    pub data_dir: PathBuf,

    /// Directory holding vocabularies, catalog vectors and weights.
    /// Default: `./models/checkpoints`.
    pub checkpoint_dir: PathBuf,

    /// Allowed CORS origins. Default: `["*"]`.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            data_dir: PathBuf::from("./data"),
            checkpoint_dir: PathBuf::from("./models/checkpoints"),
            cors_origins: vec![ANY_ORIGIN.to_string()],
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "DEALMATCH_PORT";
    const ENV_BIND_ADDR: &'static str = "DEALMATCH_BIND_ADDR";
    const ENV_DATA_DIR: &'static str = "DEALMATCH_DATA_DIR";
    const ENV_CHECKPOINT_DIR: &'static str = "DEALMATCH_CHECKPOINT_DIR";
    const ENV_CORS_ORIGINS: &'static str = "DEALMATCH_CORS_ORIGINS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let data_dir = Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir);
        let checkpoint_dir =
            Self::parse_path_from_env(Self::ENV_CHECKPOINT_DIR, defaults.checkpoint_dir);
        let cors_origins = Self::parse_list_from_env(Self::ENV_CORS_ORIGINS, defaults.cors_origins);

        Ok(Self {
            port,
            bind_addr,
            data_dir,
            checkpoint_dir,
            cors_origins,
        })
    }

    /// Checks both artifact directories exist and every CORS origin is well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_dir(&self.data_dir)?;
        Self::require_dir(&self.checkpoint_dir)?;

        for origin in &self.cors_origins {
            let valid = origin == ANY_ORIGIN
                || origin.starts_with("http://")
                || origin.starts_with("https://");
            if !valid {
                return Err(ConfigError::InvalidOrigin {
                    value: origin.clone(),
                });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// `true` when the origin list is empty or contains `*`.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == ANY_ORIGIN)
    }

    /// Artifact paths under the configured directories.
    pub fn artifact_sources(&self) -> ArtifactSources {
        ArtifactSources::from_dirs(&self.data_dir, &self.checkpoint_dir)
    }

    fn require_dir(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    /// Comma separated, trimmed, empty items dropped. An empty variable means the default.
    fn parse_list_from_env(var_name: &str, default: Vec<String>) -> Vec<String> {
        let items: Vec<String> = env::var(var_name)
            .unwrap_or_default()
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();

        if items.is_empty() { default } else { items }
    }
}
