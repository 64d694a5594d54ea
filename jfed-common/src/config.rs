//! Configuration loading and resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never aborts startup: it is logged and
//! the remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the store directory
pub const ENV_DATA_DIR: &str = "JFED_DATA_DIR";
/// Environment variable naming the bind host
pub const ENV_HOST: &str = "JFED_HOST";
/// Environment variable naming the listen port
pub const ENV_PORT: &str = "PORT";
/// Environment variable naming the per-store timeout in milliseconds
pub const ENV_STORE_TIMEOUT_MS: &str = "JFED_STORE_TIMEOUT_MS";
/// Environment variable naming the runtime environment
pub const ENV_ENVIRONMENT: &str = "JFED_ENV";

/// Compiled defaults
pub const DEFAULT_DATA_DIR: &str = "./db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime environment
///
/// Development exposes internal error messages in failure responses;
/// production hides them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl std::str::FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(Error::Config(format!("Unknown environment: {}", other))),
        }
    }
}

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    pub data_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub store_timeout_ms: Option<u64>,
    pub environment: Option<Environment>,
    pub log_level: Option<String>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub environment: Option<Environment>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Directory holding one SQLite file per backing store
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Upper bound on a single store query before it counts as failed
    pub store_timeout: Duration,
    pub environment: Environment,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            environment: Environment::Production,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from CLI overrides, environment, TOML and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Self {
        let toml = match locate_config_file(overrides.config_file.as_deref()) {
            Some(path) => match load_toml_config(&path) {
                Ok(config) => {
                    info!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    TomlConfig::default()
                }
            },
            None => TomlConfig::default(),
        };

        Self::from_layers(overrides, &toml)
    }

    /// Merge the CLI, environment and TOML tiers over the compiled defaults
    pub fn from_layers(overrides: &ConfigOverrides, toml: &TomlConfig) -> Self {
        let defaults = ServiceConfig::default();

        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| std::env::var(ENV_DATA_DIR).ok().map(PathBuf::from))
            .or_else(|| toml.data_dir.clone())
            .unwrap_or(defaults.data_dir);

        let host = overrides
            .host
            .clone()
            .or_else(|| std::env::var(ENV_HOST).ok())
            .or_else(|| toml.host.clone())
            .unwrap_or(defaults.host);

        let port = overrides
            .port
            .or_else(|| env_parsed(ENV_PORT))
            .or(toml.port)
            .unwrap_or(defaults.port);

        let store_timeout = env_parsed::<u64>(ENV_STORE_TIMEOUT_MS)
            .or(toml.store_timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.store_timeout);

        let environment = overrides
            .environment
            .or_else(|| env_parsed(ENV_ENVIRONMENT))
            .or(toml.environment)
            .unwrap_or(defaults.environment);

        let log_level = toml.log_level.clone().unwrap_or(defaults.log_level);

        Self {
            data_dir,
            host,
            port,
            store_timeout,
            environment,
            log_level,
        }
    }

    /// `host:port` pair to bind the HTTP listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read an environment variable and parse it, ignoring (with a warning) bad values
fn env_parsed<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", name, raw, e);
            None
        }
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Find the config file to use, if any
///
/// An explicit path is returned as-is (a missing file is reported when it is
/// loaded). Otherwise the per-user config directory is checked, then
/// `/etc/jfed/config.toml` on Linux.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let user_config = dirs::config_dir().map(|d| d.join("jfed").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/jfed/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
