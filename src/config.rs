//! Process configuration
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. Optional TOML file (`listings.toml` unless `--config` says otherwise)
//! 3. Environment variables prefixed `LISTINGS__`, e.g. `LISTINGS__RACING__PORT=9100`
//!
//! Command-line flags are applied on top by the binary.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::query::DefaultFieldPolicy;
use crate::storage::{repo::DEFAULT_SEED_COUNT, DEFAULT_POOL_SIZE};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "listings.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LISTINGS";

/// Settings for one listing service process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    pub bind: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub pool_size: usize,
    pub seed_count: u32,
    pub order_policy: DefaultFieldPolicy,
}

impl ServiceSettings {
    fn with_defaults(port: u16, db_path: &str) -> Self {
        Self {
            bind: "localhost".to_string(),
            port,
            db_path: PathBuf::from(db_path),
            pool_size: DEFAULT_POOL_SIZE,
            seed_count: DEFAULT_SEED_COUNT,
            order_policy: DefaultFieldPolicy::default(),
        }
    }

    /// Listen address, `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Settings for the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySettings {
    pub bind: String,
    pub port: u16,
    pub racing_endpoint: String,
    pub sports_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            bind: "localhost".to_string(),
            port: 8000,
            racing_endpoint: "http://localhost:9000".to_string(),
            sports_endpoint: "http://localhost:10000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl GatewaySettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// All process settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub racing: ServiceSettings,
    pub sports: ServiceSettings,
    pub gateway: GatewaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            racing: ServiceSettings::with_defaults(9000, "data/racing.db"),
            sports: ServiceSettings::with_defaults(10000, "data/sports.db"),
            gateway: GatewaySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, Self::environment())
    }

    /// Load settings with an explicit environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, config::ConfigError> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(file).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// `LISTINGS__SECTION__KEY` environment source.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }
}
