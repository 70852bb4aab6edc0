use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::adsb::{feed_url, DEFAULT_TIMEOUT, DUMP1090_PATH, DUMP1090_PORT};
use crate::aircraft::DEFAULT_LOOKUP_BASE_URL;
use crate::closest::{Observer, PROXIMITY_ALERT_KM, REFRESH_INTERVAL};
use crate::paths;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("cannot parse {path:?}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("cannot write {path:?}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub observer: ObserverConfig,
    pub feed: FeedConfig,
    pub lookup: LookupConfig,
    pub alert: AlertConfig,
    pub logging: LoggingConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ObserverConfig {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub timeout_secs: u64,
    pub refresh_interval_secs: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    pub radius_km: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        // London
        Self {
            latitude: 51.5074,
            longitude: -0.1278,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DUMP1090_PORT,
            path: DUMP1090_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            refresh_interval_secs: REFRESH_INTERVAL.as_secs(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            radius_km: PROXIMITY_ALERT_KM,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn observer(&self) -> Observer {
        Observer::new(self.observer.latitude, self.observer.longitude)
    }

    pub fn feed_url(&self) -> String {
        feed_url(&self.feed.host, self.feed.port, &self.feed.path)
    }

    pub fn feed_timeout(&self) -> Duration {
        secs_at_least_one(self.feed.timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        secs_at_least_one(self.lookup.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        secs_at_least_one(self.feed.refresh_interval_secs)
    }
}

// zero would mean "no timeout" to reqwest and a busy loop to the scheduler
fn secs_at_least_one(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

/// Read and parse a config file.
pub fn try_load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// How [`load_config`] arrived at its result.
///
/// Loading happens before logging is set up (the log level lives in the
/// config), so the outcome is returned and reported with [`ConfigOrigin::log`].
#[derive(Debug)]
pub enum ConfigOrigin {
    Loaded(PathBuf),
    Created(PathBuf),
    /// Defaults in use; the file was missing and could not be written
    Unsaved(ConfigError),
    /// Defaults in use; the file exists but could not be read or parsed
    Rejected(ConfigError),
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            ConfigOrigin::Loaded(path) => info!("Loaded config from {:?}", path),
            ConfigOrigin::Created(path) => info!("Wrote default config to {:?}", path),
            ConfigOrigin::Unsaved(e) => error!("Failed to write default config: {}", e),
            ConfigOrigin::Rejected(e) => warn!("{}, using defaults", e),
        }
    }
}

/// Load the config at `path`, or the default location when `None`.
///
/// A missing file is created with defaults. A file that cannot be read or
/// parsed is left alone and defaults are used.
pub fn load_config(path: Option<&Path>) -> (AppConfig, ConfigOrigin) {
    let path = path.map(Path::to_path_buf).unwrap_or_else(paths::default_config_path);
    if path.exists() {
        return match try_load_config(&path) {
            Ok(config) => (config, ConfigOrigin::Loaded(path)),
            Err(e) => (AppConfig::default(), ConfigOrigin::Rejected(e)),
        };
    }

    let config = AppConfig::default();
    let origin = match save_config(&path, &config) {
        Ok(()) => ConfigOrigin::Created(path),
        Err(e) => ConfigOrigin::Unsaved(e),
    };
    (config, origin)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        paths::ensure_dir(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
