//! Scheduler configuration file support.
//!
//! Every tunable the selection engine and progress store depend on lives
//! here and is passed in at construction. Values are read from a TOML file;
//! missing keys fall back to the survey defaults.
//!
//! ```toml
//! [site]
//! longitude = -111.5997
//! latitude = 31.9640
//!
//! [overhead]
//! focus_time = 30.0
//!
//! [selection]
//! min_moon_sep = 50.0
//! lst_window_policy = "wrap-around"
//!
//! [progress]
//! max_exposures = 16
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scheduler::{LstWindowPolicy, SelectionStrategy};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No scheduler.toml found in standard locations")]
    NotFound,
}

/// Top-level scheduler configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub overhead: OverheadConfig,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub progress: ProgressSettings,
}

/// Observatory location. Longitude is east-positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
}

/// Telescope setup-time model constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadConfig {
    /// Focus time paid before every exposure, in seconds.
    #[serde(default = "default_focus_time")]
    pub focus_time: f64,
    /// Fixed settle time added to any slew, in seconds.
    #[serde(default = "default_slew_settle_time")]
    pub slew_settle_time: f64,
    /// Slew rate along the slower axis, in degrees per second.
    #[serde(default = "default_slew_rate")]
    pub slew_rate: f64,
    /// Floor on the total setup time, in seconds.
    #[serde(default = "default_min_overhead")]
    pub min_overhead: f64,
}

/// Window, avoidance and ranking settings for the selection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSettings {
    /// Minimum moon separation for tiles that cannot be observed in bright time.
    #[serde(default = "default_min_moon_sep")]
    pub min_moon_sep: f64,
    /// Minimum moon separation for tiles whose conditions admit bright time.
    #[serde(default = "default_min_moon_sep")]
    pub min_moon_sep_bright: f64,
    #[serde(default)]
    pub lst_window_policy: LstWindowPolicy,
    #[serde(default)]
    pub strategy: SelectionStrategy,
    /// Divisor of the LST offset in the merit function.
    #[serde(default = "default_window_resolution")]
    pub window_resolution: f64,
}

/// Progress store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSettings {
    #[serde(default = "default_max_exposures")]
    pub max_exposures: usize,
    /// Schema version a persisted store must carry to be loaded.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_longitude() -> f64 {
    -111.5997
}

fn default_latitude() -> f64 {
    31.9640
}

fn default_focus_time() -> f64 {
    30.0
}

fn default_slew_settle_time() -> f64 {
    11.5
}

fn default_slew_rate() -> f64 {
    0.45
}

fn default_min_overhead() -> f64 {
    120.0
}

fn default_min_moon_sep() -> f64 {
    50.0
}

fn default_window_resolution() -> f64 {
    600.0
}

fn default_max_exposures() -> usize {
    16
}

fn default_schema_version() -> u32 {
    crate::progress::PROGRESS_SCHEMA_VERSION
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            longitude: default_longitude(),
            latitude: default_latitude(),
        }
    }
}

impl Default for OverheadConfig {
    fn default() -> Self {
        Self {
            focus_time: default_focus_time(),
            slew_settle_time: default_slew_settle_time(),
            slew_rate: default_slew_rate(),
            min_overhead: default_min_overhead(),
        }
    }
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            min_moon_sep: default_min_moon_sep(),
            min_moon_sep_bright: default_min_moon_sep(),
            lst_window_policy: LstWindowPolicy::default(),
            strategy: SelectionStrategy::default(),
            window_resolution: default_window_resolution(),
        }
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            max_exposures: default_max_exposures(),
            schema_version: default_schema_version(),
        }
    }
}

impl SchedulerConfig {
    /// Load scheduler configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(SchedulerConfig)` if the file was read, parsed and validated
    /// * `Err(ConfigError)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: SchedulerConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        log::debug!("Loaded scheduler configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SchedulerConfig = toml::from_str(content).map_err(|source| {
            ConfigError::Parse {
                path: PathBuf::from("<string>"),
                source,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `scheduler.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("scheduler.toml"),
            PathBuf::from("backend/scheduler.toml"),
            PathBuf::from("../scheduler.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Load from the default location, or fall back to built-in defaults when
    /// no file exists. Read and parse errors are still reported.
    pub fn from_default_location_or_default() -> Result<Self, ConfigError> {
        match Self::from_default_location() {
            Err(ConfigError::NotFound) => Ok(Self::default()),
            other => other,
        }
    }

    /// Reject values that would make the overhead or ledger models meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.overhead.slew_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "overhead.slew_rate must be positive, got {}",
                self.overhead.slew_rate
            )));
        }
        if self.progress.max_exposures == 0 {
            return Err(ConfigError::Invalid(
                "progress.max_exposures must be at least 1".to_string(),
            ));
        }
        if !(self.selection.window_resolution > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "selection.window_resolution must be positive, got {}",
                self.selection.window_resolution
            )));
        }
        if !(-90.0..=90.0).contains(&self.site.latitude) {
            return Err(ConfigError::Invalid(format!(
                "site.latitude out of range: {}",
                self.site.latitude
            )));
        }
        Ok(())
    }
}
