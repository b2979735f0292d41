//! INI configuration file.
//!
//! Settings live in `config.ini` under the platform config directory
//! (`~/.config/tourfence/config.ini` on Linux). Missing files and missing
//! keys fall back to defaults; the file only needs to name what differs.
//!
//! ```ini
//! [filter]
//! window_size = 12
//! max_accuracy_m = 50
//! stability_threshold_m = 3
//! stability_duration_ms = 8000
//!
//! [geofence]
//! radius_override_m = 30
//!
//! [session]
//! channel_capacity = 64
//!
//! [logging]
//! level = info
//! file = /var/log/tourfence.log
//! ```

mod keys;

pub use keys::ConfigKey;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::geofence::GeofenceRadius;
use crate::logging::LoggingOptions;
use crate::position::{
    FilterConfig, DEFAULT_CAPACITY, DEFAULT_MAX_ACCURACY_M, DEFAULT_STABILITY_DURATION_MS,
    DEFAULT_STABILITY_THRESHOLD_M,
};
use crate::session::{SessionConfig, DEFAULT_CHANNEL_CAPACITY};

const FILTER_SECTION: &str = "filter";
const GEOFENCE_SECTION: &str = "geofence";
const SESSION_SECTION: &str = "session";
const LOGGING_SECTION: &str = "logging";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// `[filter]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    pub window_size: usize,
    pub max_accuracy_m: f64,
    pub stability_threshold_m: f64,
    pub stability_duration_ms: u64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_CAPACITY,
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
            stability_threshold_m: DEFAULT_STABILITY_THRESHOLD_M,
            stability_duration_ms: DEFAULT_STABILITY_DURATION_MS,
        }
    }
}

/// `[geofence]` section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeofenceSettings {
    /// Radius applied to every point; `None` uses each point's own radius.
    pub radius_override_m: Option<u32>,
}

/// `[session]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub channel_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub filter: FilterSettings,
    pub geofence: GeofenceSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

/// Path of the user configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Directory holding the configuration file.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tourfence")
}

impl ConfigFile {
    /// Load from the default location, or defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the default location, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_err = |source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        self.to_ini().write_to_file(path).map_err(write_err)?;
        tracing::debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigFileError> {
        let mut config = Self::default();

        // Loaded values go through the same validation as `config set`
        for key in ConfigKey::all() {
            let Some(value) = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()))
            else {
                continue;
            };
            if *key == ConfigKey::LoggingLevel && value.trim().is_empty() {
                continue;
            }
            key.set(&mut config, value)?;
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some(FILTER_SECTION))
            .set("window_size", self.filter.window_size.to_string())
            .set("max_accuracy_m", self.filter.max_accuracy_m.to_string())
            .set(
                "stability_threshold_m",
                self.filter.stability_threshold_m.to_string(),
            )
            .set(
                "stability_duration_ms",
                self.filter.stability_duration_ms.to_string(),
            );

        ini.with_section(Some(GEOFENCE_SECTION)).set(
            "radius_override_m",
            self.geofence
                .radius_override_m
                .map(|r| r.to_string())
                .unwrap_or_default(),
        );

        ini.with_section(Some(SESSION_SECTION))
            .set("channel_capacity", self.session.channel_capacity.to_string());

        ini.with_section(Some(LOGGING_SECTION))
            .set("level", self.logging.level.clone())
            .set(
                "file",
                self.logging
                    .file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            );

        ini
    }

    /// Filter settings as a [`FilterConfig`].
    pub fn to_filter_config(&self) -> FilterConfig {
        FilterConfig {
            window_size: self.filter.window_size,
            max_accuracy_m: self.filter.max_accuracy_m,
            stability_threshold_m: self.filter.stability_threshold_m,
            stability_duration_ms: self.filter.stability_duration_ms,
        }
    }

    /// Session settings as a [`SessionConfig`].
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            filter: self.to_filter_config(),
            channel_capacity: self.session.channel_capacity,
        }
    }

    /// Radius knob initialised from `[geofence] radius_override_m`.
    pub fn to_radius(&self) -> GeofenceRadius {
        match self.geofence.radius_override_m {
            Some(meters) => GeofenceRadius::with_override(meters),
            None => GeofenceRadius::new(),
        }
    }

    /// Logging options from the `[logging]` section.
    pub fn to_logging_options(&self) -> LoggingOptions {
        LoggingOptions {
            level: self.logging.level.clone(),
            file: self.logging.file.clone(),
        }
    }
}

pub(crate) fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigFileError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Empty or zero means no override.
pub(crate) fn parse_radius(value: &str) -> Result<Option<u32>, ConfigFileError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    let meters: u32 = parse_value("geofence.radius_override_m", value)?;
    Ok((meters > 0).then_some(meters))
}

pub(crate) fn non_empty_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
