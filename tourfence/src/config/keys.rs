//! Addressable configuration keys (`section.key`) for get/set access.

use std::fmt;
use std::str::FromStr;

use super::{non_empty_path, parse_radius, parse_value, ConfigFile, ConfigFileError};

/// A single setting in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    FilterWindowSize,
    FilterMaxAccuracy,
    FilterStabilityThreshold,
    FilterStabilityDuration,
    GeofenceRadiusOverride,
    SessionChannelCapacity,
    LoggingLevel,
    LoggingFile,
}

const ALL_KEYS: [ConfigKey; 8] = [
    ConfigKey::FilterWindowSize,
    ConfigKey::FilterMaxAccuracy,
    ConfigKey::FilterStabilityThreshold,
    ConfigKey::FilterStabilityDuration,
    ConfigKey::GeofenceRadiusOverride,
    ConfigKey::SessionChannelCapacity,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingFile,
];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::FilterWindowSize => "filter.window_size",
            ConfigKey::FilterMaxAccuracy => "filter.max_accuracy_m",
            ConfigKey::FilterStabilityThreshold => "filter.stability_threshold_m",
            ConfigKey::FilterStabilityDuration => "filter.stability_duration_ms",
            ConfigKey::GeofenceRadiusOverride => "geofence.radius_override_m",
            ConfigKey::SessionChannelCapacity => "session.channel_capacity",
            ConfigKey::LoggingLevel => "logging.level",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// INI section the key lives in.
    pub fn section(&self) -> &'static str {
        self.split().0
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or(("", name))
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::FilterWindowSize => config.filter.window_size.to_string(),
            ConfigKey::FilterMaxAccuracy => config.filter.max_accuracy_m.to_string(),
            ConfigKey::FilterStabilityThreshold => config.filter.stability_threshold_m.to_string(),
            ConfigKey::FilterStabilityDuration => config.filter.stability_duration_ms.to_string(),
            ConfigKey::GeofenceRadiusOverride => config
                .geofence
                .radius_override_m
                .map(|r| r.to_string())
                .unwrap_or_default(),
            ConfigKey::SessionChannelCapacity => config.session.channel_capacity.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigFileError> {
        let name = self.name();
        match self {
            ConfigKey::FilterWindowSize => {
                let size: usize = parse_value(name, value)?;
                if size == 0 {
                    return Err(invalid(name, value, "must be at least 1"));
                }
                config.filter.window_size = size;
            }
            ConfigKey::FilterMaxAccuracy => {
                config.filter.max_accuracy_m = parse_positive(name, value)?;
            }
            ConfigKey::FilterStabilityThreshold => {
                config.filter.stability_threshold_m = parse_positive(name, value)?;
            }
            ConfigKey::FilterStabilityDuration => {
                config.filter.stability_duration_ms = parse_value(name, value)?;
            }
            ConfigKey::GeofenceRadiusOverride => {
                config.geofence.radius_override_m = parse_radius(value)?;
            }
            ConfigKey::SessionChannelCapacity => {
                let capacity: usize = parse_value(name, value)?;
                if capacity == 0 {
                    return Err(invalid(name, value, "must be at least 1"));
                }
                config.session.channel_capacity = capacity;
            }
            ConfigKey::LoggingLevel => {
                let level = value.trim();
                if level.is_empty() {
                    return Err(invalid(name, value, "must not be empty"));
                }
                config.logging.level = level.to_string();
            }
            ConfigKey::LoggingFile => {
                config.logging.file = non_empty_path(value);
            }
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let parsed: f64 = parse_value(key, value)?;
    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err(invalid(key, value, "must be a positive number"))
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| format!("unknown configuration key '{}'", s))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for key in ConfigKey::all() {
            let parsed: ConfigKey = key.name().parse().unwrap();
            assert_eq!(parsed, *key);
        }
        assert!("filter.nope".parse::<ConfigKey>().is_err());
        assert_eq!(
            "Geofence.Radius_Override_M".parse::<ConfigKey>().unwrap(),
            ConfigKey::GeofenceRadiusOverride
        );
    }

    #[test]
    fn test_section_and_key_name() {
        assert_eq!(ConfigKey::LoggingFile.section(), "logging");
        assert_eq!(ConfigKey::LoggingFile.key_name(), "file");
        assert_eq!(ConfigKey::FilterWindowSize.section(), "filter");
    }

    #[test]
    fn test_set_then_get() {
        let mut config = ConfigFile::default();

        ConfigKey::GeofenceRadiusOverride.set(&mut config, "30").unwrap();
        assert_eq!(ConfigKey::GeofenceRadiusOverride.get(&config), "30");

        ConfigKey::GeofenceRadiusOverride.set(&mut config, "0").unwrap();
        assert_eq!(ConfigKey::GeofenceRadiusOverride.get(&config), "");

        ConfigKey::FilterMaxAccuracy.set(&mut config, "20.5").unwrap();
        assert_eq!(config.filter.max_accuracy_m, 20.5);

        ConfigKey::LoggingFile.set(&mut config, " ").unwrap();
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::FilterWindowSize.set(&mut config, "0").is_err());
        assert!(ConfigKey::FilterMaxAccuracy.set(&mut config, "-5").is_err());
        assert!(ConfigKey::FilterMaxAccuracy.set(&mut config, "NaN").is_err());
        assert!(ConfigKey::GeofenceRadiusOverride.set(&mut config, "-1").is_err());
        assert!(ConfigKey::SessionChannelCapacity.set(&mut config, "0").is_err());
        assert!(ConfigKey::LoggingLevel.set(&mut config, "").is_err());
        assert_eq!(config, ConfigFile::default());
    }
}
