//! `tourfence config`: inspect and edit `config.ini` from the shell.
//!
//! Keys are addressed as `section.key` and parsed by clap, so a typo fails
//! before the file is touched. Every write goes through the same validation
//! the file loader applies.

use clap::Subcommand;
use tourfence::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

const UNSET: &str = "-";

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of one key
    Get {
        /// Key such as filter.max_accuracy_m
        key: ConfigKey,
    },

    /// Store a new value for one key
    Set {
        /// Key such as geofence.radius_override_m
        key: ConfigKey,

        /// New value; an empty string clears optional keys
        value: String,
    },

    /// Put one key back to its built-in default
    Unset {
        key: ConfigKey,
    },

    /// Print every key with its current value
    List,

    /// Print where config.ini lives
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let config = ConfigFile::load()?;
            println!("{}", shown(&key.get(&config)));
        }
        ConfigCommands::Set { key, value } => {
            let config = update(key, &value)?;
            println!("{} -> {}", key, shown(&key.get(&config)));
        }
        ConfigCommands::Unset { key } => {
            let default = key.get(&ConfigFile::default());
            update(key, &default)?;
            println!("{} -> {} (default)", key, shown(&default));
        }
        ConfigCommands::List => print!("{}", render_listing(&ConfigFile::load()?)),
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

/// Load, change one key and save, returning the saved config.
fn update(key: ConfigKey, value: &str) -> Result<ConfigFile, CliError> {
    let mut config = ConfigFile::load()?;
    key.set(&mut config, value)?;
    config.save()?;
    tracing::debug!(key = %key, value, "Updated configuration");
    Ok(config)
}

fn shown(value: &str) -> &str {
    if value.is_empty() {
        UNSET
    } else {
        value
    }
}

/// One aligned `section.key  value` row per key; values that differ from
/// the built-in defaults are starred.
fn render_listing(config: &ConfigFile) -> String {
    let defaults = ConfigFile::default();
    let width = ConfigKey::all()
        .iter()
        .map(|key| key.name().len())
        .max()
        .unwrap_or(0);

    ConfigKey::all()
        .iter()
        .map(|key| {
            let value = key.get(config);
            let marker = if value == key.get(&defaults) { "" } else { " *" };
            format!("{:<width$}  {}{}\n", key.name(), shown(&value), marker)
        })
        .collect()
}
