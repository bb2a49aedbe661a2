//! # Config Loading
//!
//! Loads [`RecalcConfig`] from disk and the environment.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RECEIPT_SPLIT_ITEMS=true                                           │
//! │     RECEIPT_MIN_INCREMENT=10                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/receipt-recalc/recalc.toml (Linux)                       │
//! │     ~/Library/Application Support/com.receipt.recalc/recalc.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     splitting off, marking / marking_list, increment 1                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Environment Variables
//! | Variable                       | Overrides                        |
//! |--------------------------------|----------------------------------|
//! | `RECEIPT_SPLIT_ITEMS`          | `split.enabled`                  |
//! | `RECEIPT_GROUP_UNMARKED`       | `split.group_unmarked`           |
//! | `RECEIPT_MARKING_FIELD`        | `marking.flag_field`             |
//! | `RECEIPT_MARKING_LIST_FIELD`   | `marking.list_field`             |
//! | `RECEIPT_MIN_INCREMENT`        | `money.minimum_increment`        |
//! | `RECEIPT_SHIPPING_DESCRIPTION` | `shipping.default_description`   |

use std::path::{Path, PathBuf};

use receipt_core::money::MinimumIncrement;
use receipt_core::RecalcConfig;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// File name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "recalc.toml";

pub const ENV_SPLIT_ITEMS: &str = "RECEIPT_SPLIT_ITEMS";
pub const ENV_GROUP_UNMARKED: &str = "RECEIPT_GROUP_UNMARKED";
pub const ENV_MARKING_FIELD: &str = "RECEIPT_MARKING_FIELD";
pub const ENV_MARKING_LIST_FIELD: &str = "RECEIPT_MARKING_LIST_FIELD";
pub const ENV_MIN_INCREMENT: &str = "RECEIPT_MIN_INCREMENT";
pub const ENV_SHIPPING_DESCRIPTION: &str = "RECEIPT_SHIPPING_DESCRIPTION";

// =============================================================================
// Loading
// =============================================================================

/// Loads configuration: defaults, then the TOML file, then environment
/// overrides, then validation.
///
/// `config_path` falls back to [`default_config_path`]. A missing file is
/// not an error.
pub fn load(config_path: Option<PathBuf>) -> ConfigResult<RecalcConfig> {
    load_with(config_path, |key| std::env::var(key).ok())
}

/// Same as [`load`], reading overrides through `lookup` instead of the
/// process environment.
pub fn load_with<F>(config_path: Option<PathBuf>, lookup: F) -> ConfigResult<RecalcConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RecalcConfig::default();

    if let Some(path) = config_path.or_else(default_config_path) {
        if path.exists() {
            info!(?path, "Loading recalculation config from file");
            let contents = std::fs::read_to_string(&path)?;
            config = from_toml_str(&contents)?;
        } else {
            debug!(?path, "Config file not found, using defaults");
        }
    }

    apply_overrides(&mut config, lookup);

    config.validate()?;

    Ok(config)
}

/// Loads configuration, falling back to defaults on any error.
pub fn load_or_default(config_path: Option<PathBuf>) -> RecalcConfig {
    load(config_path).unwrap_or_else(|e| {
        warn!("Failed to load recalculation config: {}. Using defaults.", e);
        RecalcConfig::default()
    })
}

/// Parses a TOML document. Missing sections and keys take their defaults.
pub fn from_toml_str(contents: &str) -> ConfigResult<RecalcConfig> {
    Ok(toml::from_str(contents)?)
}

/// Writes `config` as pretty TOML, creating parent directories.
pub fn save(config: &RecalcConfig, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
    config.validate()?;

    let path = config_path
        .or_else(default_config_path)
        .ok_or(ConfigError::NoConfigPath)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;

    info!(?path, "Recalculation config saved");
    Ok(path)
}

/// Platform config file location, e.g. `~/.config/receipt-recalc/recalc.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "receipt", "recalc")
        .map(|dirs| config_file_in(dirs.config_dir()))
}

fn config_file_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

// =============================================================================
// Environment Overrides
// =============================================================================

/// Applies the `RECEIPT_*` variables of the process environment.
pub fn apply_env_overrides(config: &mut RecalcConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Applies overrides read through `lookup`. Unparseable values are logged
/// and ignored.
pub fn apply_overrides<F>(config: &mut RecalcConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_SPLIT_ITEMS) {
        match parse_bool(&value) {
            Some(enabled) => {
                debug!(enabled, "Overriding split toggle from environment");
                config.split.enabled = enabled;
            }
            None => warn!(value = %value, "Unknown {} value in environment", ENV_SPLIT_ITEMS),
        }
    }

    if let Some(value) = lookup(ENV_GROUP_UNMARKED) {
        match parse_bool(&value) {
            Some(group) => config.split.group_unmarked = group,
            None => warn!(value = %value, "Unknown {} value in environment", ENV_GROUP_UNMARKED),
        }
    }

    if let Some(field) = lookup(ENV_MARKING_FIELD) {
        debug!(field = %field, "Overriding marking flag field from environment");
        config.marking.flag_field = field;
    }

    if let Some(field) = lookup(ENV_MARKING_LIST_FIELD) {
        debug!(field = %field, "Overriding marking list field from environment");
        config.marking.list_field = field;
    }

    if let Some(value) = lookup(ENV_MIN_INCREMENT) {
        match value.trim().parse::<i64>().ok().map(MinimumIncrement::new) {
            Some(Ok(increment)) => {
                debug!(increment = increment.cents(), "Overriding minimum increment from environment");
                config.money.minimum_increment = increment;
            }
            _ => warn!(value = %value, "Invalid {} value in environment", ENV_MIN_INCREMENT),
        }
    }

    if let Some(description) = lookup(ENV_SHIPPING_DESCRIPTION) {
        config.shipping.default_description = description;
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
