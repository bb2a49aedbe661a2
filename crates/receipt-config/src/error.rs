//! # Config Error Types
//!
//! Error types for loading and saving the recalculation configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Config Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   File System   │  │     Format      │  │      Contents           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Io             │  │  Parse          │  │  Invalid                │ │
//! │  │  NoConfigPath   │  │  Serialize      │  │  (ValidationError)      │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use receipt_core::ValidationError;
use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading, validating or saving a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`RecalcConfig`](receipt_core::RecalcConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The merged configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    /// No explicit path was given and no platform config directory exists.
    #[error("No config path available")]
    NoConfigPath,
}

impl ConfigError {
    /// Returns true if this error came from the file contents rather than
    /// the file system.
    pub fn is_contents_error(&self) -> bool {
        matches!(self, ConfigError::Parse(_) | ConfigError::Invalid(_))
    }
}
