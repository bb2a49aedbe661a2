//! # Logging Setup
//!
//! Installs the global `tracing` subscriber for binaries and jobs that embed
//! the recalculation pipeline.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info,receipt=debug";

/// Initializes tracing/logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=receipt_core=trace` - Show trace for the pipeline only
/// - Default: INFO, DEBUG for the receipt crates
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
