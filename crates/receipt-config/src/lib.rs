//! # receipt-config: Configuration and Logging
//!
//! The I/O edge of the recalculation workspace. `receipt-core` only defines
//! [`RecalcConfig`]; this crate fills it from a TOML file and the
//! environment, writes it back, and installs the tracing subscriber.
//!
//! ## Modules
//!
//! - [`config`] - Load / save `recalc.toml`, environment overrides
//! - [`logging`] - `tracing-subscriber` setup
//! - [`error`] - Config error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use receipt_config::{config, logging};
//! use receipt_core::Recalculator;
//!
//! logging::init_tracing();
//!
//! let settings = config::load_or_default(None);
//! let recalculator = Recalculator::new(settings).expect("validated on load");
//! # let _ = recalculator;
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{load, load_or_default, save};
pub use error::{ConfigError, ConfigResult};
pub use logging::init_tracing;
pub use receipt_core::RecalcConfig;
