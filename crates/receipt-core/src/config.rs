//! # Recalculation Configuration
//!
//! Plain configuration types. Loading them from disk and the environment is
//! the job of the `receipt-config` crate; this crate never touches I/O.
//!
//! ## Configuration File Format
//! ```toml
//! # recalc.toml
//! [split]
//! enabled = false         # allow splitting multi-unit lines
//! group_unmarked = false  # unmarked lines: at most two grouped rows
//!
//! [marking]
//! flag_field = "marking"
//! list_field = "marking_list"
//!
//! [money]
//! minimum_increment = 1   # minor units
//!
//! [shipping]
//! default_description = "Shipping"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::MinimumIncrement;
use crate::validation::{validate_field_name, ValidationResult};

// =============================================================================
// Split Settings
// =============================================================================

/// How multi-unit lines are broken up.
///
/// ## Split Behavior
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Line: 3 units, 101.00 total                                            │
/// │                                                                         │
/// │  enabled = false        → 152     qty 3  price 33.67  sum 101.00        │
/// │                                                                         │
/// │  enabled = true         → 152_1   qty 1  33.66                          │
/// │                           152_2   qty 1  33.67                          │
/// │                           152_3   qty 1  33.67                          │
/// │                                                                         │
/// │  enabled = true,        → 152_1   qty 1  price 33.66  sum 33.66         │
/// │  group_unmarked = true    152_2   qty 2  price 33.67  sum 67.34         │
/// │  (unmarked lines only)                                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSettings {
    /// Process-wide toggle for splitting multi-unit lines.
    #[serde(default)]
    pub enabled: bool,

    /// Unmarked lines split into at most two grouped rows instead of units.
    #[serde(default)]
    pub group_unmarked: bool,
}

// =============================================================================
// Marking Fields
// =============================================================================

/// Names of the host attributes carrying marking data.
///
/// Resolved once when an [`OrderDecoder`](crate::attributes::OrderDecoder)
/// is built, never per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkingFields {
    /// Attribute holding the "has marking" flag.
    #[serde(default = "default_flag_field")]
    pub flag_field: String,

    /// Attribute holding the list of marking codes.
    #[serde(default = "default_list_field")]
    pub list_field: String,
}

fn default_flag_field() -> String {
    "marking".to_string()
}

fn default_list_field() -> String {
    "marking_list".to_string()
}

impl Default for MarkingFields {
    fn default() -> Self {
        MarkingFields {
            flag_field: default_flag_field(),
            list_field: default_list_field(),
        }
    }
}

// =============================================================================
// Money / Shipping Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneySettings {
    /// Rounding granularity in minor units.
    #[serde(default)]
    pub minimum_increment: MinimumIncrement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSettings {
    /// Name of the shipping row when the order has no description.
    #[serde(default = "default_shipping_description")]
    pub default_description: String,
}

fn default_shipping_description() -> String {
    "Shipping".to_string()
}

impl Default for ShippingSettings {
    fn default() -> Self {
        ShippingSettings {
            default_description: default_shipping_description(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete recalculation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcConfig {
    #[serde(default)]
    pub split: SplitSettings,

    #[serde(default)]
    pub marking: MarkingFields,

    #[serde(default)]
    pub money: MoneySettings,

    #[serde(default)]
    pub shipping: ShippingSettings,
}

impl RecalcConfig {
    /// Default configuration with splitting switched on.
    pub fn with_splitting() -> Self {
        RecalcConfig {
            split: SplitSettings {
                enabled: true,
                group_unmarked: false,
            },
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// ## Rules
    /// - Marking attribute names are non-empty and distinct
    /// - Shipping description is non-empty
    pub fn validate(&self) -> ValidationResult<()> {
        validate_field_name("marking.flag_field", &self.marking.flag_field)?;
        validate_field_name("marking.list_field", &self.marking.list_field)?;

        if self.marking.flag_field == self.marking.list_field {
            return Err(ValidationError::Duplicate {
                field: "marking.list_field".to_string(),
                value: self.marking.list_field.clone(),
            });
        }

        if self.shipping.default_description.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "shipping.default_description".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the rounding increment.
    pub fn increment(&self) -> MinimumIncrement {
        self.money.minimum_increment
    }
}
