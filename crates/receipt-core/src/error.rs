//! # Error Types
//!
//! Domain-specific error types for receipt-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  receipt-core errors (this file)                                       │
//! │  ├── RecalcError      - Recalculation aborted (no partial result)      │
//! │  └── ValidationError  - Input / config validation failures             │
//! │                                                                         │
//! │  receipt-config errors (separate crate)                                │
//! │  └── ConfigError      - Config file load / save failures               │
//! │                                                                         │
//! │  Flow: ValidationError → RecalcError → caller (fiscal receipt job)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Running out of marking codes is NOT an error: the surplus rows simply
//! carry no code.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Recalculation Error
// =============================================================================

/// Errors that abort a recalculation.
///
/// Any of these aborts the whole order; no partial result is returned.
#[derive(Debug, Error)]
pub enum RecalcError {
    /// The rounding allocator was handed an amount it cannot split.
    ///
    /// ## When This Occurs
    /// - Negative target amount (e.g. shipping larger than the target total)
    /// - Zero shares to fill while there is money to distribute
    /// - Target not expressible in whole minimum increments
    #[error("Cannot allocate {total} over {shares} shares: {reason}")]
    InvalidAllocationInput {
        total: Money,
        shares: usize,
        reason: String,
    },

    /// A selected line item cannot be recalculated as given.
    ///
    /// ## When This Occurs
    /// - Quantity is zero, negative, not finite, or rounds to zero units
    /// - Line is flagged as marked but carries no marking code list
    /// - Discount exceeds the row total, or an amount is negative
    /// - Identifier is duplicated or uses the reserved `shipping` key
    #[error("Malformed line item {line_id}: {reason}")]
    MalformedLineItem { line_id: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl RecalcError {
    pub(crate) fn malformed(line_id: &str, reason: impl Into<String>) -> Self {
        RecalcError::MalformedLineItem {
            line_id: line_id.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while decoding host records and validating configuration, before
/// any amount is redistributed.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. amount that is not a decimal number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. two config fields naming the same attribute).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with RecalcError.
pub type RecalcResult<T> = Result<T, RecalcError>;

// =============================================================================
// Unit Tests
// =============================================================================
