//! # Validation Module
//!
//! Checks run before any amount is redistributed.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host adapter (attributes.rs)                                 │
//! │  ├── Field presence and decimal format                                 │
//! │  └── ValidationError                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE, per selected line                               │
//! │  ├── Quantity, amounts, marking list presence                          │
//! │  └── RecalcError::MalformedLineItem                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Allocator                                                    │
//! │  └── RecalcError::InvalidAllocationInput                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::{RecalcError, RecalcResult, ValidationError};
use crate::types::{LineItem, SHIPPING_KEY};
use crate::MAX_LINE_UNITS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Line Validators
// =============================================================================

/// Validates a line's quantity and returns its whole unit count.
///
/// ## Rules
/// - Must be finite and positive (> 0)
/// - Rounded to the nearest whole unit, which must be at least 1
/// - Must not exceed MAX_LINE_UNITS
///
/// ## Example
/// ```rust
/// use receipt_core::validation::validate_quantity;
///
/// assert_eq!(validate_quantity("100501", 3.0).unwrap(), 3);
/// assert_eq!(validate_quantity("100501", 2.6).unwrap(), 3);
/// assert!(validate_quantity("100501", 0.0).is_err());
/// assert!(validate_quantity("100501", 0.2).is_err());
/// ```
pub fn validate_quantity(line_id: &str, qty: f64) -> RecalcResult<i64> {
    if !qty.is_finite() {
        return Err(RecalcError::malformed(line_id, "quantity is not a number"));
    }
    if qty <= 0.0 {
        return Err(RecalcError::malformed(line_id, "quantity must be positive"));
    }

    let units = qty.round();
    if units < 1.0 {
        return Err(RecalcError::malformed(
            line_id,
            format!("quantity {} rounds to zero units", qty),
        ));
    }
    if units > MAX_LINE_UNITS as f64 {
        return Err(RecalcError::malformed(
            line_id,
            format!("quantity {} exceeds {} units", qty, MAX_LINE_UNITS),
        ));
    }

    Ok(units as i64)
}

/// Validates one selected line item before recalculation.
///
/// ## Rules
/// - Identifier must be non-empty and not the reserved shipping key
/// - Quantity per [`validate_quantity`]
/// - Row total and discount must be non-negative, discount ≤ row total
/// - A line flagged as marked must carry a code list (possibly empty)
pub fn validate_line_item(line: &LineItem) -> RecalcResult<i64> {
    if line.id.trim().is_empty() {
        return Err(RecalcError::malformed(&line.id, "identifier is empty"));
    }
    if line.id == SHIPPING_KEY {
        return Err(RecalcError::malformed(
            &line.id,
            "identifier collides with the reserved shipping key",
        ));
    }

    let units = validate_quantity(&line.id, line.quantity)?;

    if line.row_total.is_negative() {
        return Err(RecalcError::malformed(&line.id, "row total is negative"));
    }
    if line.discount.is_negative() {
        return Err(RecalcError::malformed(&line.id, "discount is negative"));
    }
    if line.discount > line.row_total {
        return Err(RecalcError::malformed(
            &line.id,
            format!(
                "discount {} exceeds row total {}",
                line.discount, line.row_total
            ),
        ));
    }

    if line.has_marking && line.marking_codes.is_none() {
        return Err(RecalcError::malformed(
            &line.id,
            "line is flagged as marked but has no marking code list",
        ));
    }

    Ok(units)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that line identifiers are unique within an order.
pub fn validate_unique_ids<'a>(lines: impl IntoIterator<Item = &'a LineItem>) -> RecalcResult<()> {
    let mut seen = HashSet::new();
    for line in lines {
        if !seen.insert(line.id.as_str()) {
            return Err(RecalcError::malformed(&line.id, "duplicate line identifier"));
        }
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an attribute/field name used by the host mapping.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 64 characters
pub fn validate_field_name(field: &str, name: &str) -> ValidationResult<()> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if trimmed.len() > 64 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: 64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
