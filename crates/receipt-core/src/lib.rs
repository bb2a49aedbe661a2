//! # receipt-core: Fiscal Receipt Recalculation
//!
//! Turns a discounted commercial order into rows a fiscal printer accepts:
//! every row priced in whole minimum increments, marked units on their own
//! rows, and the rows adding up exactly to the amount the customer paid.
//! Pure functions only, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Receipt Recalculation                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host (order records, JSON)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ attributes::OrderDecoder               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ receipt-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌───────────┐  ┌───────────┐  ┌──────────┐  │   │
//! │  │   │ allocation │─►│   split   │─►│  marking  │─►│   pack   │  │   │
//! │  │   │  weighted  │  │ unit rows │  │ FIFO zip  │  │  id_n    │  │   │
//! │  │   └────────────┘  └───────────┘  └───────────┘  └──────────┘  │   │
//! │  │          ▲                 recalc::Recalculator                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Recalculated (serde JSON)              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 Fiscal receipt job / printer                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`allocation`] - Rounding allocator (even and weighted)
//! - [`split`] - Item splitter
//! - [`marking`] - Marking code assignment
//! - [`pack`] - Row keys for the flat result
//! - [`recalc`] - The orchestrator
//! - [`attributes`] - Host record decoding
//! - [`types`] - Domain types (LineItem, Order, ReceiptRow, etc.)
//! - [`config`] - Configuration types (loading lives in `receipt-config`)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Exact Totals**: Printed rows always add up to the target, to the cent
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (i64)
//! 4. **All or Nothing**: A failed recalculation returns no partial result
//!
//! ## Example Usage
//!
//! ```rust
//! use receipt_core::{LineItem, Money, Order, RecalcConfig, RecalcRequest, Recalculator};
//!
//! // 3 units at 101.00 with a 1.00 order-level discount
//! let line = LineItem::new("152", "Tea", 3.0, Money::from_cents(10100));
//! let order = Order::new(vec![line], Money::from_cents(10000));
//!
//! let recalculator = Recalculator::new(RecalcConfig::with_splitting()).unwrap();
//! let result = recalculator.recalculate(&order, &RecalcRequest::all_lines()).unwrap();
//!
//! let prices: Vec<i64> = ["152_1", "152_2", "152_3"]
//!     .iter()
//!     .map(|key| result.items.get(key).unwrap().price.cents())
//!     .collect();
//! assert_eq!(prices, vec![3333, 3333, 3334]);
//! assert_eq!(result.sum.cents(), 10000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod attributes;
pub mod config;
pub mod error;
pub mod marking;
pub mod money;
pub mod pack;
pub mod recalc;
pub mod split;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use receipt_core::Money` instead of
// `use receipt_core::money::Money`

pub use attributes::OrderDecoder;
pub use config::RecalcConfig;
pub use error::{RecalcError, RecalcResult, ValidationError};
pub use money::{MinimumIncrement, Money};
pub use recalc::{attach_shipping_description, Recalculator};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum whole units on a single line.
///
/// ## Business Reason
/// A unit split allocates one row per unit; a mistyped quantity must not
/// turn into millions of receipt rows.
pub const MAX_LINE_UNITS: i64 = 100_000;
