//! # Item Packer
//!
//! Re-keys the rows of one line into the flat result map.
//!
//! ```text
//!   line 100500, qty 1   ──►  "100500"
//!   line 100500, qty 3   ──►  "100500_1", "100500_2", "100500_3"
//!   grouped split        ──►  "100500_1" (base), "100500_2" (base + 1)
//! ```
//!
//! Packing changes no amount, only how rows are addressed.

use crate::error::RecalcResult;
use crate::split::SplitRows;
use crate::types::{LineItem, PackedItems, RowKey};

/// Packs the rows produced for `line` under deterministic keys.
///
/// ## Example
/// ```rust
/// use receipt_core::pack::pack_rows;
/// use receipt_core::split::SplitRows;
/// use receipt_core::{LineItem, Money, ReceiptRow};
///
/// let line = LineItem::new("100500", "Tea", 3.0, Money::from_cents(300));
/// let rows = vec![ReceiptRow::unit("Tea", Money::from_cents(100), None); 3];
///
/// let packed = pack_rows(&line, SplitRows::Units(rows)).unwrap();
/// assert_eq!(packed.keys(), vec!["100500_1", "100500_2", "100500_3"]);
/// ```
pub fn pack_rows(line: &LineItem, split: SplitRows) -> RecalcResult<PackedItems> {
    let mut packed = PackedItems::new();

    if !split.is_split() {
        for row in split.into_rows() {
            packed.insert(RowKey::Line(line.id.clone()), row)?;
        }
        return Ok(packed);
    }

    for (index, row) in split.into_rows().into_iter().enumerate() {
        packed.insert(RowKey::Part(line.id.clone(), index + 1), row)?;
    }
    Ok(packed)
}
