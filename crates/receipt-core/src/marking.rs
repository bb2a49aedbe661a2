//! # Marking Assigner
//!
//! Pairs unit rows with marking codes, position by position.
//!
//! ```text
//!   rows:   [row1] [row2] [row3]            rows:   [row1] [row2]
//!   codes:  [M1]   [M2]                     codes:  [M1]   [M2]   [M3]
//!            │      │                                │      │
//!   result: M1     M2     null              result: M1     M2     (M3 unused)
//! ```
//!
//! No reordering and no deduplication: the n-th row receives the n-th code
//! or nothing.

use tracing::{debug, warn};

use crate::split::SplitRows;
use crate::types::{LineItem, ReceiptRow};

/// Returns `rows` with the n-th row's marking set to the n-th code.
///
/// Rows beyond the end of `codes` get `None`; codes beyond the end of
/// `rows` are left unused.
///
/// ## Example
/// ```rust
/// use receipt_core::marking::assign_markings;
/// use receipt_core::{Money, ReceiptRow};
///
/// let rows = vec![ReceiptRow::unit("Tea", Money::zero(), None); 3];
/// let codes = vec!["M1".to_string(), "M2".to_string()];
///
/// let marked = assign_markings(rows, &codes);
/// let markings: Vec<Option<&str>> = marked.iter().map(|r| r.marking.as_deref()).collect();
/// assert_eq!(markings, vec![Some("M1"), Some("M2"), None]);
/// ```
pub fn assign_markings(rows: Vec<ReceiptRow>, codes: &[String]) -> Vec<ReceiptRow> {
    let mut codes = codes.iter();
    rows.into_iter()
        .map(|row| ReceiptRow {
            marking: codes.next().cloned(),
            ..row
        })
        .collect()
}

/// Marks the rows produced for `line`.
///
/// Unmarked lines pass through untouched. Grouped splits only occur for
/// unmarked lines, so they also pass through.
pub fn mark_line(line: &LineItem, split: SplitRows) -> SplitRows {
    if !line.has_marking {
        return split;
    }

    let codes = line.codes();
    let row_count = split.rows().len();

    if codes.len() < row_count {
        warn!(
            line_id = %line.id,
            rows = row_count,
            codes = codes.len(),
            "Marked line has fewer codes than rows; surplus rows stay unmarked"
        );
    } else if codes.len() > row_count {
        debug!(
            line_id = %line.id,
            unused = codes.len() - row_count,
            "Unused marking codes"
        );
    }

    match split {
        SplitRows::Whole(row) => SplitRows::Whole(ReceiptRow {
            marking: codes.first().cloned(),
            ..row
        }),
        SplitRows::Units(rows) => SplitRows::Units(assign_markings(rows, codes)),
        SplitRows::Grouped(rows) => SplitRows::Grouped(rows),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
