//! # Item Splitter
//!
//! Turns one line item, already carrying its discount-adjusted total, into
//! the rows that get printed for it.
//!
//! ## Decision Table
//! ```text
//! ┌──────────────┬──────────┬─────────┬────────────────┬──────────────────┐
//! │ units        │ enabled  │ marked  │ group_unmarked │ result           │
//! ├──────────────┼──────────┼─────────┼────────────────┼──────────────────┤
//! │ 1            │ any      │ any     │ any            │ Whole            │
//! │ > 1          │ false    │ any     │ any            │ Whole            │
//! │ > 1          │ true     │ yes     │ any            │ Units (n rows)   │
//! │ > 1          │ true     │ no      │ false          │ Units (n rows)   │
//! │ > 1          │ true     │ no      │ true           │ Grouped (≤ 2)    │
//! └──────────────┴──────────┴─────────┴────────────────┴──────────────────┘
//! ```
//!
//! The splitter never fills in marking codes; that is the marking
//! assigner's job.

use tracing::debug;

use crate::allocation::allocate_even;
use crate::config::SplitSettings;
use crate::error::RecalcResult;
use crate::money::{MinimumIncrement, Money};
use crate::types::{LineItem, ReceiptRow};
use crate::validation::validate_quantity;

/// Rows produced for one line.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRows {
    /// The line printed as a single row, quantity unchanged.
    Whole(ReceiptRow),
    /// One single-unit row per unit, in allocation order.
    Units(Vec<ReceiptRow>),
    /// Base-priced row followed by the row carrying the extra increments.
    Grouped(Vec<ReceiptRow>),
}

impl SplitRows {
    /// True when the line was broken into several rows.
    pub fn is_split(&self) -> bool {
        !matches!(self, SplitRows::Whole(_))
    }

    pub fn rows(&self) -> &[ReceiptRow] {
        match self {
            SplitRows::Whole(row) => std::slice::from_ref(row),
            SplitRows::Units(rows) | SplitRows::Grouped(rows) => rows,
        }
    }

    pub fn into_rows(self) -> Vec<ReceiptRow> {
        match self {
            SplitRows::Whole(row) => vec![row],
            SplitRows::Units(rows) | SplitRows::Grouped(rows) => rows,
        }
    }
}

/// Splits line items according to the process-wide [`SplitSettings`].
#[derive(Debug, Clone)]
pub struct ItemSplitter {
    settings: SplitSettings,
    increment: MinimumIncrement,
}

impl ItemSplitter {
    pub fn new(settings: SplitSettings, increment: MinimumIncrement) -> Self {
        ItemSplitter {
            settings,
            increment,
        }
    }

    /// Produces the rows for `line`, whose adjusted row total is `total`.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::config::SplitSettings;
    /// use receipt_core::money::{MinimumIncrement, Money};
    /// use receipt_core::split::ItemSplitter;
    /// use receipt_core::LineItem;
    ///
    /// let settings = SplitSettings { enabled: true, group_unmarked: false };
    /// let splitter = ItemSplitter::new(settings, MinimumIncrement::default());
    /// let line = LineItem::new("100501", "Tea", 3.0, Money::from_cents(3179));
    ///
    /// let split = splitter.split(&line, line.nominal_total()).unwrap();
    /// let prices: Vec<i64> = split.rows().iter().map(|r| r.price.cents()).collect();
    /// assert_eq!(prices, vec![1059, 1060, 1060]);
    /// assert!(split.rows().iter().all(|r| r.quantity == 1 && r.price == r.sum));
    /// ```
    pub fn split(&self, line: &LineItem, total: Money) -> RecalcResult<SplitRows> {
        let units = validate_quantity(&line.id, line.quantity)?;

        if units == 1 || !self.settings.enabled {
            return Ok(SplitRows::Whole(self.whole_row(line, total, units)));
        }

        let amounts = allocate_even(total, units as usize, self.increment)?;

        if self.settings.group_unmarked && !line.has_marking {
            return Ok(self.grouped(line, total, units, &amounts));
        }

        debug!(line_id = %line.id, units, total = %total, "Splitting line into unit rows");

        let rows = amounts
            .into_iter()
            .map(|amount| ReceiptRow::unit(&line.name, amount, tax_label(line)))
            .collect();

        Ok(SplitRows::Units(rows))
    }

    fn whole_row(&self, line: &LineItem, total: Money, units: i64) -> ReceiptRow {
        ReceiptRow {
            name: line.name.clone(),
            price: total.round_div(units, self.increment),
            quantity: units,
            sum: total,
            tax: tax_label(line),
            tax_amount: Some(line.tax_amount),
            marking: None,
        }
    }

    fn grouped(&self, line: &LineItem, total: Money, units: i64, amounts: &[Money]) -> SplitRows {
        let base = amounts[0];
        let bumped = amounts.iter().filter(|a| **a != base).count() as i64;

        if bumped == 0 {
            return SplitRows::Whole(self.whole_row(line, total, units));
        }

        debug!(line_id = %line.id, units, bumped, "Splitting line into grouped rows");

        let upper = base + self.increment.as_money();
        let group = |price: Money, quantity: i64| ReceiptRow {
            name: line.name.clone(),
            price,
            quantity,
            sum: price * quantity,
            tax: tax_label(line),
            tax_amount: None,
            marking: None,
        };

        SplitRows::Grouped(vec![group(base, units - bumped), group(upper, bumped)])
    }
}

fn tax_label(line: &LineItem) -> Option<String> {
    if line.tax_rate.is_empty() {
        None
    } else {
        Some(line.tax_rate.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
