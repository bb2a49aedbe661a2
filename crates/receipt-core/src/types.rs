//! # Domain Types
//!
//! Core domain types used throughout the recalculation pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (owned by caller)            OUTPUT (returned to caller)        │
//! │  ┌─────────────────┐                ┌─────────────────┐                │
//! │  │     Order       │                │  Recalculated   │                │
//! │  │  ─────────────  │                │  ─────────────  │                │
//! │  │  lines          │                │  sum            │                │
//! │  │  shipping_amount│                │  orig_grand_tot │                │
//! │  │  grand_total    │                │  items ─────────┼──┐             │
//! │  └────────┬────────┘                └─────────────────┘  │             │
//! │           │ 1..n                                          ▼             │
//! │  ┌────────▼────────┐                ┌─────────────────────────────┐    │
//! │  │    LineItem     │   split/mark   │ PackedItems                 │    │
//! │  │  ─────────────  │ ─────────────► │  RowKey ──► ReceiptRow      │    │
//! │  │  id, quantity   │                │  "152"      price, sum      │    │
//! │  │  row_total      │                │  "153_1"    quantity        │    │
//! │  │  marking_codes  │                │  "shipping" marking         │    │
//! │  └─────────────────┘                └─────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use ts_rs::TS;

use crate::error::{RecalcError, RecalcResult};
use crate::money::Money;

/// Reserved key of the synthetic shipping row.
pub const SHIPPING_KEY: &str = "shipping";

// =============================================================================
// Line Item
// =============================================================================

/// One row of a commercial order, as handed over by the host.
///
/// All amounts are tax-inclusive. The pipeline never mutates a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Identifier, unique within the order.
    pub id: String,

    /// Display name printed on the receipt.
    pub name: String,

    /// Ordered quantity. Rounded to whole units by the pipeline.
    pub quantity: f64,

    /// Tax-inclusive row total before discount.
    pub row_total: Money,

    /// Tax-inclusive unit price before discount.
    #[serde(default)]
    pub unit_price: Money,

    /// Discount already computed for this row.
    #[serde(default)]
    pub discount: Money,

    /// Tax rate identifier (e.g. `vat20`).
    #[serde(default)]
    pub tax_rate: String,

    /// Tax amount of the row.
    #[serde(default)]
    pub tax_amount: Money,

    /// Whether each unit of this line must carry a marking code.
    #[serde(default)]
    pub has_marking: bool,

    /// Available marking codes, in issue order. `None` means "no list".
    #[serde(default)]
    pub marking_codes: Option<Vec<String>>,
}

impl LineItem {
    /// Creates an unmarked, undiscounted line.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::{LineItem, Money};
    ///
    /// let line = LineItem::new("100501", "Tea", 3.0, Money::from_cents(3177))
    ///     .with_marking(vec!["M1".into(), "M2".into(), "M3".into()]);
    /// assert_eq!(line.unit_count(), 3);
    /// assert!(line.has_marking);
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: f64, row_total: Money) -> Self {
        let units = quantity.round().max(1.0) as i64;
        LineItem {
            id: id.into(),
            name: name.into(),
            quantity,
            row_total,
            unit_price: Money::from_cents(row_total.cents() / units),
            discount: Money::zero(),
            tax_rate: String::new(),
            tax_amount: Money::zero(),
            has_marking: false,
            marking_codes: None,
        }
    }

    /// Sets the row discount.
    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    /// Sets the tax rate identifier and tax amount.
    pub fn with_tax(mut self, tax_rate: impl Into<String>, tax_amount: Money) -> Self {
        self.tax_rate = tax_rate.into();
        self.tax_amount = tax_amount;
        self
    }

    /// Sets the unit price.
    pub fn with_unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// Flags the line as marked and attaches its code list.
    pub fn with_marking(mut self, codes: Vec<String>) -> Self {
        self.has_marking = true;
        self.marking_codes = Some(codes);
        self
    }

    /// Quantity rounded to the nearest whole unit.
    #[inline]
    pub fn unit_count(&self) -> i64 {
        self.quantity.round() as i64
    }

    /// Row total after the line's own discount.
    #[inline]
    pub fn nominal_total(&self) -> Money {
        self.row_total - self.discount
    }

    /// [`nominal_total`](Self::nominal_total), or `None` when it does not fit.
    pub fn checked_nominal_total(&self) -> Option<Money> {
        self.row_total.checked_sub(self.discount)
    }

    /// Marking codes as a slice (empty when there is no list).
    #[inline]
    pub fn codes(&self) -> &[String] {
        self.marking_codes.as_deref().unwrap_or(&[])
    }
}

// =============================================================================
// Order
// =============================================================================

/// Snapshot of a commercial order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    /// Line items in display order.
    pub lines: Vec<LineItem>,

    /// Tax-inclusive shipping amount (zero when there is none).
    #[serde(default)]
    pub shipping_amount: Money,

    /// Shipping description. The only field the pipeline may write.
    #[serde(default)]
    pub shipping_description: Option<String>,

    /// Nominal grand total of the order, shipping included.
    pub grand_total: Money,
}

impl Order {
    /// Creates an order without shipping.
    pub fn new(lines: Vec<LineItem>, grand_total: Money) -> Self {
        Order {
            lines,
            shipping_amount: Money::zero(),
            shipping_description: None,
            grand_total,
        }
    }

    /// Sets the shipping amount.
    pub fn with_shipping(mut self, amount: Money) -> Self {
        self.shipping_amount = amount;
        self
    }

    /// Total quantity over all lines, in whole units.
    pub fn total_units(&self) -> i64 {
        self.lines.iter().map(LineItem::unit_count).sum()
    }
}

// =============================================================================
// Row Key
// =============================================================================

/// Key of a row in the packed result.
///
/// | Variant         | Rendered as  | Produced for                       |
/// |-----------------|--------------|------------------------------------|
/// | `Line(id)`      | `152`        | a line that was not split          |
/// | `Part(id, n)`   | `152_3`      | the n-th row (1-indexed) of a split |
/// | `Shipping`      | `shipping`   | the synthetic shipping row         |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Line(String),
    Part(String, usize),
    Shipping,
}

impl RowKey {
    /// Identifier of the originating line, if any.
    pub fn line_id(&self) -> Option<&str> {
        match self {
            RowKey::Line(id) | RowKey::Part(id, _) => Some(id),
            RowKey::Shipping => None,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Line(id) => write!(f, "{}", id),
            RowKey::Part(id, n) => write!(f, "{}_{}", id, n),
            RowKey::Shipping => write!(f, "{}", SHIPPING_KEY),
        }
    }
}

impl Serialize for RowKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Receipt Row
// =============================================================================

/// One printable receipt row.
///
/// After a unit split `quantity == 1` and `price == sum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRow {
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    pub sum: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,
    /// Tax amount of an unsplit line. Never re-split across unit rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Money>,
    /// Marking code, `null` when none was available.
    #[serde(default)]
    pub marking: Option<String>,
}

impl ReceiptRow {
    /// A single-unit row priced at `amount`.
    pub fn unit(name: &str, amount: Money, tax: Option<String>) -> Self {
        ReceiptRow {
            name: name.to_string(),
            price: amount,
            quantity: 1,
            sum: amount,
            tax,
            tax_amount: None,
            marking: None,
        }
    }

    /// True for a single-unit row.
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.quantity == 1
    }
}

// =============================================================================
// Packed Items
// =============================================================================

/// Insertion-ordered mapping from [`RowKey`] to [`ReceiptRow`].
///
/// Serializes as a JSON object whose keys appear in insertion order.
/// Lookups by rendered key go through an index, so packing stays linear in
/// the number of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedItems {
    entries: Vec<(RowKey, ReceiptRow)>,
    index: HashMap<String, usize>,
}

impl PackedItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row. Fails if the rendered key is already present.
    pub fn insert(&mut self, key: RowKey, row: ReceiptRow) -> RecalcResult<()> {
        let rendered = key.to_string();
        if self.index.contains_key(&rendered) {
            return Err(RecalcError::malformed(
                key.line_id().unwrap_or(SHIPPING_KEY),
                format!("packed key '{}' collides with an earlier row", rendered),
            ));
        }
        self.index.insert(rendered, self.entries.len());
        self.entries.push((key, row));
        Ok(())
    }

    /// Appends every entry of `other`, keeping its order.
    pub fn merge(&mut self, other: PackedItems) -> RecalcResult<()> {
        self.entries.reserve(other.len());
        self.index.reserve(other.len());
        for (key, row) in other.entries {
            self.insert(key, row)?;
        }
        Ok(())
    }

    /// Looks a row up by its rendered key (`"152_1"`, `"shipping"`).
    pub fn get(&self, key: &str) -> Option<&ReceiptRow> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Rendered keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &ReceiptRow)> {
        self.entries.iter().map(|(k, row)| (k, row))
    }

    pub fn rows(&self) -> impl Iterator<Item = &ReceiptRow> {
        self.entries.iter().map(|(_, row)| row)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for PackedItems {
    type Item = (RowKey, ReceiptRow);
    type IntoIter = std::vec::IntoIter<(RowKey, ReceiptRow)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for PackedItems {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, row) in &self.entries {
            map.serialize_entry(key, row)?;
        }
        map.end()
    }
}

// =============================================================================
// Recalculation Request / Result
// =============================================================================

/// Per-call parameters of a recalculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcRequest {
    /// Only lines with this tax rate identifier participate. `None` selects all.
    #[serde(default)]
    pub tax_rate: Option<String>,

    /// Total (shipping included) the printed rows must add up to.
    /// Defaults to the grand total minus the lines that were not selected.
    #[serde(default)]
    pub target_total: Option<Money>,

    /// Tax label printed on the shipping row.
    #[serde(default)]
    pub shipping_tax: Option<String>,
}

impl RecalcRequest {
    /// Selects every line of the order.
    pub fn all_lines() -> Self {
        Self::default()
    }

    /// Selects lines carrying `tax_rate`.
    pub fn for_tax_rate(tax_rate: impl Into<String>) -> Self {
        RecalcRequest {
            tax_rate: Some(tax_rate.into()),
            ..Self::default()
        }
    }

    pub fn with_target_total(mut self, total: Money) -> Self {
        self.target_total = Some(total);
        self
    }

    pub fn with_shipping_tax(mut self, tax: impl Into<String>) -> Self {
        self.shipping_tax = Some(tax.into());
        self
    }

    /// True when `line` takes part in this recalculation.
    pub fn selects(&self, line: &LineItem) -> bool {
        match &self.tax_rate {
            Some(rate) => &line.tax_rate == rate,
            None => true,
        }
    }
}

/// Fiscal-receipt-ready breakdown of an order.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Recalculated {
    /// Total of all non-shipping rows.
    pub sum: Money,

    /// Reference grand total of the order.
    pub orig_grand_total: Money,

    /// Rows keyed by [`RowKey`], in line order, shipping last.
    #[ts(type = "Record<string, ReceiptRow>")]
    pub items: PackedItems,
}

impl Recalculated {
    /// The shipping row.
    pub fn shipping(&self) -> Option<&ReceiptRow> {
        self.items.get(SHIPPING_KEY)
    }

    /// Total of every row, shipping included.
    pub fn grand_sum(&self) -> Money {
        self.items.rows().map(|row| row.sum).sum()
    }

    /// Total quantity over all non-shipping rows.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .filter(|(key, _)| **key != RowKey::Shipping)
            .map(|(_, row)| row.quantity)
            .sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_key_rendering() {
        assert_eq!(RowKey::Line("100500".into()).to_string(), "100500");
        assert_eq!(RowKey::Part("100500".into(), 3).to_string(), "100500_3");
        assert_eq!(RowKey::Shipping.to_string(), "shipping");
        assert_eq!(RowKey::Part("152".into(), 1).line_id(), Some("152"));
        assert_eq!(RowKey::Shipping.line_id(), None);
    }

    #[test]
    fn test_line_item_helpers() {
        let line = LineItem::new("152", "Tea", 3.0, Money::from_cents(10100))
            .with_discount(Money::from_cents(100));
        assert_eq!(line.unit_count(), 3);
        assert_eq!(line.nominal_total().cents(), 10000);
        assert_eq!(line.unit_price.cents(), 3366);
        assert!(line.codes().is_empty());
    }

    #[test]
    fn test_packed_items_preserve_order_and_reject_duplicates() {
        let mut items = PackedItems::new();
        let row = ReceiptRow::unit("Tea", Money::from_cents(100), None);
        items.insert(RowKey::Part("152".into(), 2), row.clone()).unwrap();
        items.insert(RowKey::Line("153".into()), row.clone()).unwrap();
        items.insert(RowKey::Shipping, row.clone()).unwrap();

        assert_eq!(items.keys(), vec!["152_2", "153", "shipping"]);
        assert!(items.insert(RowKey::Line("152_2".into()), row).is_err());
    }

    #[test]
    fn test_packed_items_lookup_after_many_inserts() {
        let mut items = PackedItems::new();
        let row = ReceiptRow::unit("Tea", Money::from_cents(1), None);
        for n in 1..=50_000 {
            items.insert(RowKey::Part("7".into(), n), row.clone()).unwrap();
        }

        let mut other = PackedItems::new();
        other.insert(RowKey::Part("7".into(), 50_000), row.clone()).unwrap();
        assert!(items.merge(other).is_err());

        assert_eq!(items.len(), 50_000);
        assert!(items.get("7_1").is_some());
        assert!(items.get("7_50000").is_some());
        assert!(items.get("7_50001").is_none());
        assert_eq!(items.keys()[49_999], "7_50000");
    }

    #[test]
    fn test_packed_items_serialize_in_order() {
        let mut items = PackedItems::new();
        items
            .insert(RowKey::Line("9".into()), ReceiptRow::unit("B", Money::from_cents(1), None))
            .unwrap();
        items
            .insert(RowKey::Line("1".into()), ReceiptRow::unit("A", Money::from_cents(2), None))
            .unwrap();

        let json = serde_json::to_string(&items).unwrap();
        let nine = json.find("\"9\"").unwrap();
        let one = json.find("\"1\"").unwrap();
        assert!(nine < one);
        assert!(json.contains("\"marking\":null"));
        assert!(!json.contains("\"tax\""));
    }

    #[test]
    fn test_recalculated_serializes_camel_case() {
        let result = Recalculated {
            sum: Money::from_cents(100),
            orig_grand_total: Money::from_cents(100),
            items: PackedItems::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["origGrandTotal"], 100);
        assert_eq!(json["sum"], 100);
    }

    #[test]
    fn test_request_selection() {
        let vat = LineItem::new("1", "A", 1.0, Money::zero()).with_tax("vat20", Money::zero());
        let exempt = LineItem::new("2", "B", 1.0, Money::zero());

        assert!(RecalcRequest::all_lines().selects(&exempt));
        assert!(RecalcRequest::for_tax_rate("vat20").selects(&vat));
        assert!(!RecalcRequest::for_tax_rate("vat20").selects(&exempt));
    }
}
