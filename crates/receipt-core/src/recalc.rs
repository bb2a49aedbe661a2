//! # Recalculator
//!
//! Orchestrates one recalculation of an order into fiscal receipt rows.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     recalculate(order, request)                         │
//! │                                                                         │
//! │  1. Select     lines whose tax rate matches the request                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. Validate   quantity, amounts, marking list, unique ids              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. Target     items = target − shipping                                │
//! │        │       target = request.target_total                            │
//! │        │             or grand_total − excluded lines                    │
//! │        ▼                                                                │
//! │  4. Allocate   allocate_weighted(items, nominal totals)                 │
//! │        │                                                                │
//! │        ▼       per line, in order                                       │
//! │  5. Split ──► Mark ──► Pack ──► merge into result                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  6. Shipping   row keyed "shipping", quantity 1                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  7. Aggregate  { sum, origGrandTotal, items }                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure aborts the whole order; no partial result is returned and
//! the order is left untouched.

use tracing::{debug, info, warn};

use crate::allocation::allocate_weighted;
use crate::config::RecalcConfig;
use crate::error::{RecalcError, RecalcResult};
use crate::marking::mark_line;
use crate::money::Money;
use crate::pack::pack_rows;
use crate::split::ItemSplitter;
use crate::types::{LineItem, Order, PackedItems, ReceiptRow, RecalcRequest, Recalculated, RowKey};
use crate::validation::{validate_line_item, validate_unique_ids};

/// Recalculates orders into receipt rows.
///
/// Holds configuration only; every call works on fresh state, so one
/// instance can serve independent orders from several threads.
#[derive(Debug, Clone)]
pub struct Recalculator {
    config: RecalcConfig,
    splitter: ItemSplitter,
}

impl Recalculator {
    /// Builds a recalculator from a validated configuration.
    pub fn new(config: RecalcConfig) -> RecalcResult<Self> {
        config.validate()?;
        let splitter = ItemSplitter::new(config.split.clone(), config.increment());
        Ok(Recalculator { config, splitter })
    }

    pub fn config(&self) -> &RecalcConfig {
        &self.config
    }

    /// Recalculates `order` without touching it.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::{LineItem, Money, Order, RecalcConfig, RecalcRequest, Recalculator};
    ///
    /// let line = LineItem::new("153", "Tea", 3.0, Money::from_cents(3179))
    ///     .with_marking(vec!["M1".into(), "M2".into(), "M3".into()]);
    /// let order = Order::new(vec![line], Money::from_cents(3179));
    ///
    /// let recalculator = Recalculator::new(RecalcConfig::with_splitting()).unwrap();
    /// let result = recalculator.recalculate(&order, &RecalcRequest::all_lines()).unwrap();
    ///
    /// assert_eq!(result.sum.cents(), 3179);
    /// assert_eq!(result.items.keys(), vec!["153_1", "153_2", "153_3", "shipping"]);
    /// assert_eq!(result.items.get("153_3").unwrap().marking.as_deref(), Some("M3"));
    /// ```
    pub fn recalculate(&self, order: &Order, request: &RecalcRequest) -> RecalcResult<Recalculated> {
        let increment = self.config.increment();

        validate_unique_ids(&order.lines)?;

        let (selected, excluded): (Vec<&LineItem>, Vec<&LineItem>) =
            order.lines.iter().partition(|line| request.selects(line));

        for line in &selected {
            validate_line_item(line)?;
        }

        let shipping = order.shipping_amount;
        if shipping.is_negative() {
            return Err(RecalcError::InvalidAllocationInput {
                total: shipping,
                shares: 1,
                reason: "shipping amount is negative".to_string(),
            });
        }

        let excluded_total = nominal_sum(&excluded)?;
        let target = match request.target_total {
            Some(target) => target,
            None => order
                .grand_total
                .checked_sub(excluded_total)
                .ok_or_else(|| overflow(order.grand_total, excluded.len()))?,
        };
        let items_target = target
            .checked_sub(shipping)
            .ok_or_else(|| overflow(target, selected.len()))?;

        if items_target.is_negative() {
            return Err(RecalcError::InvalidAllocationInput {
                total: items_target,
                shares: selected.len(),
                reason: format!("target {} does not cover shipping {}", target, shipping),
            });
        }

        let adjusted = self.redistribute(&selected, items_target)?;

        let mut items = PackedItems::new();
        for (line, total) in selected.iter().zip(adjusted) {
            if line.has_marking && !self.config.split.enabled && line.unit_count() > 1 {
                warn!(
                    line_id = %line.id,
                    units = line.unit_count(),
                    "Splitting is disabled; marked line prints a single code"
                );
            }

            let split = self.splitter.split(line, total)?;
            let marked = mark_line(line, split);
            items.merge(pack_rows(line, marked)?)?;
        }

        let sum: Money = items.rows().map(|row| row.sum).sum();

        let shipping_row = ReceiptRow {
            name: self.shipping_description(order),
            price: shipping,
            quantity: 1,
            sum: shipping,
            tax: request.shipping_tax.clone(),
            tax_amount: None,
            marking: None,
        };
        items.insert(RowKey::Shipping, shipping_row)?;

        debug_assert_eq!(sum + shipping, target, "receipt rows must reconcile to the target");

        info!(
            selected = selected.len(),
            excluded = excluded.len(),
            rows = items.len(),
            sum = %sum,
            shipping = %shipping,
            "Order recalculated"
        );

        Ok(Recalculated {
            sum,
            orig_grand_total: order.grand_total,
            items,
        })
    }

    /// Recalculates `order`, then attaches the shipping description used for
    /// the shipping row. The order is only written when recalculation succeeds.
    pub fn recalculate_and_attach(
        &self,
        order: &mut Order,
        request: &RecalcRequest,
    ) -> RecalcResult<Recalculated> {
        let result = self.recalculate(order, request)?;
        let description = self.shipping_description(order);
        attach_shipping_description(order, &description);
        Ok(result)
    }

    /// Adjusted row totals of `lines`, adding up to `items_target`.
    fn redistribute(&self, lines: &[&LineItem], items_target: Money) -> RecalcResult<Vec<Money>> {
        if lines.is_empty() && items_target.is_zero() {
            return Ok(Vec::new());
        }

        let weights = lines
            .iter()
            .map(|line| line.checked_nominal_total().ok_or_else(|| overflow(line.row_total, 1)))
            .collect::<RecalcResult<Vec<Money>>>()?;
        let nominal = nominal_sum(lines)?;

        if nominal != items_target {
            debug!(
                nominal = %nominal,
                target = %items_target,
                difference = %(items_target - nominal),
                "Redistributing difference across selected lines"
            );
        }

        allocate_weighted(items_target, &weights, self.config.increment())
    }

    fn shipping_description(&self, order: &Order) -> String {
        order
            .shipping_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.config.shipping.default_description)
            .to_string()
    }
}

/// Sum of nominal totals, rejecting amounts that overflow `Money`.
fn nominal_sum(lines: &[&LineItem]) -> RecalcResult<Money> {
    lines.iter().try_fold(Money::zero(), |acc, line| {
        line.checked_nominal_total()
            .and_then(|total| acc.checked_add(total))
            .ok_or_else(|| overflow(acc, lines.len()))
    })
}

fn overflow(total: Money, shares: usize) -> RecalcError {
    RecalcError::InvalidAllocationInput {
        total,
        shares,
        reason: "amounts overflow the money range".to_string(),
    }
}

/// Writes the shipping description onto the order.
///
/// The only mutation of caller data in the whole pipeline.
pub fn attach_shipping_description(order: &mut Order, description: &str) {
    order.shipping_description = Some(description.to_string());
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitSettings;

    fn codes(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn recalculator() -> Recalculator {
        Recalculator::new(RecalcConfig::with_splitting()).unwrap()
    }

    #[test]
    fn test_pass_through_when_totals_match() {
        let order = Order::new(
            vec![
                LineItem::new("152", "A", 1.0, Money::from_cents(1_169_100)),
                LineItem::new("153", "B", 1.0, Money::from_cents(37830)),
                LineItem::new("154", "C", 1.0, Money::zero()),
            ],
            Money::from_cents(1_206_930),
        );

        let result = recalculator().recalculate(&order, &RecalcRequest::all_lines()).unwrap();
        assert_eq!(result.sum.cents(), 1_206_930);
        assert_eq!(result.orig_grand_total.cents(), 1_206_930);
        assert_eq!(result.items.keys(), vec!["152", "153", "154", "shipping"]);
        assert_eq!(result.items.get("154").unwrap().sum, Money::zero());
    }

    #[test]
    fn test_shipping_row_and_description() {
        let mut order = Order::new(
            vec![LineItem::new("152", "A", 1.0, Money::from_cents(505_440))],
            Money::from_cents(934_140),
        )
        .with_shipping(Money::from_cents(428_700));

        let result = recalculator()
            .recalculate_and_attach(&mut order, &RecalcRequest::all_lines().with_shipping_tax("vat20"))
            .unwrap();

        let shipping = result.shipping().unwrap();
        assert_eq!(shipping.name, "Shipping");
        assert_eq!(shipping.quantity, 1);
        assert_eq!(shipping.price.cents(), 428_700);
        assert_eq!(shipping.tax.as_deref(), Some("vat20"));
        assert_eq!(result.sum.cents(), 505_440);
        assert_eq!(result.grand_sum().cents(), 934_140);
        assert_eq!(order.shipping_description.as_deref(), Some("Shipping"));
    }

    #[test]
    fn test_existing_description_names_shipping_row() {
        let mut order = Order::new(Vec::new(), Money::zero());
        order.shipping_description = Some("test_shipping".to_string());

        let result = recalculator().recalculate(&order, &RecalcRequest::all_lines()).unwrap();
        assert_eq!(result.shipping().unwrap().name, "test_shipping");
    }

    #[test]
    fn test_empty_order_is_all_zero() {
        let order = Order::new(Vec::new(), Money::zero());
        let result = recalculator().recalculate(&order, &RecalcRequest::all_lines()).unwrap();
        assert!(result.sum.is_zero());
        assert_eq!(result.items.keys(), vec!["shipping"]);
        assert_eq!(result.total_quantity(), 0);
    }

    #[test]
    fn test_zero_grand_total_zeroes_every_row() {
        let order = Order::new(
            vec![LineItem::new("1", "A", 2.0, Money::from_cents(500))],
            Money::zero(),
        );
        let result = recalculator().recalculate(&order, &RecalcRequest::all_lines()).unwrap();
        assert!(result.sum.is_zero());
        assert!(result.items.rows().all(|row| row.sum.is_zero()));
        assert_eq!(result.total_quantity(), 2);
    }

    #[test]
    fn test_discounted_marked_line_is_split_and_marked() {
        let line = LineItem::new("153", "Tea", 3.0, Money::from_cents(3500))
            .with_discount(Money::from_cents(321))
            .with_marking(codes("M", 3));
        let order = Order::new(vec![line], Money::from_cents(3179));

        let result = recalculator().recalculate(&order, &RecalcRequest::all_lines()).unwrap();
        let rows: Vec<(i64, Option<&str>)> = ["153_1", "153_2", "153_3"]
            .iter()
            .map(|k| {
                let row = result.items.get(k).unwrap();
                (row.price.cents(), row.marking.as_deref())
            })
            .collect();
        assert_eq!(rows, vec![(1059, Some("M1")), (1060, Some("M2")), (1060, Some("M3"))]);
    }

    #[test]
    fn test_splitting_disabled_keeps_lines_whole() {
        let recalculator = Recalculator::new(RecalcConfig::default()).unwrap();
        let line = LineItem::new("153", "Tea", 3.0, Money::from_cents(10100)).with_marking(codes("M", 3));
        let order = Order::new(vec![line], Money::from_cents(10100));

        let result = recalculator.recalculate(&order, &RecalcRequest::all_lines()).unwrap();
        let row = result.items.get("153").unwrap();
        assert_eq!(row.quantity, 3);
        assert_eq!(row.sum.cents(), 10100);
        assert_eq!(row.marking.as_deref(), Some("M1"));
    }

    #[test]
    fn test_grouped_configuration() {
        let mut config = RecalcConfig::with_splitting();
        config.split = SplitSettings {
            enabled: true,
            group_unmarked: true,
        };
        let recalculator = Recalculator::new(config).unwrap();
        let order = Order::new(
            vec![LineItem::new("152", "A", 3.0, Money::from_cents(10100))],
            Money::from_cents(10100),
        );

        let result = recalculator.recalculate(&order, &RecalcRequest::all_lines()).unwrap();
        assert_eq!(result.items.keys(), vec!["152_1", "152_2", "shipping"]);
        assert_eq!(result.items.get("152_2").unwrap().quantity, 2);
        assert_eq!(result.total_quantity(), 3);
    }

    #[test]
    fn test_marked_line_without_list_aborts() {
        let mut line = LineItem::new("153", "Tea", 2.0, Money::from_cents(200));
        line.has_marking = true;
        let mut order = Order::new(vec![line], Money::from_cents(200));

        let err = recalculator()
            .recalculate_and_attach(&mut order, &RecalcRequest::all_lines())
            .unwrap_err();
        assert!(matches!(err, RecalcError::MalformedLineItem { .. }));
        assert_eq!(order.shipping_description, None);
    }

    #[test]
    fn test_excluded_lines_are_not_validated() {
        let mut broken = LineItem::new("9", "Broken", 0.0, Money::zero()).with_tax("vat10", Money::zero());
        broken.has_marking = true;
        let good = LineItem::new("1", "A", 1.0, Money::from_cents(500)).with_tax("vat20", Money::zero());
        let order = Order::new(vec![good, broken], Money::from_cents(500));

        let result = recalculator()
            .recalculate(&order, &RecalcRequest::for_tax_rate("vat20"))
            .unwrap();
        assert_eq!(result.items.keys(), vec!["1", "shipping"]);
    }

    #[test]
    fn test_shipping_exceeding_target_is_invalid() {
        let order = Order::new(
            vec![LineItem::new("1", "A", 1.0, Money::from_cents(500))],
            Money::from_cents(100),
        )
        .with_shipping(Money::from_cents(200));

        let err = recalculator().recalculate(&order, &RecalcRequest::all_lines()).unwrap_err();
        assert!(matches!(err, RecalcError::InvalidAllocationInput { .. }));
    }

    #[test]
    fn test_target_without_selected_lines_is_invalid() {
        let order = Order::new(Vec::new(), Money::zero());
        let request = RecalcRequest::all_lines().with_target_total(Money::from_cents(100));

        let err = recalculator().recalculate(&order, &request).unwrap_err();
        assert!(matches!(err, RecalcError::InvalidAllocationInput { .. }));
    }

    #[test]
    fn test_huge_amounts_are_rejected() {
        let huge = Money::from_cents(5_000_000_000_000_000_000);
        let order = Order::new(
            vec![LineItem::new("1", "A", 1.0, huge), LineItem::new("2", "B", 1.0, huge)],
            huge,
        );

        let err = recalculator().recalculate(&order, &RecalcRequest::all_lines()).unwrap_err();
        assert!(matches!(err, RecalcError::InvalidAllocationInput { .. }));

        let filtered = Order::new(
            vec![
                LineItem::new("1", "A", 1.0, huge).with_tax("vat20", Money::zero()),
                LineItem::new("2", "B", 1.0, huge).with_tax("vat10", Money::zero()),
                LineItem::new("3", "C", 1.0, huge).with_tax("vat10", Money::zero()),
            ],
            huge,
        );
        let err = recalculator()
            .recalculate(&filtered, &RecalcRequest::for_tax_rate("vat20"))
            .unwrap_err();
        assert!(matches!(err, RecalcError::InvalidAllocationInput { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = RecalcConfig::default();
        config.marking.flag_field = String::new();
        assert!(matches!(Recalculator::new(config), Err(RecalcError::Validation(_))));
    }
}
