use proptest::prelude::*;
use receipt_core::allocation::{allocate_even, allocate_weighted};
use receipt_core::marking::assign_markings;
use receipt_core::money::MinimumIncrement;
use receipt_core::{LineItem, Money, Order, ReceiptRow, RecalcConfig, RecalcRequest, Recalculator};

fn increment() -> MinimumIncrement {
    MinimumIncrement::default()
}

proptest! {
    // Shares add up exactly and differ by at most one increment, smaller ones first.
    #[test]
    fn even_allocation_is_exact(total in 0i64..10_000_000, count in 1usize..200) {
        let shares = allocate_even(Money::from_cents(total), count, increment()).unwrap();

        prop_assert_eq!(shares.len(), count);
        prop_assert_eq!(shares.iter().sum::<Money>().cents(), total);

        let min = shares.iter().min().unwrap().cents();
        let max = shares.iter().max().unwrap().cents();
        prop_assert!(max - min <= 1);
        prop_assert!(shares.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn even_allocation_respects_increment(steps in 0i64..100_000, count in 1usize..50, inc in 1i64..100) {
        let increment = MinimumIncrement::new(inc).unwrap();
        let shares = allocate_even(Money::from_cents(steps * inc), count, increment).unwrap();

        prop_assert_eq!(shares.iter().sum::<Money>().cents(), steps * inc);
        prop_assert!(shares.iter().all(|s| s.cents() % inc == 0));
    }

    #[test]
    fn weighted_allocation_is_exact(
        total in 0i64..10_000_000,
        weights in prop::collection::vec(0i64..1_000_000, 1..20),
    ) {
        let weights: Vec<Money> = weights.into_iter().map(Money::from_cents).collect();
        let shares = allocate_weighted(Money::from_cents(total), &weights, increment()).unwrap();

        prop_assert_eq!(shares.len(), weights.len());
        prop_assert_eq!(shares.iter().sum::<Money>().cents(), total);
        prop_assert!(shares.iter().all(|s| !s.is_negative()));
    }

    // Matching target and weights leave every share untouched.
    #[test]
    fn weighted_allocation_passes_through(weights in prop::collection::vec(0i64..1_000_000, 1..20)) {
        let weights: Vec<Money> = weights.into_iter().map(Money::from_cents).collect();
        let total: Money = weights.iter().sum();
        let shares = allocate_weighted(total, &weights, increment()).unwrap();
        prop_assert_eq!(shares, weights);
    }

    #[test]
    fn recalculation_reconciles(
        lines in prop::collection::vec((1u32..15, 0i64..200_000, any::<bool>()), 1..6),
        discount_pct in 0i64..100,
        shipping in 0i64..50_000,
    ) {
        let items: Vec<LineItem> = lines
            .iter()
            .enumerate()
            .map(|(i, (qty, total, marked))| {
                let line = LineItem::new(format!("{}", 100 + i), "Item", *qty as f64, Money::from_cents(*total));
                if *marked {
                    let codes = (0..*qty).map(|c| format!("{}-{}", i, c)).collect();
                    line.with_marking(codes)
                } else {
                    line
                }
            })
            .collect();

        let nominal: i64 = lines.iter().map(|(_, total, _)| total).sum();
        let items_total = nominal - nominal * discount_pct / 100;
        let order = Order::new(items, Money::from_cents(items_total + shipping))
            .with_shipping(Money::from_cents(shipping));

        let result = Recalculator::new(RecalcConfig::with_splitting())
            .unwrap()
            .recalculate(&order, &RecalcRequest::all_lines())
            .unwrap();

        prop_assert_eq!(result.sum.cents(), items_total);
        prop_assert_eq!(result.grand_sum(), order.grand_total);
        prop_assert_eq!(result.total_quantity(), order.total_units());

        for (key, row) in result.items.iter() {
            prop_assert_eq!(row.sum, row.price * row.quantity, "row {} does not multiply out", key);
        }
    }

    #[test]
    fn marking_is_positional(rows in 0usize..30, codes in 0usize..30) {
        let rows = vec![ReceiptRow::unit("Item", Money::from_cents(100), None); rows];
        let codes: Vec<String> = (0..codes).map(|c| format!("M{}", c)).collect();

        let marked = assign_markings(rows.clone(), &codes);
        prop_assert_eq!(marked.len(), rows.len());
        for (i, row) in marked.iter().enumerate() {
            prop_assert_eq!(row.marking.as_ref(), codes.get(i));
            prop_assert_eq!(row.sum, rows[i].sum);
        }
    }
}
