//! # Rounding Allocator
//!
//! Splits a total into shares that add up to it exactly, in whole minimum
//! increments.
//!
//! ## Remainder Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  allocate_even(101.00, 3)                                               │
//! │                                                                         │
//! │  base      = floor(10100 / 3)   = 3366                                  │
//! │  remainder = 10100 − 3 × 3366   = 2 increments                          │
//! │                                                                         │
//! │  position:   1       2       3                                          │
//! │  amount:   33.66   33.67   33.67      ← the LAST `remainder` positions  │
//! │                                          get one extra increment        │
//! │                                                                         │
//! │  The first unit's price stays stable across repeated splits of the     │
//! │  same total/quantity pair.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The weighted variant floors every proportional share and hands the
//! leftover increments to the last shares with a positive weight, so a
//! zero-priced line never absorbs rounding.

use crate::error::{RecalcError, RecalcResult};
use crate::money::{MinimumIncrement, Money};

/// Splits `total` into `count` shares that are as equal as possible.
///
/// ## Example
/// ```rust
/// use receipt_core::allocation::allocate_even;
/// use receipt_core::money::{MinimumIncrement, Money};
///
/// let shares = allocate_even(Money::from_cents(3179), 3, MinimumIncrement::default()).unwrap();
/// let cents: Vec<i64> = shares.iter().map(|m| m.cents()).collect();
/// assert_eq!(cents, vec![1059, 1060, 1060]);
/// ```
///
/// ## Errors
/// `InvalidAllocationInput` when `total` is negative, `count` is zero, or
/// `total` is not a whole number of increments.
pub fn allocate_even(
    total: Money,
    count: usize,
    increment: MinimumIncrement,
) -> RecalcResult<Vec<Money>> {
    check_input(total, count, increment)?;

    let steps = total.cents() / increment.cents();
    let base = steps / count as i64;
    let remainder = (steps % count as i64) as usize;
    let first_bumped = count - remainder;

    Ok((0..count)
        .map(|i| {
            let extra = if i >= first_bumped { 1 } else { 0 };
            Money::from_cents((base + extra) * increment.cents())
        })
        .collect())
}

/// Splits `total` proportionally to `weights`.
///
/// Every share is floored to the increment; the remaining increments go,
/// one each, to the last shares whose weight is positive. When all weights
/// are zero the total is split evenly instead.
///
/// ## Example
/// ```rust
/// use receipt_core::allocation::allocate_weighted;
/// use receipt_core::money::{MinimumIncrement, Money};
///
/// // 100.00 of a 90.00 target distributed over 50.00 / 30.00 / 20.00
/// let weights = [Money::from_cents(5000), Money::from_cents(3000), Money::from_cents(2000)];
/// let shares = allocate_weighted(Money::from_cents(9000), &weights, MinimumIncrement::default()).unwrap();
/// let cents: Vec<i64> = shares.iter().map(|m| m.cents()).collect();
/// assert_eq!(cents, vec![4500, 2700, 1800]);
/// ```
///
/// ## Errors
/// As [`allocate_even`], plus a negative weight.
pub fn allocate_weighted(
    total: Money,
    weights: &[Money],
    increment: MinimumIncrement,
) -> RecalcResult<Vec<Money>> {
    check_input(total, weights.len(), increment)?;

    if let Some(negative) = weights.iter().find(|w| w.is_negative()) {
        return Err(RecalcError::InvalidAllocationInput {
            total,
            shares: weights.len(),
            reason: format!("weight {} is negative", negative),
        });
    }

    let weight_sum: i128 = weights.iter().map(|w| w.cents() as i128).sum();
    if weight_sum == 0 {
        return allocate_even(total, weights.len(), increment);
    }

    let steps = (total.cents() / increment.cents()) as i128;
    let mut shares: Vec<i128> = weights
        .iter()
        .map(|w| steps * w.cents() as i128 / weight_sum)
        .collect();

    // Each positive share lost less than one step to flooring, so the
    // leftover is strictly smaller than the number of positive weights.
    let mut leftover = steps - shares.iter().sum::<i128>();
    for (share, weight) in shares.iter_mut().zip(weights).rev() {
        if leftover == 0 {
            break;
        }
        if weight.is_positive() {
            *share += 1;
            leftover -= 1;
        }
    }

    Ok(shares
        .into_iter()
        .map(|s| Money::from_cents(s as i64 * increment.cents()))
        .collect())
}

fn check_input(total: Money, count: usize, increment: MinimumIncrement) -> RecalcResult<()> {
    let reject = |reason: &str| {
        Err(RecalcError::InvalidAllocationInput {
            total,
            shares: count,
            reason: reason.to_string(),
        })
    };

    if total.is_negative() {
        return reject("total is negative");
    }
    if count == 0 {
        return reject("share count must be positive");
    }
    if !total.is_multiple_of(increment) {
        return reject("total is not a whole number of minimum increments");
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(amounts: &[Money]) -> Vec<i64> {
        amounts.iter().map(Money::cents).collect()
    }

    fn one() -> MinimumIncrement {
        MinimumIncrement::default()
    }

    #[test]
    fn test_even_split_without_remainder() {
        let shares = allocate_even(Money::from_cents(3177), 3, one()).unwrap();
        assert_eq!(cents(&shares), vec![1059, 1059, 1059]);
    }

    #[test]
    fn test_even_split_remainder_goes_last() {
        let shares = allocate_even(Money::from_cents(10100), 3, one()).unwrap();
        assert_eq!(cents(&shares), vec![3366, 3367, 3367]);

        let shares = allocate_even(Money::from_cents(10110), 4, one()).unwrap();
        assert_eq!(cents(&shares), vec![2527, 2527, 2528, 2528]);
    }

    #[test]
    fn test_even_split_large_quantity() {
        let shares = allocate_even(Money::from_cents(73412), 40, one()).unwrap();
        assert_eq!(shares.iter().filter(|m| m.cents() == 1835).count(), 28);
        assert_eq!(shares.iter().filter(|m| m.cents() == 1836).count(), 12);
        assert_eq!(shares[27].cents(), 1835);
        assert_eq!(shares[28].cents(), 1836);
        assert_eq!(shares.iter().sum::<Money>().cents(), 73412);
    }

    #[test]
    fn test_even_split_of_zero_and_tiny_totals() {
        assert_eq!(cents(&allocate_even(Money::zero(), 3, one()).unwrap()), vec![0, 0, 0]);
        assert_eq!(cents(&allocate_even(Money::from_cents(2), 5, one()).unwrap()), vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_even_split_with_coarse_increment() {
        let tens = MinimumIncrement::new(10).unwrap();
        let shares = allocate_even(Money::from_cents(1000), 3, tens).unwrap();
        assert_eq!(cents(&shares), vec![330, 330, 340]);

        assert!(allocate_even(Money::from_cents(1005), 3, tens).is_err());
    }

    #[test]
    fn test_invalid_allocation_input() {
        assert!(matches!(
            allocate_even(Money::from_cents(-1), 3, one()),
            Err(RecalcError::InvalidAllocationInput { .. })
        ));
        assert!(matches!(
            allocate_even(Money::from_cents(100), 0, one()),
            Err(RecalcError::InvalidAllocationInput { .. })
        ));
        assert!(matches!(
            allocate_weighted(Money::from_cents(100), &[], one()),
            Err(RecalcError::InvalidAllocationInput { .. })
        ));
        assert!(matches!(
            allocate_weighted(Money::from_cents(100), &[Money::from_cents(-5)], one()),
            Err(RecalcError::InvalidAllocationInput { .. })
        ));
    }

    #[test]
    fn test_weighted_exact_when_target_matches() {
        let weights = [Money::from_cents(1_169_100), Money::from_cents(37830), Money::zero()];
        let shares = allocate_weighted(Money::from_cents(1_206_930), &weights, one()).unwrap();
        assert_eq!(cents(&shares), vec![1_169_100, 37830, 0]);
    }

    #[test]
    fn test_weighted_remainder_skips_zero_weights() {
        let weights = [Money::from_cents(100), Money::from_cents(100), Money::zero()];
        let shares = allocate_weighted(Money::from_cents(101), &weights, one()).unwrap();
        assert_eq!(cents(&shares), vec![50, 51, 0]);
    }

    #[test]
    fn test_weighted_all_zero_weights_fall_back_to_even() {
        let weights = [Money::zero(), Money::zero()];
        let shares = allocate_weighted(Money::from_cents(3), &weights, one()).unwrap();
        assert_eq!(cents(&shares), vec![1, 2]);
    }

    #[test]
    fn test_weighted_discount_spread() {
        // 116.91 + 3.78 reduced to 100.00
        let weights = [Money::from_cents(11691), Money::from_cents(378)];
        let shares = allocate_weighted(Money::from_cents(10000), &weights, one()).unwrap();
        assert_eq!(shares.iter().sum::<Money>().cents(), 10000);
        assert_eq!(cents(&shares), vec![9686, 314]);
    }
}
