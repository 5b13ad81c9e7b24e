//! Cent-exact allocation primitives.
//!
//! # Responsibility
//! - Divide an amount evenly across N recipients without losing a cent.
//! - Divide an amount proportionally to integer weights without losing a
//!   cent (largest-remainder method).
//!
//! # Invariants
//! - The returned shares always sum to exactly the input amount.
//! - Leftover cents go to the earliest recipients, so identical inputs yield
//!   identical outputs.

use crate::model::money::Money;

/// Splits `amount` evenly across `count` recipients.
///
/// Each share is `amount / count` cents, with the `amount % count` leftover
/// cents handed one each to the earliest recipients. Returns an empty vector
/// for `count == 0`.
pub fn split_evenly(amount: Money, count: usize) -> Vec<Money> {
    if count == 0 {
        return Vec::new();
    }

    let cents = amount.cents();
    let count_i64 = count as i64;
    let base = cents.div_euclid(count_i64);
    let leftover = cents.rem_euclid(count_i64);

    (0..count_i64)
        .map(|index| {
            let extra = i64::from(index < leftover);
            Money::from_cents(base + extra)
        })
        .collect()
}

/// Splits `amount` across recipients proportionally to `weights`.
///
/// Uses the largest-remainder method: each share starts at
/// `floor(amount * weight / total_weight)` cents, and the remaining cents go
/// to the shares with the largest fractional remainders, earlier index
/// winning ties. All-zero weights yield all-zero shares (degenerate case,
/// not a division error).
pub fn split_proportionally(amount: Money, weights: &[Money]) -> Vec<Money> {
    let total_weight: i128 = weights.iter().map(|weight| weight.cents() as i128).sum();
    if total_weight == 0 {
        return vec![Money::ZERO; weights.len()];
    }

    let amount_cents = amount.cents() as i128;
    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    let mut allocated: i128 = 0;

    for weight in weights {
        let numerator = amount_cents * weight.cents() as i128;
        let base = numerator.div_euclid(total_weight);
        remainders.push(numerator.rem_euclid(total_weight));
        shares.push(base);
        allocated += base;
    }

    let mut leftover = amount_cents - allocated;
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]).then(a.cmp(&b)));

    for index in order {
        if leftover == 0 {
            break;
        }
        shares[index] += 1;
        leftover -= 1;
    }

    shares
        .into_iter()
        .map(|cents| Money::from_cents(cents as i64))
        .collect()
}
