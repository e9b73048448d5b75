//! Money math helpers
//!
//! Rows store `f64` for serialization friendliness, but every computation
//! goes through `Decimal` and is rounded to 2 decimal places on the way
//! back out. Comparisons use a one-cent tolerance.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

/// One cent. Amount comparisons within this tolerance count as equal.
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert a stored f64 amount to Decimal for arithmetic
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Round a Decimal to cents and convert back to the stored representation
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Line total = unit price x quantity, in cents
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Per-installment amount = total / plan, rounded to cents.
///
/// The final installment absorbs rounding drift: it is charged as
/// `total - per * (plan - 1)`, never the rounded per-installment figure.
pub fn per_installment(total: f64, plan: u8) -> f64 {
    if plan == 0 {
        return 0.0;
    }
    to_f64(to_decimal(total) / Decimal::from(plan))
}

/// Amount charged by the final installment, absorbing rounding drift
pub fn final_installment(total: f64, per: f64, plan: u8) -> f64 {
    if plan <= 1 {
        return total;
    }
    to_f64(to_decimal(total) - to_decimal(per) * Decimal::from(plan - 1))
}

/// Whether two stored amounts agree within one cent
pub fn amounts_equal(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}

/// Whether a stored amount is effectively zero
pub fn is_zero(value: f64) -> bool {
    to_decimal(value).abs() <= MONEY_TOLERANCE
}
