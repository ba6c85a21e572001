//! Stay pricing in integer cents.

/// `price = rate - rate * discount`, never negative. The discount
/// fraction lives in `[0, 1)` and is validated where deals enter the
/// system.
pub fn apply_discount(rate_cents: i32, discount: f64) -> i32 {
    let discounted = rate_cents as f64 - (rate_cents as f64 * discount);
    (discounted.round() as i32).max(0)
}
