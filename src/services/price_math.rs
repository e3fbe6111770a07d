use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Round a payload value to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a stored Decimal amount to a 2-decimal JSON number.
pub fn decimal_to_money(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or(0.0)
}

/// Percentage change from `previous` to `current`.
///
/// A missing or zero base period yields 0 rather than a division error, so
/// sparse series always produce a well-formed payload.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round2((current - previous) / previous * 100.0)
}
