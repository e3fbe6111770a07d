use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::services::price_math::decimal_to_money;

/// One observation feeding the per-unit averaging.
#[derive(Debug, Clone)]
pub struct UnitPriceObservation {
    pub item_type: String,
    pub category: String,
    pub price: Decimal,
}

/// Averaged unit price for one (item_type, unit) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitAverage {
    pub item_type: String,
    pub average_price: f64,
    pub unit: String,
}

/// Scale factor applied when presenting an averaged unit price, keyed by the
/// raw unit token from the category label. Unknown units pass through
/// unscaled.
fn display_conversion(unit: &str) -> Option<(Decimal, &'static str)> {
    match unit {
        "g" => Some((Decimal::from(1000), "kg")),
        "ml" => Some((Decimal::from(1000), "L")),
        "pcs" => Some((Decimal::from(1), "pcs")),
        _ => None,
    }
}

/// Split a category label like "1000 g" into its amount and unit token.
/// Labels with no space, an unparsable amount, or a zero amount yield None.
pub fn parse_category(label: &str) -> Option<(Decimal, &str)> {
    let (amount, unit) = label.split_once(' ')?;
    let quantity: Decimal = amount.trim().parse().ok()?;
    if quantity.is_zero() {
        return None;
    }
    Some((quantity, unit.trim()))
}

/// Price per single unit of the category label, with the unit token.
/// Rows whose label cannot be parsed contribute no unit price.
pub fn unit_price(price: Decimal, category: &str) -> Option<(Decimal, String)> {
    let (quantity, unit) = parse_category(category)?;
    Some((price / quantity, unit.to_string()))
}

/// Average unit prices per (item_type, unit), scaled to display units.
///
/// Observations with unparsable category labels are skipped. Output is
/// ordered by (item_type, unit) so payloads are deterministic.
pub fn average_item_type_prices(observations: &[UnitPriceObservation]) -> Vec<UnitAverage> {
    let mut sums: BTreeMap<(String, String), (Decimal, i64)> = BTreeMap::new();

    for obs in observations {
        let Some((per_unit, unit)) = unit_price(obs.price, &obs.category) else {
            continue;
        };
        let entry = sums
            .entry((obs.item_type.clone(), unit))
            .or_insert((Decimal::ZERO, 0));
        entry.0 += per_unit;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|((item_type, unit), (total, count))| {
            let average = total / Decimal::from(count);
            let (scaled, display_unit) = match display_conversion(&unit) {
                Some((factor, display)) => (average * factor, display.to_string()),
                None => (average, unit),
            };
            UnitAverage {
                item_type,
                average_price: decimal_to_money(scaled),
                unit: display_unit,
            }
        })
        .collect()
}
