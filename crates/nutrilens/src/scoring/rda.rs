use std::collections::BTreeMap;

use tracing::warn;

use super::nutrients::{NutrientReading, RdaPercentageSet};
use super::reference::ReferenceTable;

/// Round half away from zero to four decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Share of the daily allowance covered by eating `consumed_weight_grams` of a food
/// that carries `per_100g` of the nutrient per 100 g.
///
/// A non-positive target cannot be expressed as a percentage and yields `0.0`.
pub fn to_rda_percentage(per_100g: f64, rda_target: f64, consumed_weight_grams: f64) -> f64 {
    if rda_target <= 0.0 {
        warn!(rda_target, "non-positive RDA target, treating coverage as zero");
        return 0.0;
    }
    round4((per_100g * consumed_weight_grams) / (100.0 * rda_target) * 100.0)
}

/// Convert every nutrient present in the reading; absent nutrients stay absent.
pub fn convert_reading(
    reading: &NutrientReading,
    table: &ReferenceTable,
    consumed_weight_grams: f64,
) -> RdaPercentageSet {
    let values: BTreeMap<_, _> = reading
        .iter()
        .map(|(nutrient, per_100g)| {
            let pct = to_rda_percentage(per_100g, table.target(nutrient), consumed_weight_grams);
            (nutrient, pct)
        })
        .collect();
    RdaPercentageSet::from_values(values)
}
