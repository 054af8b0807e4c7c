use serde::{Deserialize, Serialize};

use super::nutrients::{Nutrient, NutrientGroup, RdaPercentageSet};

/// Tier boundaries and weight for one nutrient.
///
/// For beneficial nutrients `first` is the high mark and `second` the mid mark.
/// For liabilities `first` is the low mark and `second` the high mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub first: f64,
    pub second: f64,
    pub weight: f64,
}

const fn thresholds(first: f64, second: f64, weight: f64) -> Thresholds {
    Thresholds {
        first,
        second,
        weight,
    }
}

pub fn thresholds_for(nutrient: Nutrient) -> Thresholds {
    match nutrient {
        Nutrient::Proteins => thresholds(25.0, 15.0, 5.0),
        Nutrient::Fiber => thresholds(30.0, 20.0, 5.0),
        Nutrient::Calcium => thresholds(25.0, 15.0, 3.0),
        Nutrient::Magnesium => thresholds(25.0, 15.0, 3.0),
        Nutrient::Iron => thresholds(20.0, 10.0, 4.0),
        Nutrient::Zinc => thresholds(25.0, 15.0, 3.0),
        Nutrient::Iodine => thresholds(20.0, 10.0, 3.0),
        Nutrient::Thiamine => thresholds(15.0, 10.0, 2.0),
        Nutrient::Riboflavin => thresholds(20.0, 10.0, 2.0),
        Nutrient::Niacin => thresholds(20.0, 10.0, 2.0),
        Nutrient::VitaminB6 => thresholds(20.0, 10.0, 2.0),
        Nutrient::Folate => thresholds(30.0, 15.0, 3.0),
        Nutrient::VitaminB12 => thresholds(30.0, 15.0, 3.0),
        Nutrient::VitaminC => thresholds(20.0, 10.0, 4.0),
        Nutrient::VitaminA => thresholds(30.0, 20.0, 5.0),
        Nutrient::VitaminD => thresholds(25.0, 15.0, 3.0),
        Nutrient::Energy => thresholds(20.0, 10.0, 4.0),
        Nutrient::Carbohydrates => thresholds(25.0, 12.0, 3.0),
        Nutrient::Sugar => thresholds(15.0, 25.0, 4.0),
        Nutrient::TotalFat => thresholds(20.0, 30.0, 4.0),
        Nutrient::SaturatedFat => thresholds(5.0, 12.0, 3.0),
        Nutrient::Sodium => thresholds(20.0, 30.0, 2.0),
        Nutrient::Cholesterol => thresholds(10.0, 20.0, 4.0),
    }
}

const BENEFICIAL_FLOOR: f64 = 2.0;
const LIABILITY_FLOOR: f64 = -1.0;

/// Weighted tally for one side of the rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub numerator: f64,
    pub denominator: f64,
    /// Nutrients that reached the best tier.
    pub top_tier_count: usize,
    /// Sum of the raw RDA percentages scored.
    pub percentage_sum: f64,
    /// Nutrients of this group present in the reading.
    pub present: usize,
}

/// Per-unit-weight score of a beneficial nutrient at `value` percent of RDA.
fn beneficial_tier(value: f64, t: Thresholds) -> (f64, bool) {
    if value >= t.first {
        (10.0, true)
    } else if value >= t.second {
        (8.0, false)
    } else if value <= 0.0 {
        (BENEFICIAL_FLOOR, false)
    } else {
        ((10.0 - (t.first / value) * 1.5).max(BENEFICIAL_FLOOR), false)
    }
}

/// Per-unit-weight score of a liability nutrient; overshoot may go negative.
fn liability_tier(value: f64, t: Thresholds) -> (f64, bool) {
    if value <= t.first {
        (10.0, true)
    } else if value <= t.second {
        (8.0, false)
    } else if t.first <= 0.0 {
        (LIABILITY_FLOOR, false)
    } else {
        ((10.0 - (value / t.first) * 1.5).max(LIABILITY_FLOOR), false)
    }
}

/// Score every nutrient of `group` present in `percentages`.
pub fn score_group(group: NutrientGroup, percentages: &RdaPercentageSet) -> ScoreResult {
    percentages
        .group(group)
        .fold(ScoreResult::default(), |mut acc, (nutrient, value)| {
            let t = thresholds_for(nutrient);
            let (tier, top) = match group {
                NutrientGroup::Beneficial => beneficial_tier(value, t),
                NutrientGroup::Liability => liability_tier(value, t),
            };
            acc.numerator += tier * t.weight;
            acc.denominator += t.weight;
            acc.percentage_sum += value;
            acc.present += 1;
            if top {
                acc.top_tier_count += 1;
            }
            acc
        })
}
