use serde::{Deserialize, Serialize};

use super::rda::round4;
use super::scorer::ScoreResult;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;
const MAX_LIABILITY_PENALTY: f64 = -3.0;
const TIE_BREAK_MIN_COUNT: usize = 4;

/// The pieces that make up a final rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub base_rating: f64,
    pub balance_update: f64,
    pub final_rating: f64,
}

/// Combine the beneficial and liability tallies into a rating in `[0, 10]`.
///
/// The base rating is the weighted mean of both groups. The balance update then
/// nudges it towards whichever group dominates by nutrient count, scaled by how far
/// the summed RDA percentages of that group outweigh the other. Every intermediate
/// step is rounded to four decimals in this order.
pub fn aggregate(good: &ScoreResult, bad: &ScoreResult) -> Aggregate {
    let denominator = good.denominator + bad.denominator;
    let base_rating = if denominator > 0.0 {
        finite_or(round4((good.numerator + bad.numerator) / denominator), MIN_RATING)
    } else {
        MIN_RATING
    };

    // Overflowed percentage sums can turn the update into NaN, which `clamp` keeps.
    let balance_update = finite_or(balance_update(good, bad), 0.0);
    let final_rating = round4(base_rating + balance_update).clamp(MIN_RATING, MAX_RATING);

    Aggregate {
        base_rating,
        balance_update,
        final_rating,
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn balance_update(good: &ScoreResult, bad: &ScoreResult) -> f64 {
    let good_count = good.present as f64;
    let mut bad_count = bad.present as f64;

    if good.present == bad.present && good.present >= TIE_BREAK_MIN_COUNT {
        bad_count += 1.0;
    }

    // Counts are whole numbers, so unequal counts keep the divisor non-zero.
    let divisor = good_count * 100.0 - bad_count * 100.0;
    if good_count > bad_count {
        round4((good.percentage_sum * good_count - bad.percentage_sum * bad_count) / divisor)
    } else if good_count < bad_count {
        round4((bad.percentage_sum * bad_count - good.percentage_sum * good_count) / divisor)
            .max(MAX_LIABILITY_PENALTY)
    } else {
        0.0
    }
}
