//! Nutrient scoring engine.
//!
//! Everything in here is pure: each call reads only its inputs and the static
//! reference and threshold tables, so ratings can be computed concurrently without
//! coordination. Persisting a rating is the caller's job (see [`crate::ledger`]).

mod aggregate;
pub mod nutrients;
pub mod profile;
mod rda;
pub mod reference;
mod scorer;

pub use aggregate::{aggregate, Aggregate, MAX_RATING, MIN_RATING};
pub use nutrients::{
    Nutrient, NutrientGroup, NutrientReading, RdaPercentageSet, ReadingError, UnknownNutrient,
    NUTRIENT_VOCABULARY_VERSION,
};
pub use profile::{classify, ConsumerProfile, Gender, SpecialCondition};
pub use rda::{convert_reading, round4, to_rda_percentage};
pub use reference::{ReferenceCategory, ReferenceTable};
pub use scorer::{score_group, thresholds_for, ScoreResult, Thresholds};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Final, immutable outcome of scoring one food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub category: ReferenceCategory,
    pub base_rating: f64,
    pub balance_update: f64,
    pub final_rating: f64,
    pub percentages: RdaPercentageSet,
}

/// Reasons a rating cannot be computed from the given inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NutritionScoringError {
    #[error("consumed weight must be a finite, non-negative number of grams (got {0})")]
    InvalidWeight(f64),
    #[error("reading contains no scoreable nutrients")]
    NoScoreableNutrients,
    #[error("{nutrient} at {consumed_weight_grams} g is too large to express as a share of its RDA")]
    PercentageOverflow {
        nutrient: Nutrient,
        consumed_weight_grams: f64,
    },
}

/// Rate a food for the reference population `profile` belongs to.
pub fn score(
    profile: &ConsumerProfile,
    reading: &NutrientReading,
    consumed_weight_grams: f64,
) -> Result<Rating, NutritionScoringError> {
    score_with_category(classify(profile), reading, consumed_weight_grams)
}

/// Rate a food against an explicitly chosen reference population.
pub fn score_with_category(
    category: ReferenceCategory,
    reading: &NutrientReading,
    consumed_weight_grams: f64,
) -> Result<Rating, NutritionScoringError> {
    if !consumed_weight_grams.is_finite() || consumed_weight_grams < 0.0 {
        return Err(NutritionScoringError::InvalidWeight(consumed_weight_grams));
    }
    if reading.is_empty() {
        return Err(NutritionScoringError::NoScoreableNutrients);
    }

    let percentages = convert_reading(reading, category.table(), consumed_weight_grams);
    if let Some((nutrient, _)) = percentages.iter().find(|(_, pct)| !pct.is_finite()) {
        return Err(NutritionScoringError::PercentageOverflow {
            nutrient,
            consumed_weight_grams,
        });
    }
    let good = score_group(NutrientGroup::Beneficial, &percentages);
    let bad = score_group(NutrientGroup::Liability, &percentages);
    let Aggregate {
        base_rating,
        balance_update,
        final_rating,
    } = aggregate(&good, &bad);

    debug!(
        %category,
        ?good,
        ?bad,
        base_rating,
        balance_update,
        final_rating,
        "scored nutrient reading"
    );

    Ok(Rating {
        category,
        base_rating,
        balance_update,
        final_rating,
        percentages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(entries: &[(Nutrient, f64)]) -> NutrientReading {
        entries
            .iter()
            .try_fold(NutrientReading::new(), |r, (nutrient, value)| {
                r.with(*nutrient, *value)
            })
            .expect("valid reading")
    }

    #[test]
    fn rejects_negative_and_non_finite_weight() {
        let r = reading(&[(Nutrient::Proteins, 10.0)]);
        let profile = ConsumerProfile::default();
        assert_eq!(
            score(&profile, &r, -1.0),
            Err(NutritionScoringError::InvalidWeight(-1.0))
        );
        assert!(matches!(
            score(&profile, &r, f64::INFINITY),
            Err(NutritionScoringError::InvalidWeight(_))
        ));
    }

    #[test]
    fn empty_reading_is_not_a_zero_score() {
        let profile = ConsumerProfile::default();
        assert_eq!(
            score(&profile, &NutrientReading::new(), 100.0),
            Err(NutritionScoringError::NoScoreableNutrients)
        );
    }

    #[test]
    fn overflowing_percentages_are_rejected() {
        let r = reading(&[
            (Nutrient::Proteins, 1e308),
            (Nutrient::Fiber, 1e308),
            (Nutrient::Sodium, 1e308),
        ]);
        match score(&ConsumerProfile::new(35, Gender::Male), &r, 100.0) {
            Err(NutritionScoringError::PercentageOverflow {
                consumed_weight_grams,
                ..
            }) => assert_eq!(consumed_weight_grams, 100.0),
            other => panic!("expected overflow, got {other:?}"),
        }

        let modest = reading(&[(Nutrient::Sugar, 12.0)]);
        assert!(matches!(
            score(&ConsumerProfile::default(), &modest, f64::MAX),
            Err(NutritionScoringError::PercentageOverflow {
                nutrient: Nutrient::Sugar,
                ..
            })
        ));
    }

    #[test]
    fn category_override_uses_child_table() {
        let r = reading(&[(Nutrient::Proteins, 10.0)]);
        let rating =
            score_with_category(ReferenceCategory::Child10To12, &r, 100.0).expect("scores");
        assert_eq!(rating.category, ReferenceCategory::Child10To12);
        // 10 * 100 / (100 * 32) * 100
        assert_eq!(rating.percentages.get(Nutrient::Proteins), Some(31.25));
    }
}
