use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bumped whenever a nutrient is added, removed, or reordered. Ledger files written
/// under different versions do not share a column layout.
pub const NUTRIENT_VOCABULARY_VERSION: u32 = 1;

/// Which side of the rating a nutrient pulls towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientGroup {
    Beneficial,
    Liability,
}

/// Closed nutrient vocabulary shared by the reference tables, the scoring
/// thresholds, and the ledger columns.
///
/// Declaration order is the ledger column order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Nutrient {
    Proteins,
    Fiber,
    Calcium,
    Magnesium,
    Iron,
    Zinc,
    Iodine,
    Thiamine,
    Riboflavin,
    Niacin,
    #[serde(rename = "VITAMIN_B6")]
    VitaminB6,
    Folate,
    #[serde(rename = "VITAMIN_B12")]
    VitaminB12,
    VitaminC,
    VitaminA,
    VitaminD,
    Energy,
    Carbohydrates,
    Sugar,
    TotalFat,
    SaturatedFat,
    Sodium,
    Cholesterol,
}

impl Nutrient {
    pub const ALL: [Nutrient; 23] = [
        Nutrient::Proteins,
        Nutrient::Fiber,
        Nutrient::Calcium,
        Nutrient::Magnesium,
        Nutrient::Iron,
        Nutrient::Zinc,
        Nutrient::Iodine,
        Nutrient::Thiamine,
        Nutrient::Riboflavin,
        Nutrient::Niacin,
        Nutrient::VitaminB6,
        Nutrient::Folate,
        Nutrient::VitaminB12,
        Nutrient::VitaminC,
        Nutrient::VitaminA,
        Nutrient::VitaminD,
        Nutrient::Energy,
        Nutrient::Carbohydrates,
        Nutrient::Sugar,
        Nutrient::TotalFat,
        Nutrient::SaturatedFat,
        Nutrient::Sodium,
        Nutrient::Cholesterol,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Proteins => "PROTEINS",
            Nutrient::Fiber => "FIBER",
            Nutrient::Calcium => "CALCIUM",
            Nutrient::Magnesium => "MAGNESIUM",
            Nutrient::Iron => "IRON",
            Nutrient::Zinc => "ZINC",
            Nutrient::Iodine => "IODINE",
            Nutrient::Thiamine => "THIAMINE",
            Nutrient::Riboflavin => "RIBOFLAVIN",
            Nutrient::Niacin => "NIACIN",
            Nutrient::VitaminB6 => "VITAMIN_B6",
            Nutrient::Folate => "FOLATE",
            Nutrient::VitaminB12 => "VITAMIN_B12",
            Nutrient::VitaminC => "VITAMIN_C",
            Nutrient::VitaminA => "VITAMIN_A",
            Nutrient::VitaminD => "VITAMIN_D",
            Nutrient::Energy => "ENERGY",
            Nutrient::Carbohydrates => "CARBOHYDRATES",
            Nutrient::Sugar => "SUGAR",
            Nutrient::TotalFat => "TOTAL_FAT",
            Nutrient::SaturatedFat => "SATURATED_FAT",
            Nutrient::Sodium => "SODIUM",
            Nutrient::Cholesterol => "CHOLESTEROL",
        }
    }

    pub fn group(self) -> NutrientGroup {
        match self {
            Nutrient::Sugar
            | Nutrient::TotalFat
            | Nutrient::SaturatedFat
            | Nutrient::Sodium
            | Nutrient::Cholesterol => NutrientGroup::Liability,
            _ => NutrientGroup::Beneficial,
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Nutrient {
    type Err = UnknownNutrient;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Nutrient::ALL
            .into_iter()
            .find(|nutrient| nutrient.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownNutrient(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown nutrient '{0}'")]
pub struct UnknownNutrient(pub String);

/// Rejected nutrient quantities.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadingError {
    #[error("{nutrient} must be a finite, non-negative quantity (got {value})")]
    InvalidQuantity { nutrient: Nutrient, value: f64 },
}

/// Per-100g nutrient quantities as read off a label.
///
/// Only finite, non-negative values are accepted, so downstream scoring never sees a
/// negative mass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NutrientReading {
    values: BTreeMap<Nutrient, f64>,
}

impl NutrientReading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, nutrient: Nutrient, per_100g: f64) -> Result<(), ReadingError> {
        if !per_100g.is_finite() || per_100g < 0.0 {
            return Err(ReadingError::InvalidQuantity {
                nutrient,
                value: per_100g,
            });
        }
        self.values.insert(nutrient, per_100g);
        Ok(())
    }

    pub fn with(mut self, nutrient: Nutrient, per_100g: f64) -> Result<Self, ReadingError> {
        self.insert(nutrient, per_100g)?;
        Ok(self)
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        self.values.get(&nutrient).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        self.values.iter().map(|(nutrient, value)| (*nutrient, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<BTreeMap<Nutrient, f64>> for NutrientReading {
    type Error = ReadingError;

    fn try_from(values: BTreeMap<Nutrient, f64>) -> Result<Self, Self::Error> {
        values
            .into_iter()
            .try_fold(NutrientReading::new(), |reading, (nutrient, value)| {
                reading.with(nutrient, value)
            })
    }
}

impl<'de> Deserialize<'de> for NutrientReading {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = BTreeMap::<Nutrient, f64>::deserialize(deserializer)?;
        NutrientReading::try_from(values).map_err(serde::de::Error::custom)
    }
}

/// Percentage-of-RDA values keyed by nutrient, rounded to four decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RdaPercentageSet {
    values: BTreeMap<Nutrient, f64>,
}

impl RdaPercentageSet {
    pub(crate) fn from_values(values: BTreeMap<Nutrient, f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        self.values.get(&nutrient).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        self.values.iter().map(|(nutrient, value)| (*nutrient, *value))
    }

    /// Entries belonging to one side of the rating, in vocabulary order.
    pub fn group(&self, group: NutrientGroup) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        self.iter()
            .filter(move |(nutrient, _)| nutrient.group() == group)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
